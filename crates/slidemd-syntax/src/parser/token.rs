//! Positions, tokens and the token arena.
//!
//! Events never own their token. Both the enter and the exit event of a token
//! hold a [`TokenId`] into [`Tokens`], so relabelling a token during
//! resolution is a single write that both events observe.

use std::ops::{Index, IndexMut};

use crate::syntax_kind::SyntaxKind;

/// A position in the source.
///
/// `line` and `column` are 1-based and count code points; `offset` is the
/// byte offset into the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Point {
    /// The position of the first code point of a document.
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Move past one code point.
    pub fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Move past every code point of `text`.
    pub fn advance_str(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::start()
    }
}

/// A typed range of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub start: Point,
    pub end: Point,
}

impl Token {
    /// Byte range of this token in the source.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Returns true if the token covers no code point.
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

/// Index of a [`Token`] inside [`Tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(usize);

/// Arena holding every token of a document.
#[derive(Debug, Default, Clone)]
pub struct Tokens {
    items: Vec<Token>,
}

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token and return its id.
    pub fn push(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.items.len());
        self.items.push(token);
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every token created after the arena had `len` entries.
    ///
    /// Used to forget the tokens of a rejected construct attempt.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.items.get(id.0)
    }
}

impl Index<TokenId> for Tokens {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.items[id.0]
    }
}

impl IndexMut<TokenId> for Tokens {
    fn index_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.items[id.0]
    }
}
