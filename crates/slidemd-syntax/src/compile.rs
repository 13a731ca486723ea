//! Helpers for code that turns the syntax tree into markup.
//!
//! Rendering itself lives downstream. These are the few facts a renderer
//! cannot read off a node kind alone.

use crate::parser::token::Token;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// The literal value of an [`SyntaxKind::INLINE_CODE`] token: its text with
/// one delimiter character dropped on each side.
///
/// ```
/// use slidemd_syntax::{ParseOptions, SyntaxKind, compile::inline_code_value, tokenize};
///
/// let doc = tokenize("{{name}}", &ParseOptions::default());
/// let token = doc
///     .events
///     .iter()
///     .map(|event| doc.tokens[event.token])
///     .find(|token| token.kind == SyntaxKind::INLINE_CODE)
///     .unwrap();
/// assert_eq!(inline_code_value(doc.source, &token), "{name}");
/// ```
pub fn inline_code_value<'s>(source: &'s str, token: &Token) -> &'s str {
    let text = &source[token.range()];
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Rank of a heading node, from the length of its `#` sequence.
pub fn heading_rank(node: &SyntaxNode) -> Option<u8> {
    if node.kind() != SyntaxKind::HEADING {
        return None;
    }
    node.children_with_tokens()
        .find(|child| child.kind() == SyntaxKind::HEADING_SEQUENCE)
        .and_then(|sequence| u8::try_from(u32::from(sequence.text_range().len())).ok())
}

/// Target tag for a node, including `h1`..`h6` for headings.
pub fn render_tag(node: &SyntaxNode) -> Option<&'static str> {
    match heading_rank(node) {
        Some(rank) => HEADING_TAGS.get(usize::from(rank).checked_sub(1)?).copied(),
        None => node.kind().html_tag(),
    }
}
