//! # Tokenizer Events
//!
//! Events are the intermediate representation between scanning and tree
//! building. Instead of building the tree directly, constructs emit a **flat
//! sequence** of enter/exit events that describe the tree structure.
//!
//! ## Why Events?
//!
//! The delimiter resolver needs to pair runs that were scanned independently
//! and wrap everything between them in a new span. On a flat list that is a
//! slice replacement at known indices; on a tree it would be a rewrite of
//! arbitrary subtrees.
//!
//! ## Event Protocol
//!
//! ```text
//! Enter(HIGHLIGHT)
//!   Enter(HIGHLIGHT_SEQUENCE)  Exit(HIGHLIGHT_SEQUENCE)
//!   Enter(DATA)                Exit(DATA)
//!   Enter(HIGHLIGHT_SEQUENCE)  Exit(HIGHLIGHT_SEQUENCE)
//! Exit(HIGHLIGHT)
//! ```
//!
//! An enter directly followed by the exit of the same token is a leaf. The
//! [`Sink`](super::sink::Sink) processes events in order, maintaining a stack
//! of open nodes: enter pushes, exit pops.

use crate::parser::token::TokenId;

/// Whether an event opens or closes its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Enter,
    Exit,
}

/// The content type an event was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Block level, line spanning.
    Flow,
    /// Inline, inside a paragraph or heading.
    Text,
}

/// An event emitted while tokenizing or resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub token: TokenId,
    pub content: ContentType,
}

impl Event {
    /// Create an enter event.
    pub fn enter(token: TokenId, content: ContentType) -> Self {
        Self {
            kind: EventKind::Enter,
            token,
            content,
        }
    }

    /// Create an exit event.
    pub fn exit(token: TokenId, content: ContentType) -> Self {
        Self {
            kind: EventKind::Exit,
            token,
            content,
        }
    }

    pub fn is_enter(&self) -> bool {
        self.kind == EventKind::Enter
    }

    pub fn is_exit(&self) -> bool {
        self.kind == EventKind::Exit
    }
}
