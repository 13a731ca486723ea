use thiserror::Error;

use crate::syntax_kind::SyntaxKind;

/// Errors raised while turning an event list into a syntax tree.
///
/// Tokenizing itself never fails: constructs that do not apply reject and
/// their input is read as text. These errors mean the event list breaks the
/// nesting or coverage rules, which is a bug in a construct or resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("event list does not start and end with a single root token")]
    MissingRoot,

    #[error("exit of {kind:?} at byte {offset} does not close the innermost open token")]
    MismatchedExit { kind: SyntaxKind, offset: usize },

    #[error("{count} token(s) still open after the last event")]
    UnclosedTokens { count: usize },

    #[error("bytes {start}..{end} are not covered by any token")]
    Gap { start: usize, end: usize },

    #[error("{kind:?} starts at byte {start} but the previous token ends at byte {cursor}")]
    Overlap {
        kind: SyntaxKind,
        start: usize,
        cursor: usize,
    },

    #[error("document covers {covered} of {len} bytes")]
    Incomplete { covered: usize, len: usize },
}
