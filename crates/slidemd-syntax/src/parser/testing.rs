//! Helpers for driving a single construct in unit tests.

use crate::parser::event::ContentType;
use crate::parser::grammar::{Construct, ParseOptions};
use crate::parser::token::Point;
use crate::parser::{Host, TokenizeContext};
use crate::syntax_kind::SyntaxKind;

/// An accepted attempt: where it stopped and the tokens it entered.
#[derive(Debug, PartialEq, Eq)]
pub struct Scan {
    pub end: usize,
    pub tokens: Vec<(SyntaxKind, String)>,
}

pub fn flow() -> TokenizeContext {
    TokenizeContext {
        previous: None,
        previous_kind: None,
        content: ContentType::Flow,
    }
}

pub fn text() -> TokenizeContext {
    TokenizeContext {
        previous: None,
        previous_kind: None,
        content: ContentType::Text,
    }
}

/// Attempt `construct` at the start of `source`.
pub fn scan(construct: &dyn Construct, source: &str, cx: TokenizeContext) -> Option<Scan> {
    let mut host = Host::new(source, &ParseOptions::default());
    let attempt = host.attempt(construct, Point::start(), source.len(), &cx)?;

    let tokens = attempt
        .events
        .iter()
        .filter(|event| event.is_enter())
        .map(|event| {
            let token = host.tokens[event.token];
            (token.kind, source[token.range()].to_string())
        })
        .collect();

    Some(Scan {
        end: attempt.end.offset,
        tokens,
    })
}

/// Offset where `construct` stops, if it accepts.
pub fn accepts(construct: &dyn Construct, source: &str, cx: TokenizeContext) -> Option<usize> {
    scan(construct, source, cx).map(|scan| scan.end)
}
