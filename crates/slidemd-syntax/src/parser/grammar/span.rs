//! Delimiter runs for highlight (`==`), subscript (`~`) and superscript (`^`).
//!
//! The tokenizers only mark a run of the exact length as a provisional
//! `*_SEQUENCE_TEMP` token; the content between two runs is ordinary text.
//! Pairing happens afterwards in [`resolve_spans`].

use log::trace;

use crate::parser::event::Event;
use crate::parser::resolve::{ResolveContext, resolve_spans};
use crate::parser::token::TokenId;
use crate::parser::{Code, Effects, Step, TokenizeContext, Tokenizer};
use crate::syntax_kind::SyntaxKind;

use super::Construct;

/// The three delimiter-paired span kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Highlight,
    Subscript,
    Superscript,
}

impl SpanKind {
    pub fn marker(self) -> char {
        match self {
            SpanKind::Highlight => '=',
            SpanKind::Subscript => '~',
            SpanKind::Superscript => '^',
        }
    }

    /// Exact number of markers in a run.
    pub fn run_len(self) -> usize {
        match self {
            SpanKind::Highlight => 2,
            SpanKind::Subscript | SpanKind::Superscript => 1,
        }
    }

    pub fn temp_sequence(self) -> SyntaxKind {
        match self {
            SpanKind::Highlight => SyntaxKind::HIGHLIGHT_SEQUENCE_TEMP,
            SpanKind::Subscript => SyntaxKind::SUBSCRIPT_SEQUENCE_TEMP,
            SpanKind::Superscript => SyntaxKind::SUPERSCRIPT_SEQUENCE_TEMP,
        }
    }

    pub fn sequence(self) -> SyntaxKind {
        match self {
            SpanKind::Highlight => SyntaxKind::HIGHLIGHT_SEQUENCE,
            SpanKind::Subscript => SyntaxKind::SUBSCRIPT_SEQUENCE,
            SpanKind::Superscript => SyntaxKind::SUPERSCRIPT_SEQUENCE,
        }
    }

    pub fn span(self) -> SyntaxKind {
        match self {
            SpanKind::Highlight => SyntaxKind::HIGHLIGHT,
            SpanKind::Subscript => SyntaxKind::SUBSCRIPT,
            SpanKind::Superscript => SyntaxKind::SUPERSCRIPT,
        }
    }

    fn name(self) -> &'static str {
        match self {
            SpanKind::Highlight => "highlight",
            SpanKind::Subscript => "subscript",
            SpanKind::Superscript => "superscript",
        }
    }

    /// Whether a run may start after `cx`.
    ///
    /// A `~` or `^` run never continues a run of its own marker, unless the
    /// marker right before was escaped: `\~~x~` still opens a subscript.
    /// Highlight has no such rule. In `===x==` the run at the first `=` is
    /// too long, and the one starting at the second `=` opens.
    pub fn admits(self, cx: &TokenizeContext) -> bool {
        match self {
            SpanKind::Highlight => true,
            SpanKind::Subscript | SpanKind::Superscript => {
                cx.previous != Some(self.marker()) || cx.after_escape()
            }
        }
    }
}

/// The construct for one span kind.
#[derive(Debug, Clone, Copy)]
pub struct Span(pub SpanKind);

impl Construct for Span {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn tokenizer(&self, cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(SpanRun {
            kind: self.0,
            admitted: self.0.admits(cx),
            state: RunState::Start,
        })
    }

    fn resolve_all(&self, events: Vec<Event>, cx: &mut ResolveContext<'_>) -> Vec<Event> {
        resolve_spans(self.0, events, cx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Start,
    More { token: TokenId, size: usize },
}

/// Scans one run of exactly [`SpanKind::run_len`] markers.
#[derive(Debug)]
pub struct SpanRun {
    kind: SpanKind,
    admitted: bool,
    state: RunState,
}

impl Tokenizer for SpanRun {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        let marker = self.kind.marker();

        match self.state {
            RunState::Start => {
                if !self.admitted || code != Code::Char(marker) {
                    return Step::Reject;
                }
                let token = effects.enter(self.kind.temp_sequence());
                effects.consume(marker);
                self.state = RunState::More { token, size: 1 };
                Step::Continue
            }
            RunState::More { token, size } => {
                if code == Code::Char(marker) {
                    if size == self.kind.run_len() {
                        trace!("{} run longer than {}", self.kind.name(), size);
                        return Step::Reject;
                    }
                    effects.consume(marker);
                    self.state = RunState::More {
                        token,
                        size: size + 1,
                    };
                    return Step::Continue;
                }

                if size < self.kind.run_len() {
                    return Step::Reject;
                }
                effects.exit(token);
                Step::Accept
            }
        }
    }
}
