//! Block-level constructs.

use crate::parser::token::TokenId;
use crate::parser::{Code, Effects, Step, TokenizeContext, Tokenizer};
use crate::syntax_kind::SyntaxKind;

use super::Construct;

const MAX_HEADING_RANK: usize = 6;

/// ATX heading: `#` to `######`, then whitespace and the heading text.
#[derive(Debug, Clone, Copy)]
pub struct Heading;

impl Construct for Heading {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn tokenizer(&self, _cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(HeadingScanner {
            state: State::Start,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Sequence {
        heading: TokenId,
        sequence: TokenId,
        size: usize,
    },
    Whitespace {
        heading: TokenId,
        whitespace: TokenId,
    },
    Text {
        heading: TokenId,
        text: TokenId,
    },
}

#[derive(Debug)]
pub struct HeadingScanner {
    state: State,
}

impl Tokenizer for HeadingScanner {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        match self.state {
            State::Start => {
                if code != Code::Char('#') {
                    return Step::Reject;
                }
                let heading = effects.enter(SyntaxKind::HEADING);
                let sequence = effects.enter(SyntaxKind::HEADING_SEQUENCE);
                effects.consume('#');
                self.state = State::Sequence {
                    heading,
                    sequence,
                    size: 1,
                };
                Step::Continue
            }
            State::Sequence {
                heading,
                sequence,
                size,
            } => match code {
                Code::Char('#') if size < MAX_HEADING_RANK => {
                    effects.consume('#');
                    self.state = State::Sequence {
                        heading,
                        sequence,
                        size: size + 1,
                    };
                    Step::Continue
                }
                code if code.is_eol_or_eof() => {
                    effects.exit(sequence);
                    effects.exit(heading);
                    Step::Accept
                }
                Code::Char(c @ (' ' | '\t')) => {
                    effects.exit(sequence);
                    let whitespace = effects.enter(SyntaxKind::WHITESPACE);
                    effects.consume(c);
                    self.state = State::Whitespace {
                        heading,
                        whitespace,
                    };
                    Step::Continue
                }
                _ => Step::Reject,
            },
            State::Whitespace {
                heading,
                whitespace,
            } => match code {
                Code::Char(c @ (' ' | '\t')) => {
                    effects.consume(c);
                    Step::Continue
                }
                Code::Char(c) if c != '\n' => {
                    effects.exit(whitespace);
                    let text = effects.enter(SyntaxKind::HEADING_TEXT);
                    effects.consume(c);
                    self.state = State::Text { heading, text };
                    Step::Continue
                }
                _ => {
                    effects.exit(whitespace);
                    effects.exit(heading);
                    Step::Accept
                }
            },
            State::Text { heading, text } => match code {
                Code::Char(c) if c != '\n' => {
                    effects.consume(c);
                    Step::Continue
                }
                _ => {
                    effects.exit(text);
                    effects.exit(heading);
                    Step::Accept
                }
            },
        }
    }
}
