//! # Core Inline Constructs
//!
//! Character escapes and code spans. Both are always enabled: the span
//! constructs rely on escapes to tell a literal marker from a delimiter, and
//! code spans keep their content opaque to every other construct.
//!
//! | Input | Tokens |
//! |-------|--------|
//! | `\=` | `CHARACTER_ESCAPE` > `ESCAPE_MARKER`, `CHARACTER_ESCAPE_VALUE` |
//! | `` `a` `` | `CODE_TEXT` > `CODE_TEXT_SEQUENCE`, `CODE_TEXT_DATA`, `CODE_TEXT_SEQUENCE` |

use crate::parser::token::{Point, TokenId};
use crate::parser::{Code, Effects, Step, TokenizeContext, Tokenizer};
use crate::syntax_kind::SyntaxKind;

use super::Construct;

/// `\` followed by ASCII punctuation.
#[derive(Debug, Clone, Copy)]
pub struct CharacterEscape;

impl Construct for CharacterEscape {
    fn name(&self) -> &'static str {
        "character_escape"
    }

    fn tokenizer(&self, _cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(EscapeScanner::Start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeScanner {
    Start,
    Value(TokenId),
    Done,
}

impl Tokenizer for EscapeScanner {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        match (*self, code) {
            (EscapeScanner::Start, Code::Char('\\')) => {
                let escape = effects.enter(SyntaxKind::CHARACTER_ESCAPE);
                let marker = effects.enter(SyntaxKind::ESCAPE_MARKER);
                effects.consume('\\');
                effects.exit(marker);
                *self = EscapeScanner::Value(escape);
                Step::Continue
            }
            (EscapeScanner::Value(escape), Code::Char(c)) if c.is_ascii_punctuation() => {
                let value = effects.enter(SyntaxKind::CHARACTER_ESCAPE_VALUE);
                effects.consume(c);
                effects.exit(value);
                effects.exit(escape);
                *self = EscapeScanner::Done;
                Step::Continue
            }
            (EscapeScanner::Done, _) => Step::Accept,
            _ => Step::Reject,
        }
    }
}

/// A backtick run, content, and a closing run of the same length.
#[derive(Debug, Clone, Copy)]
pub struct CodeSpan;

impl Construct for CodeSpan {
    fn name(&self) -> &'static str {
        "code_span"
    }

    fn tokenizer(&self, cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(CodeSpanScanner {
            admitted: cx.previous != Some('`') || cx.after_escape(),
            state: CodeState::Start,
            code_text: None,
            data: None,
            opening: 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeState {
    Start,
    Opening(TokenId),
    Inside,
    /// A backtick run inside the span, starting at the point given.
    Closing(Point, usize),
}

#[derive(Debug)]
pub struct CodeSpanScanner {
    admitted: bool,
    state: CodeState,
    code_text: Option<TokenId>,
    data: Option<TokenId>,
    opening: usize,
}

impl CodeSpanScanner {
    fn inside(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        match code {
            Code::Eof => Step::Reject,
            Code::Char('`') => {
                let start = effects.point();
                effects.consume('`');
                self.state = CodeState::Closing(start, 1);
                Step::Continue
            }
            Code::Char(c) => {
                if self.data.is_none() {
                    self.data = Some(effects.enter(SyntaxKind::CODE_TEXT_DATA));
                }
                effects.consume(c);
                self.state = CodeState::Inside;
                Step::Continue
            }
        }
    }
}

impl Tokenizer for CodeSpanScanner {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        match self.state {
            CodeState::Start => {
                if !self.admitted || code != Code::Char('`') {
                    return Step::Reject;
                }
                self.code_text = Some(effects.enter(SyntaxKind::CODE_TEXT));
                let run = effects.enter(SyntaxKind::CODE_TEXT_SEQUENCE);
                effects.consume('`');
                self.opening = 1;
                self.state = CodeState::Opening(run);
                Step::Continue
            }
            CodeState::Opening(run) => {
                if code == Code::Char('`') {
                    effects.consume('`');
                    self.opening += 1;
                    return Step::Continue;
                }
                effects.exit(run);
                self.inside(effects, code)
            }
            CodeState::Inside => self.inside(effects, code),
            CodeState::Closing(start, size) => {
                if code == Code::Char('`') {
                    effects.consume('`');
                    self.state = CodeState::Closing(start, size + 1);
                    return Step::Continue;
                }
                if size == self.opening {
                    if let Some(data) = self.data.take() {
                        effects.exit_at(data, start);
                    }
                    let run = effects.enter_at(SyntaxKind::CODE_TEXT_SEQUENCE, start);
                    effects.exit(run);
                    if let Some(code_text) = self.code_text.take() {
                        effects.exit(code_text);
                    }
                    return Step::Accept;
                }
                // A run of another length is content.
                if self.data.is_none() {
                    self.data = Some(effects.enter_at(SyntaxKind::CODE_TEXT_DATA, start));
                }
                self.inside(effects, code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{accepts, scan, text};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::equals("\\=", Some(2))]
    #[case::backslash("\\\\", Some(2))]
    #[case::letter("\\a", None)]
    #[case::line_feed("\\\n", None)]
    #[case::at_eof("\\", None)]
    fn escape_boundaries(#[case] source: &str, #[case] expected: Option<usize>) {
        assert_eq!(accepts(&CharacterEscape, source, text()), expected);
    }

    #[test]
    fn escape_tokens() {
        let scan = scan(&CharacterEscape, "\\~", text()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::CHARACTER_ESCAPE, "\\~".to_string()),
                (SyntaxKind::ESCAPE_MARKER, "\\".to_string()),
                (SyntaxKind::CHARACTER_ESCAPE_VALUE, "~".to_string()),
            ]
        );
    }

    #[rstest]
    #[case::single("`a`", Some(3))]
    #[case::double("``a`b``", Some(7))]
    #[case::stops_after_close("`a` b", Some(3))]
    #[case::unclosed("`a", None)]
    #[case::longer_close("`a``", None)]
    #[case::across_lines("`a\nb`", Some(5))]
    #[case::empty_content("``", None)]
    fn code_span_boundaries(#[case] source: &str, #[case] expected: Option<usize>) {
        assert_eq!(accepts(&CodeSpan, source, text()), expected);
    }

    #[test]
    fn code_span_tokens() {
        let scan = scan(&CodeSpan, "``a`b``", text()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::CODE_TEXT, "``a`b``".to_string()),
                (SyntaxKind::CODE_TEXT_SEQUENCE, "``".to_string()),
                (SyntaxKind::CODE_TEXT_DATA, "a`b".to_string()),
                (SyntaxKind::CODE_TEXT_SEQUENCE, "``".to_string()),
            ]
        );
    }

    #[test]
    fn shorter_runs_stay_in_one_data_token() {
        let scan = scan(&CodeSpan, "```` `x`` ```` tail", text()).unwrap();
        assert_eq!(scan.end, 14);
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::CODE_TEXT, "```` `x`` ````".to_string()),
                (SyntaxKind::CODE_TEXT_SEQUENCE, "````".to_string()),
                (SyntaxKind::CODE_TEXT_DATA, " `x`` ".to_string()),
                (SyntaxKind::CODE_TEXT_SEQUENCE, "````".to_string()),
            ]
        );
    }

    #[test]
    fn code_span_does_not_continue_a_run() {
        let cx = TokenizeContext {
            previous: Some('`'),
            ..text()
        };
        assert_eq!(accepts(&CodeSpan, "`a`", cx), None);
    }
}
