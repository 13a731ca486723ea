//! # Logic Blocks
//!
//! Template directives such as `{#if cond}`, `{:else}`, `{/if}` and
//! `{@html raw}`. Triggered by `{`; the second code point must be one of the
//! sigils `#`, `@`, `:` and `/`. In text content `{{` is accepted too and the
//! data token becomes [`SyntaxKind::INLINE_CODE`], so `{{literal}}` reads as
//! code rather than as a directive.
//!
//! The block ends the moment the brace depth returns to zero. Braces inside
//! a quoted region (`"`, `` ` `` or `'`) do not count, and a backslash makes
//! the next code point inert. Quotes do not nest: inside `"..."` a `'` is
//! plain content.

use log::debug;

use crate::parser::event::ContentType;
use crate::parser::token::TokenId;
use crate::parser::{Code, Effects, Step, TokenizeContext, Tokenizer};
use crate::syntax_kind::SyntaxKind;

use super::Construct;

/// The logic block construct.
#[derive(Debug, Clone, Copy)]
pub struct Logic;

impl Construct for Logic {
    fn name(&self) -> &'static str {
        "logic_block"
    }

    fn tokenizer(&self, cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(LogicScanner::new(cx.content))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    /// After the opening `{`.
    Open,
    More,
    Done,
}

/// Depth, quote and escape tracking for one logic block.
#[derive(Debug)]
pub struct LogicScanner {
    state: State,
    flow: bool,
    depth: usize,
    quote: Option<char>,
    escaped: bool,
    data_kind: SyntaxKind,
    wrapper: Option<TokenId>,
    data: Option<TokenId>,
}

impl LogicScanner {
    pub fn new(content: ContentType) -> Self {
        let flow = content == ContentType::Flow;
        Self {
            state: State::Start,
            flow,
            depth: 0,
            quote: None,
            escaped: false,
            data_kind: if flow {
                SyntaxKind::LOGIC_FLOW_DATA
            } else {
                SyntaxKind::LOGIC_TEXT_DATA
            },
            wrapper: None,
            data: None,
        }
    }

    fn take(&mut self, effects: &mut Effects<'_>, c: char) {
        if self.data.is_none() {
            self.data = Some(effects.enter(self.data_kind));
        }
        effects.consume(c);
    }

    /// Apply the escape, quote and depth rules for `c`.
    fn track(&mut self, c: char) {
        if self.escaped {
            self.escaped = false;
            return;
        }

        match (self.quote, c) {
            (_, '\\') => self.escaped = true,
            (Some(quote), c) if c == quote => self.quote = None,
            (Some(_), _) => {}
            (None, '"' | '`' | '\'') => self.quote = Some(c),
            (None, '{') => self.depth += 1,
            (None, '}') => self.depth = self.depth.saturating_sub(1),
            (None, _) => {}
        }
    }

    fn more(&mut self, effects: &mut Effects<'_>, c: char) {
        if c == '\n' && self.flow {
            if let Some(data) = self.data.take() {
                effects.exit(data);
            }
            let line_ending = effects.enter(SyntaxKind::LINE_ENDING);
            effects.consume(c);
            effects.exit(line_ending);
            return;
        }

        self.track(c);
        self.take(effects, c);

        if self.depth == 0 {
            if let Some(data) = self.data.take() {
                effects.exit(data);
            }
            if let Some(wrapper) = self.wrapper.take() {
                effects.exit(wrapper);
            }
            debug!("logic block closed at {}", effects.point().offset);
            self.state = State::Done;
        }
    }
}

impl Tokenizer for LogicScanner {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        if self.state == State::Done {
            return Step::Accept;
        }
        let Code::Char(c) = code else {
            return Step::Reject;
        };

        match self.state {
            State::Start => {
                if c != '{' {
                    return Step::Reject;
                }
                self.wrapper = Some(effects.enter(if self.flow {
                    SyntaxKind::LOGIC_FLOW
                } else {
                    SyntaxKind::LOGIC_TEXT
                }));
                self.take(effects, c);
                self.depth = 1;
                self.state = State::Open;
            }
            State::Open => {
                match c {
                    '{' if !self.flow => {
                        self.data_kind = SyntaxKind::INLINE_CODE;
                        if let Some(data) = self.data {
                            effects.retype(data, SyntaxKind::INLINE_CODE);
                        }
                    }
                    '#' | '@' | ':' | '/' => {}
                    _ => return Step::Reject,
                }
                self.state = State::More;
                self.more(effects, c);
            }
            State::More => self.more(effects, c),
            State::Done => return Step::Accept,
        }

        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{accepts, flow, scan, text};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::comparison("{#if data.items.length > 0}", Some(27))]
    #[case::quoted_brace(r#"{#if x === "}"}"#, Some(15))]
    #[case::close("{/if}", Some(5))]
    #[case::branch("{:else}", Some(7))]
    #[case::tag("{@html x}", Some(9))]
    #[case::nested("{#a {b} c}", Some(10))]
    #[case::stops_at_depth_zero("{/if} tail", Some(5))]
    #[case::other_quote_is_inert(r#"{#a '"'}"#, Some(8))]
    #[case::escaped_brace(r"{#a \}}", Some(7))]
    #[case::escaped_quote(r#"{#a "\"}"}"#, Some(10))]
    #[case::backtick_quote("{#a `}`}", Some(8))]
    #[case::plain_variable("{variable}", None)]
    #[case::space_before_sigil("{ #if}", None)]
    #[case::unterminated("{#if a", None)]
    #[case::unterminated_quote(r#"{#if "}"#, None)]
    fn text_boundaries(#[case] source: &str, #[case] expected: Option<usize>) {
        assert_eq!(accepts(&Logic, source, text()), expected);
    }

    #[test]
    fn double_brace_is_inline_code_in_text() {
        let scan = scan(&Logic, "{{literal}}", text()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::LOGIC_TEXT, "{{literal}}".to_string()),
                (SyntaxKind::INLINE_CODE, "{{literal}}".to_string()),
            ]
        );
    }

    #[test]
    fn double_brace_is_rejected_in_flow() {
        assert_eq!(accepts(&Logic, "{{literal}}", flow()), None);
    }

    #[test]
    fn flow_block_splits_data_per_line() {
        let scan = scan(&Logic, "{#a\nb}", flow()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::LOGIC_FLOW, "{#a\nb}".to_string()),
                (SyntaxKind::LOGIC_FLOW_DATA, "{#a".to_string()),
                (SyntaxKind::LINE_ENDING, "\n".to_string()),
                (SyntaxKind::LOGIC_FLOW_DATA, "b}".to_string()),
            ]
        );
    }

    #[test]
    fn flow_block_spans_blank_lines() {
        let source = "{#if \n\n\ndata \n\n\n}";
        let scan = scan(&Logic, source, flow()).unwrap();
        assert_eq!(scan.end, source.len());

        let line_ending = (SyntaxKind::LINE_ENDING, "\n".to_string());
        let mut expected = vec![
            (SyntaxKind::LOGIC_FLOW, source.to_string()),
            (SyntaxKind::LOGIC_FLOW_DATA, "{#if ".to_string()),
        ];
        expected.extend(std::iter::repeat_n(line_ending.clone(), 3));
        expected.push((SyntaxKind::LOGIC_FLOW_DATA, "data ".to_string()));
        expected.extend(std::iter::repeat_n(line_ending, 3));
        expected.push((SyntaxKind::LOGIC_FLOW_DATA, "}".to_string()));
        assert_eq!(scan.tokens, expected);
    }

    #[test]
    fn flow_line_feed_keeps_the_escape() {
        // The backslash still applies to the `}` on the next line.
        assert_eq!(accepts(&Logic, "{#a \\\n}", flow()), None);
        // In text the line feed itself is the escaped code point.
        assert_eq!(accepts(&Logic, "{#a \\\n}", text()), Some(7));
    }

    #[test]
    fn quote_state_is_single_level() {
        let mut scanner = LogicScanner::new(ContentType::Text);
        scanner.depth = 1;
        for c in "\"'".chars() {
            scanner.track(c);
        }
        assert_eq!(scanner.quote, Some('"'));
        scanner.track('}');
        assert_eq!(scanner.depth, 1);
        scanner.track('"');
        assert_eq!(scanner.quote, None);
        scanner.track('}');
        assert_eq!(scanner.depth, 0);
    }
}
