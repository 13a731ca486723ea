//! # HTML-like Blocks
//!
//! Triggered by `<` in both flow and text content. The scanner keeps the raw
//! text of the block in a buffer and classifies it lazily:
//!
//! | Opening | Kind | Terminal pattern (whole buffer) |
//! |---------|------|---------------------------------|
//! | `<!--` | Comment | ends with `-->` |
//! | `<?` | Instruction | ends with `?>` |
//! | `<!` + letter | Declaration | ends with `>` |
//! | `<![CDATA[` | CData | ends with `]]>` |
//! | `<` + letter | decided at the first `>` | see below |
//!
//! A tag opening is classified at its first `>`: Complete if a `/` came right
//! before it, Raw if the tag name is one of `pre`, `script`, `style` and
//! `textarea`, and Tags otherwise. Raw and Tags need a matching `</name>` at
//! the end of the buffer (case-insensitively for Raw).
//!
//! ## Termination
//!
//! At **every** `>` the whole buffer is tested against the terminal pattern
//! of its kind. A `>` that does not complete the pattern is content, so
//! `<!-- a > b -->` is one comment. Reaching the end of input without a match
//! rejects the attempt.
//!
//! In flow content each line feed closes the data token, is emitted as a
//! `LINE_ENDING` and the data token is reopened on the next line. The buffer
//! keeps the line feed, so multi-line blocks still match as a whole.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::parser::event::ContentType;
use crate::parser::token::TokenId;
use crate::parser::{Code, Effects, Step, TokenizeContext, Tokenizer};
use crate::syntax_kind::SyntaxKind;

use super::Construct;

const RAW_TAG_NAMES: [&str; 4] = ["pre", "script", "style", "textarea"];
const CDATA_PREFIX: &str = "<![CDATA[";

/// Classification of an HTML-like block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A tag opening whose first `>` has not been seen yet.
    Unknown,
    /// `<pre>`, `<script>`, `<style>`, `<textarea>`
    Raw,
    /// `<!-- ... -->`
    Comment,
    /// `<? ... ?>`
    Instruction,
    /// `<!DOCTYPE ...>`
    Declaration,
    /// `<![CDATA[ ... ]]>`
    CData,
    /// `<name ...> ... </name>`
    Tags,
    /// `<name .../>`
    Complete,
}

fn tag_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<([a-zA-Z][a-zA-Z0-9\-:/.]*)").expect("valid regex"))
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^<!--.*-->$").expect("valid regex"))
}

fn instruction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^<\?.*\?>$").expect("valid regex"))
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^<![A-Za-z].*>$").expect("valid regex"))
}

fn cdata_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^<!\[CDATA\[.*\]\]>$").expect("valid regex"))
}

fn complete_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^<[a-zA-Z][a-zA-Z0-9\-:/.]*(?:\s.*)?/>$").expect("valid regex")
    })
}

/// The tag name right after the opening `<`.
fn tag_name(buffer: &str) -> Option<&str> {
    tag_name_regex()
        .captures(buffer)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// `<name` + (`>` | whitespace ... `>`) + anything + `</name>`.
///
/// The `regex` crate has no backreferences, so the closing tag is checked
/// by hand against the captured opening name.
fn paired_matches(buffer: &str, ignore_case: bool) -> bool {
    let Some(name) = tag_name(buffer) else {
        return false;
    };

    let closing = format!("</{name}>");
    let head_start = 1 + name.len();
    if buffer.len() < head_start + 1 + closing.len() {
        return false;
    }

    let tail = &buffer.as_bytes()[buffer.len() - closing.len()..];
    let closed = if ignore_case {
        tail.eq_ignore_ascii_case(closing.as_bytes())
    } else {
        tail == closing.as_bytes()
    };
    if !closed {
        return false;
    }

    let Some(head) = buffer.get(head_start..buffer.len() - closing.len()) else {
        return false;
    };
    match head.chars().next() {
        Some('>') => true,
        Some(c) if c.is_whitespace() => head[c.len_utf8()..].contains('>'),
        _ => false,
    }
}

/// Whether `buffer` is a complete block of `kind`.
pub fn terminal_matches(kind: BlockKind, buffer: &str) -> bool {
    match kind {
        BlockKind::Unknown => false,
        BlockKind::Raw => paired_matches(buffer, true),
        BlockKind::Comment => comment_regex().is_match(buffer),
        BlockKind::Instruction => instruction_regex().is_match(buffer),
        BlockKind::Declaration => declaration_regex().is_match(buffer),
        BlockKind::CData => cdata_regex().is_match(buffer),
        BlockKind::Tags => paired_matches(buffer, false),
        BlockKind::Complete => complete_regex().is_match(buffer),
    }
}

/// The HTML block construct.
#[derive(Debug, Clone, Copy)]
pub struct Html;

impl Construct for Html {
    fn name(&self) -> &'static str {
        "html"
    }

    fn tokenizer(&self, cx: &TokenizeContext) -> Box<dyn Tokenizer> {
        Box::new(HtmlScanner::new(cx.content))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    /// After `<`.
    Open,
    /// After `<!`.
    Bang,
    /// After `<!-`.
    CommentOpen,
    /// Inside `<![CDATA[`.
    CDataOpen,
    More,
    Done,
}

/// Buffered scanner for one HTML-like block.
#[derive(Debug)]
pub struct HtmlScanner {
    state: State,
    kind: BlockKind,
    flow: bool,
    buffer: String,
    previous_slash: bool,
    wrapper: Option<TokenId>,
    data: Option<TokenId>,
}

impl HtmlScanner {
    pub fn new(content: ContentType) -> Self {
        Self {
            state: State::Start,
            kind: BlockKind::Unknown,
            flow: content == ContentType::Flow,
            buffer: String::new(),
            previous_slash: false,
            wrapper: None,
            data: None,
        }
    }

    fn data_kind(&self) -> SyntaxKind {
        if self.flow {
            SyntaxKind::HTML_FLOW_DATA
        } else {
            SyntaxKind::HTML_TEXT_DATA
        }
    }

    /// Consume `c` into the data token, opening it if needed.
    fn take(&mut self, effects: &mut Effects<'_>, c: char) {
        if self.data.is_none() {
            self.data = Some(effects.enter(self.data_kind()));
        }
        effects.consume(c);
        self.buffer.push(c);
    }

    fn line_ending(&mut self, effects: &mut Effects<'_>) {
        if let Some(data) = self.data.take() {
            effects.exit(data);
        }
        let line_ending = effects.enter(SyntaxKind::LINE_ENDING);
        effects.consume('\n');
        effects.exit(line_ending);
        self.buffer.push('\n');
    }

    /// Decide what a tag opening is, at its first `>`.
    fn classify(&self) -> BlockKind {
        if self.previous_slash {
            return BlockKind::Complete;
        }
        match tag_name(&self.buffer) {
            Some(name) if RAW_TAG_NAMES.contains(&name) => BlockKind::Raw,
            _ => BlockKind::Tags,
        }
    }

    fn more(&mut self, effects: &mut Effects<'_>, c: char) {
        match c {
            '\n' if self.flow => {
                self.previous_slash = false;
                self.line_ending(effects);
            }
            '/' => {
                self.previous_slash = true;
                self.take(effects, c);
            }
            '>' => {
                if self.kind == BlockKind::Unknown {
                    self.kind = self.classify();
                }
                self.previous_slash = false;
                self.take(effects, c);

                if terminal_matches(self.kind, &self.buffer) {
                    if let Some(data) = self.data.take() {
                        effects.exit(data);
                    }
                    if let Some(wrapper) = self.wrapper.take() {
                        effects.exit(wrapper);
                    }
                    debug!("{:?} html block of {} bytes", self.kind, self.buffer.len());
                    self.state = State::Done;
                }
            }
            _ => {
                self.previous_slash = false;
                self.take(effects, c);
            }
        }
    }
}

impl Tokenizer for HtmlScanner {
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step {
        if self.state == State::Done {
            return Step::Accept;
        }
        let Code::Char(c) = code else {
            return Step::Reject;
        };

        match self.state {
            State::Start => {
                if c != '<' {
                    return Step::Reject;
                }
                self.wrapper = Some(effects.enter(if self.flow {
                    SyntaxKind::HTML_FLOW
                } else {
                    SyntaxKind::HTML_TEXT
                }));
                self.take(effects, c);
                self.state = State::Open;
            }
            State::Open => match c {
                '!' => {
                    self.take(effects, c);
                    self.state = State::Bang;
                }
                '?' => {
                    self.kind = BlockKind::Instruction;
                    self.take(effects, c);
                    self.state = State::More;
                }
                c if c.is_ascii_alphabetic() => {
                    self.take(effects, c);
                    self.state = State::More;
                }
                _ => return Step::Reject,
            },
            State::Bang => match c {
                '-' => {
                    self.kind = BlockKind::Comment;
                    self.take(effects, c);
                    self.state = State::CommentOpen;
                }
                '[' => {
                    self.kind = BlockKind::CData;
                    self.take(effects, c);
                    self.state = State::CDataOpen;
                }
                c if c.is_ascii_alphabetic() => {
                    self.kind = BlockKind::Declaration;
                    self.take(effects, c);
                    self.state = State::More;
                }
                _ => return Step::Reject,
            },
            State::CommentOpen => {
                if c != '-' {
                    return Step::Reject;
                }
                self.take(effects, c);
                self.state = State::More;
            }
            State::CDataOpen => {
                if CDATA_PREFIX[self.buffer.len()..].chars().next() != Some(c) {
                    return Step::Reject;
                }
                self.take(effects, c);
                if self.buffer == CDATA_PREFIX {
                    self.state = State::More;
                }
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
    #[case::tags("<div>hello</div>", Some(16))]
    #[case::tags_with_attributes(r#"<div class="a">b</div>"#, Some(22))]
    #[case::unclosed_tag("<div>", None)]
    #[case::other_closing_tag("<div>a</span>", None)]
    #[case::longer_name("<divx>a</div>", None)]
    #[case::stops_at_first_match("<div>a</div> tail", Some(12))]
    #[case::nearest_close("<div><div>x</div></div>", Some(17))]
    #[case::comment("<!-- a > b -->", Some(14))]
    #[case::comment_too_short("<!-->", None)]
    #[case::comment_single_dash("<!- x -->", None)]
    #[case::instruction("<?php echo 1 ?>", Some(15))]
    #[case::instruction_shared_question_mark("<?>", None)]
    #[case::declaration("<!DOCTYPE html>", Some(15))]
    #[case::lowercase_declaration("<!doctype html>", Some(15))]
    #[case::cdata("<![CDATA[x > y]]>", Some(17))]
    #[case::broken_cdata_prefix("<![CDAT x]]>", None)]
    #[case::self_closing("<br/>", Some(5))]
    #[case::self_closing_with_space("<br />", Some(6))]
    #[case::self_closing_attributes(r#"<img src="a.png"/>"#, Some(18))]
    #[case::raw("<pre>a</pre>", Some(12))]
    #[case::raw_closing_case("<pre>a</PRE>", Some(12))]
    #[case::uppercase_is_not_raw("<PRE>a</pre>", None)]
    #[case::space_after_lt("< div>", None)]
    #[case::digit_after_lt("<1>", None)]
    #[case::bang_digit("<!1>", None)]
    fn text_boundaries(#[case] source: &str, #[case] expected: Option<usize>) {
        assert_eq!(accepts(&Html, source, text()), expected);
    }

    #[test]
    fn text_block_keeps_line_feeds_in_data() {
        let scan = scan(&Html, "<b>\n</b>", text()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::HTML_TEXT, "<b>\n</b>".to_string()),
                (SyntaxKind::HTML_TEXT_DATA, "<b>\n</b>".to_string()),
            ]
        );
    }

    #[test]
    fn flow_block_splits_data_per_line() {
        let scan = scan(&Html, "<!--\na\n-->", flow()).unwrap();
        assert_eq!(
            scan.tokens,
            vec![
                (SyntaxKind::HTML_FLOW, "<!--\na\n-->".to_string()),
                (SyntaxKind::HTML_FLOW_DATA, "<!--".to_string()),
                (SyntaxKind::LINE_ENDING, "\n".to_string()),
                (SyntaxKind::HTML_FLOW_DATA, "a".to_string()),
                (SyntaxKind::LINE_ENDING, "\n".to_string()),
                (SyntaxKind::HTML_FLOW_DATA, "-->".to_string()),
            ]
        );
    }

    #[test]
    fn flow_block_spans_blank_lines() {
        assert_eq!(accepts(&Html, "<div>\n\n</div>", flow()), Some(13));
    }

    #[rstest]
    #[case::comment(BlockKind::Comment, "<!-- x -->", true)]
    #[case::comment_open(BlockKind::Comment, "<!-- x >", false)]
    #[case::tags_whitespace_head(BlockKind::Tags, "<a\thref=x>y</a>", true)]
    #[case::tags_no_head_gt(BlockKind::Tags, "<a </a>", false)]
    #[case::tags_case_sensitive(BlockKind::Tags, "<a>y</A>", false)]
    #[case::raw_case_insensitive(BlockKind::Raw, "<style>y</STYLE>", true)]
    #[case::complete_without_slash(BlockKind::Complete, "<br>", false)]
    #[case::unknown(BlockKind::Unknown, "<a>", false)]
    fn terminal_patterns(#[case] kind: BlockKind, #[case] buffer: &str, #[case] expected: bool) {
        assert_eq!(terminal_matches(kind, buffer), expected);
    }
}
