//! # Parser - Push-Driven Construct Tokenizing
//!
//! This module hosts the constructs. It owns the source, feeds code points to
//! whichever construct is being attempted, commits the events of constructs
//! that accept and forgets the work of constructs that reject.
//!
//! ## The Step Protocol
//!
//! A construct is a [`Tokenizer`]: an explicit state enum plus a
//! `step(code) -> Step` transition function. The host calls `step` once per
//! code point and once more with [`Code::Eof`] at the end of the scanned range.
//!
//! - [`Step::Continue`]: the construct consumed `code` and wants the next one
//! - [`Step::Accept`]: the construct is done; `code` was **not** consumed
//! - [`Step::Reject`]: the construct does not apply here
//!
//! Constructs never retract events. Anything that can only be validated
//! later is buffered inside the tokenizer and re-checked at every candidate
//! terminator; on reject the host drops every event and token of the attempt,
//! so zero characters are committed.
//!
//! ## Two Passes
//!
//! ```text
//! source → flow pass (blank lines, headings, paragraphs, flow constructs)
//!        → text pass per chunk (data, escapes, code spans, text constructs)
//!        → resolvers per chunk (delimiter pairing)
//!        → Sink → Rowan tree
//! ```
//!
//! ## Module Structure
//!
//! - [`token`] - Points, tokens and the token arena
//! - [`event`] - The Event type
//! - [`grammar`] - Constructs, the registry and the options
//! - [`resolve`] - Delimiter resolution and data merging
//! - [`sink`] - Converts events to a Rowan tree
//!
//! ## Public API
//!
//! ```
//! use slidemd_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("h~2~o").unwrap();
//! assert_eq!(tree.kind(), SyntaxKind::DOCUMENT);
//! assert_eq!(tree.text().to_string(), "h~2~o");
//! ```

pub mod event;
pub mod grammar;
pub mod resolve;
pub mod sink;
pub mod token;

#[cfg(test)]
mod testing;

use std::fmt::Write as _;
use std::rc::Rc;

use log::{trace, warn};

use crate::error::CompileError;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::{ContentType, Event, EventKind};
use grammar::{Construct, Constructs, ParseOptions};
use resolve::{ResolveContext, merge_data, resolve_all};
use sink::Sink;
use token::{Point, Token, TokenId, Tokens};

/// One input symbol: a code point or the end-of-input sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    Char(char),
    Eof,
}

impl Code {
    pub fn char(self) -> Option<char> {
        match self {
            Code::Char(c) => Some(c),
            Code::Eof => None,
        }
    }

    /// End of input or a line feed.
    pub fn is_eol_or_eof(self) -> bool {
        matches!(self, Code::Eof | Code::Char('\n'))
    }
}

/// Outcome of a single tokenizer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Accept,
    Reject,
}

/// What a construct may know about its surroundings when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeContext {
    /// The code point right before the trigger, if any.
    pub previous: Option<char>,
    /// The kind of the most recent committed token in this scope.
    pub previous_kind: Option<SyntaxKind>,
    /// Flow or text.
    pub content: ContentType,
}

impl TokenizeContext {
    /// Returns true if the trigger directly follows a character escape.
    pub fn after_escape(&self) -> bool {
        self.previous_kind == Some(SyntaxKind::CHARACTER_ESCAPE)
    }
}

/// A construct state machine.
pub trait Tokenizer {
    /// Feed one code point (or [`Code::Eof`]) to the current state.
    fn step(&mut self, effects: &mut Effects<'_>, code: Code) -> Step;
}

/// The capability a tokenizer uses to produce events.
///
/// Events are buffered here until the host decides whether the attempt is
/// committed.
pub struct Effects<'t> {
    tokens: &'t mut Tokens,
    events: Vec<Event>,
    open: Vec<TokenId>,
    point: Point,
    content: ContentType,
    pending: Code,
    consumed: bool,
}

impl<'t> Effects<'t> {
    fn new(tokens: &'t mut Tokens, point: Point, content: ContentType) -> Self {
        Self {
            tokens,
            events: Vec::new(),
            open: Vec::new(),
            point,
            content,
            pending: Code::Eof,
            consumed: false,
        }
    }

    /// Open a token at the current position.
    pub fn enter(&mut self, kind: SyntaxKind) -> TokenId {
        let id = self.tokens.push(Token {
            kind,
            start: self.point,
            end: self.point,
        });
        self.events.push(Event::enter(id, self.content));
        self.open.push(id);
        id
    }

    /// Consume the code point currently offered to the tokenizer.
    pub fn consume(&mut self, c: char) {
        debug_assert_eq!(self.pending, Code::Char(c), "consumed a code not offered");
        debug_assert!(!self.consumed, "consumed twice in one step");
        self.point.advance(c);
        self.consumed = true;
    }

    /// Close `id`, which must be the innermost open token.
    pub fn exit(&mut self, id: TokenId) {
        debug_assert_eq!(self.open.last(), Some(&id), "exit out of order");
        self.open.pop();
        self.tokens[id].end = self.point;
        self.events.push(Event::exit(id, self.content));
    }

    /// Open a token at an earlier `start`, for markers only recognized once
    /// they are complete. Nothing may have been entered since `start`.
    pub fn enter_at(&mut self, kind: SyntaxKind, start: Point) -> TokenId {
        debug_assert!(start <= self.point, "entered past the current position");
        let id = self.enter(kind);
        self.tokens[id].start = start;
        id
    }

    /// Close `id` at an earlier `end`. Pairs with [`Effects::enter_at`].
    pub fn exit_at(&mut self, id: TokenId, end: Point) {
        debug_assert!(end <= self.point, "exited past the current position");
        self.exit(id);
        self.tokens[id].end = end;
    }

    /// Change the kind of a token created during this attempt.
    pub fn retype(&mut self, id: TokenId, kind: SyntaxKind) {
        self.tokens[id].kind = kind;
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn content(&self) -> ContentType {
        self.content
    }
}

/// The events of an accepted attempt and where it stopped.
struct Attempt {
    events: Vec<Event>,
    end: Point,
}

/// Drives constructs over one source string.
struct Host<'s> {
    source: &'s str,
    tokens: Tokens,
    constructs: Constructs,
}

impl<'s> Host<'s> {
    fn new(source: &'s str, options: &ParseOptions) -> Self {
        Self {
            source,
            tokens: Tokens::new(),
            constructs: Constructs::new(options),
        }
    }

    /// Run one construct from `start`, offering code points up to `limit`.
    fn attempt(
        &mut self,
        construct: &dyn Construct,
        start: Point,
        limit: usize,
        cx: &TokenizeContext,
    ) -> Option<Attempt> {
        let mark = self.tokens.len();
        let mut tokenizer = construct.tokenizer(cx);
        let mut effects = Effects::new(&mut self.tokens, start, cx.content);
        let mut rest = self.source[start.offset..limit].chars();

        trace!("attempt {} at {}", construct.name(), start.offset);

        loop {
            let code = rest.clone().next().map_or(Code::Eof, Code::Char);
            effects.pending = code;
            effects.consumed = false;

            match tokenizer.step(&mut effects, code) {
                Step::Continue if effects.consumed => {
                    rest.next();
                }
                Step::Continue => {
                    warn!("{} continued without consuming {code:?}", construct.name());
                    break;
                }
                Step::Accept if effects.open.is_empty() && effects.point.offset > start.offset => {
                    return Some(Attempt {
                        events: effects.events,
                        end: effects.point,
                    });
                }
                Step::Accept => {
                    warn!("{} accepted with open tokens or no input", construct.name());
                    break;
                }
                Step::Reject => {
                    trace!("{} rejected at {}", construct.name(), effects.point.offset);
                    break;
                }
            }
        }

        self.tokens.truncate(mark);
        None
    }

    /// Push a token covering `start..end` as an enter/exit pair.
    fn leaf(
        &mut self,
        events: &mut Vec<Event>,
        kind: SyntaxKind,
        start: Point,
        end: usize,
        content: ContentType,
    ) -> Point {
        let mut stop = start;
        stop.advance_str(&self.source[start.offset..end]);
        let id = self.tokens.push(Token {
            kind,
            start,
            end: stop,
        });
        events.push(Event::enter(id, content));
        events.push(Event::exit(id, content));
        stop
    }

    /// Emit a flow line ending if one is at `point`.
    fn line_ending(&mut self, events: &mut Vec<Event>, point: Point) -> Point {
        if self.source[point.offset..].starts_with('\n') {
            self.leaf(
                events,
                SyntaxKind::LINE_ENDING,
                point,
                point.offset + 1,
                ContentType::Flow,
            )
        } else {
            point
        }
    }

    /// Tokenize the whole source as block content.
    fn flow(&mut self) -> Vec<Event> {
        let source = self.source;
        let len = source.len();
        let mut events = Vec::new();
        let mut point = Point::start();

        while point.offset < len {
            let line_end = line_end(source, point.offset);
            let line = &source[point.offset..line_end];

            if is_blank(line) {
                if !line.is_empty() {
                    point = self.leaf(
                        &mut events,
                        SyntaxKind::WHITESPACE,
                        point,
                        line_end,
                        ContentType::Flow,
                    );
                }
                point = self.line_ending(&mut events, point);
                continue;
            }

            if let Some(attempt) = self.flow_construct(point) {
                events.extend(attempt.events);
                point = self.line_ending(&mut events, attempt.end);
                continue;
            }

            let end = paragraph_end(source, point.offset);
            point = self.leaf(
                &mut events,
                SyntaxKind::PARAGRAPH,
                point,
                end,
                ContentType::Flow,
            );
            point = self.line_ending(&mut events, point);
        }

        events
    }

    /// Try the flow constructs registered for the first code point of a line.
    ///
    /// A flow construct has to end its line; one that stops mid-line is
    /// discarded so the line can be read as a paragraph instead.
    fn flow_construct(&mut self, point: Point) -> Option<Attempt> {
        let c = self.source[point.offset..].chars().next()?;
        let candidates: Vec<Rc<dyn Construct>> = self.constructs.flow(c).to_vec();
        let cx = TokenizeContext {
            previous: self.source[..point.offset].chars().next_back(),
            previous_kind: None,
            content: ContentType::Flow,
        };

        let limit = self.source.len();

        for construct in candidates {
            let mark = self.tokens.len();
            let Some(attempt) = self.attempt(construct.as_ref(), point, limit, &cx) else {
                continue;
            };

            let rest = &self.source[attempt.end.offset..];
            if rest.is_empty() || rest.starts_with('\n') {
                return Some(attempt);
            }

            trace!(
                "{} ended mid-line at {}, reading the line as text",
                construct.name(),
                attempt.end.offset
            );
            self.tokens.truncate(mark);
        }

        None
    }

    /// Tokenize `start..end` as text content.
    fn text(&mut self, start: Point, end: usize) -> Vec<Event> {
        let source = self.source;
        let mut events = Vec::new();
        let mut point = start;
        let mut previous: Option<char> = None;
        let mut data: Option<Point> = None;

        while let Some(c) = source[point.offset..end].chars().next() {
            if c == '\n' {
                self.flush_data(&mut events, &mut data, point);
                point = self.leaf(
                    &mut events,
                    SyntaxKind::LINE_ENDING,
                    point,
                    point.offset + 1,
                    ContentType::Text,
                );
                previous = Some(c);
                continue;
            }

            let candidates: Vec<Rc<dyn Construct>> = self.constructs.text(c).to_vec();
            if !candidates.is_empty() {
                let previous_kind = if data.is_some() {
                    Some(SyntaxKind::DATA)
                } else {
                    events.last().map(|event: &Event| self.tokens[event.token].kind)
                };
                let cx = TokenizeContext {
                    previous,
                    previous_kind,
                    content: ContentType::Text,
                };

                let accepted = candidates
                    .iter()
                    .find_map(|construct| self.attempt(construct.as_ref(), point, end, &cx));

                if let Some(attempt) = accepted {
                    self.flush_data(&mut events, &mut data, point);
                    previous = source[..attempt.end.offset].chars().next_back();
                    point = attempt.end;
                    events.extend(attempt.events);
                    continue;
                }
            }

            data.get_or_insert(point);
            point.advance(c);
            previous = Some(c);
        }

        self.flush_data(&mut events, &mut data, point);
        events
    }

    fn flush_data(&mut self, events: &mut Vec<Event>, data: &mut Option<Point>, end: Point) {
        if let Some(start) = data.take() {
            self.leaf(events, SyntaxKind::DATA, start, end.offset, ContentType::Text);
        }
    }

    /// Expand every text chunk with its resolved text content.
    fn subtokenize(&mut self, flow: Vec<Event>) -> Vec<Event> {
        let mut events = Vec::with_capacity(flow.len());

        for event in flow {
            events.push(event);
            let token = self.tokens[event.token];
            if event.kind != EventKind::Enter || !token.kind.is_text_chunk() {
                continue;
            }

            let inline = self.text(token.start, token.end.offset);
            let inline = resolve_all(
                &self.constructs.resolvers,
                inline,
                &mut ResolveContext {
                    tokens: &mut self.tokens,
                    inside_span: &self.constructs.inside_span,
                },
            );
            events.extend(merge_data(inline, &mut self.tokens));
        }

        events
    }
}

fn line_end(source: &str, from: usize) -> usize {
    source[from..]
        .find('\n')
        .map_or(source.len(), |index| from + index)
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

/// End of the paragraph starting at `from`: the end of its last non-blank
/// line, excluding that line's line feed.
fn paragraph_end(source: &str, from: usize) -> usize {
    let mut end = line_end(source, from);
    while end < source.len() {
        let next = line_end(source, end + 1);
        if is_blank(&source[end + 1..next]) {
            break;
        }
        end = next;
    }
    end
}

/// A tokenized and resolved document.
#[derive(Debug, Clone)]
pub struct Document<'s> {
    pub source: &'s str,
    pub tokens: Tokens,
    pub events: Vec<Event>,
}

impl<'s> Document<'s> {
    /// The source text covered by a token.
    pub fn slice(&self, id: TokenId) -> &'s str {
        &self.source[self.tokens[id].range()]
    }

    pub fn kind(&self, id: TokenId) -> SyntaxKind {
        self.tokens[id].kind
    }

    /// Build the lossless syntax tree.
    pub fn to_tree(&self) -> Result<SyntaxNode, CompileError> {
        Sink::new(self.source, &self.tokens, &self.events).finish()
    }

    /// One line per event, indented by nesting depth.
    ///
    /// ```text
    /// enter HIGHLIGHT 7..19
    ///   enter HIGHLIGHT_SEQUENCE 7..9 "=="
    /// ```
    pub fn debug_events(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;

        for event in &self.events {
            let token = &self.tokens[event.token];
            match event.kind {
                EventKind::Enter => {
                    let _ = writeln!(
                        out,
                        "{}enter {:?} {}..{} {:?}",
                        "  ".repeat(depth),
                        token.kind,
                        token.start.offset,
                        token.end.offset,
                        self.slice(event.token)
                    );
                    depth += 1;
                }
                EventKind::Exit => {
                    depth = depth.saturating_sub(1);
                    let _ = writeln!(out, "{}exit {:?}", "  ".repeat(depth), token.kind);
                }
            }
        }

        out
    }
}

/// Tokenize and resolve `source` into a [`Document`].
pub fn tokenize<'s>(source: &'s str, options: &ParseOptions) -> Document<'s> {
    let mut host = Host::new(source, options);

    let mut end = Point::start();
    end.advance_str(source);
    let root = host.tokens.push(Token {
        kind: SyntaxKind::DOCUMENT,
        start: Point::start(),
        end,
    });

    let flow = host.flow();
    let body = host.subtokenize(flow);

    let mut events = Vec::with_capacity(body.len() + 2);
    events.push(Event::enter(root, ContentType::Flow));
    events.extend(body);
    events.push(Event::exit(root, ContentType::Flow));

    Document {
        source,
        tokens: host.tokens,
        events,
    }
}

/// Parse `source` with every extension enabled.
pub fn parse(source: &str) -> Result<SyntaxNode, CompileError> {
    parse_with(source, &ParseOptions::default())
}

/// Parse `source` with the given extensions.
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<SyntaxNode, CompileError> {
    tokenize(source, options).to_tree()
}
