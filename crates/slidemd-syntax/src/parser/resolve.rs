//! # Delimiter Resolution
//!
//! Span tokenizers only mark delimiter runs (`==`, `~`, `^`) as provisional
//! `*_SEQUENCE_TEMP` tokens. Once a whole text scope is tokenized, each span
//! kind runs [`resolve_spans`] over the event list:
//!
//! 1. find the first **exit** of a temp run (the opener)
//! 2. find the next **enter** of a temp run of the same kind (the closer)
//! 3. relabel both as final sequences, wrap them and everything between them
//!    in a span token, resolve the interior with the inside-span participants
//!    and splice the result in place of the old region
//! 4. continue after the spliced region
//!
//! Runs still provisional at the end become plain [`SyntaxKind::DATA`].
//!
//! Pairing is nearest-following: `==a==b==` pairs the first two runs and
//! leaves the third as text, whatever the nesting would suggest.

use std::rc::Rc;

use log::debug;

use crate::parser::event::{Event, EventKind};
use crate::parser::grammar::Construct;
use crate::parser::grammar::span::SpanKind;
use crate::parser::token::{Token, Tokens};
use crate::syntax_kind::SyntaxKind;

/// What a resolver may touch.
pub struct ResolveContext<'a> {
    pub tokens: &'a mut Tokens,
    /// Constructs that resolve the interior of a matched span.
    pub inside_span: &'a [Rc<dyn Construct>],
}

/// Run the resolver of every construct once, in order, skipping constructs
/// whose name was already seen.
pub fn resolve_all(
    constructs: &[Rc<dyn Construct>],
    mut events: Vec<Event>,
    cx: &mut ResolveContext<'_>,
) -> Vec<Event> {
    let mut called: Vec<&'static str> = Vec::new();

    for construct in constructs {
        let name = construct.name();
        if called.contains(&name) {
            continue;
        }
        called.push(name);
        events = construct.resolve_all(events, cx);
    }

    events
}

/// Pair the delimiter runs of one span kind.
pub fn resolve_spans(
    kind: SpanKind,
    mut events: Vec<Event>,
    cx: &mut ResolveContext<'_>,
) -> Vec<Event> {
    let temp = kind.temp_sequence();
    let mut open = 0;

    while open < events.len() {
        let is_opener = events[open].kind == EventKind::Exit
            && cx.tokens[events[open].token].kind == temp;
        if !is_opener {
            open += 1;
            continue;
        }

        let closer = (open + 1..events.len()).find(|&index| {
            events[index].kind == EventKind::Enter && cx.tokens[events[index].token].kind == temp
        });
        let Some(close) = closer else {
            open += 1;
            continue;
        };

        // Runs are leaves: their enter sits right before the opener exit and
        // their exit right after the closer enter.
        debug_assert!(open > 0 && events[open - 1].token == events[open].token);
        debug_assert!(events.get(close + 1).map(|event| event.token) == Some(events[close].token));

        let opener = events[open].token;
        let closer = events[close].token;
        let content = events[open].content;

        cx.tokens[opener].kind = kind.sequence();
        cx.tokens[closer].kind = kind.sequence();

        let span = cx.tokens.push(Token {
            kind: kind.span(),
            start: cx.tokens[opener].start,
            end: cx.tokens[closer].end,
        });

        debug!(
            "paired {:?} runs at {}..{}",
            kind,
            cx.tokens[span].start.offset,
            cx.tokens[span].end.offset
        );

        let participants = cx.inside_span;
        let inner = resolve_all(participants, events[open + 1..close].to_vec(), cx);

        let mut replacement = Vec::with_capacity(inner.len() + 6);
        replacement.push(Event::enter(span, content));
        replacement.push(Event::enter(opener, content));
        replacement.push(Event::exit(opener, content));
        replacement.extend(inner);
        replacement.push(Event::enter(closer, content));
        replacement.push(Event::exit(closer, content));
        replacement.push(Event::exit(span, content));

        let start = open - 1;
        let inserted = replacement.len();
        events.splice(start..=close + 1, replacement);
        open = start + inserted;
    }

    for event in &events {
        let token = &mut cx.tokens[event.token];
        if token.kind == temp {
            token.kind = SyntaxKind::DATA;
        }
    }

    events
}

/// Merge adjacent `DATA` leaves into one token.
///
/// The earlier token grows to cover the later one; the later token's events
/// are dropped.
pub fn merge_data(events: Vec<Event>, tokens: &mut Tokens) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::with_capacity(events.len());
    let mut index = 0;

    while index < events.len() {
        let event = events[index];

        if event.kind == EventKind::Enter
            && tokens[event.token].kind == SyntaxKind::DATA
            && let Some(&last) = merged.last()
            && last.kind == EventKind::Exit
            && tokens[last.token].kind == SyntaxKind::DATA
            && tokens[last.token].end == tokens[event.token].start
            && events
                .get(index + 1)
                .is_some_and(|next| next.kind == EventKind::Exit && next.token == event.token)
        {
            tokens[last.token].end = tokens[event.token].end;
            index += 2;
            continue;
        }

        merged.push(event);
        index += 1;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::ParseOptions;
    use crate::parser::tokenize;
    use pretty_assertions::assert_eq;

    /// Kinds and texts of the entered tokens inside the first paragraph.
    fn inline(source: &str) -> Vec<(SyntaxKind, &str)> {
        let doc = tokenize(source, &ParseOptions::default());
        doc.events
            .iter()
            .filter(|event| event.is_enter())
            .map(|event| (doc.kind(event.token), doc.slice(event.token)))
            .skip_while(|(kind, _)| *kind != SyntaxKind::PARAGRAPH)
            .skip(1)
            .collect()
    }

    #[test]
    fn nearest_following_pairing() {
        assert_eq!(
            inline("==a==b==c"),
            vec![
                (SyntaxKind::HIGHLIGHT, "==a=="),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
                (SyntaxKind::DATA, "a"),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
                (SyntaxKind::DATA, "b==c"),
            ]
        );
    }

    #[test]
    fn unpaired_run_becomes_data() {
        assert_eq!(inline("x ~2"), vec![(SyntaxKind::DATA, "x ~2")]);
    }

    #[test]
    fn interior_is_resolved_with_other_span_kinds() {
        assert_eq!(
            inline("==a^2^b=="),
            vec![
                (SyntaxKind::HIGHLIGHT, "==a^2^b=="),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
                (SyntaxKind::DATA, "a"),
                (SyntaxKind::SUPERSCRIPT, "^2^"),
                (SyntaxKind::SUPERSCRIPT_SEQUENCE, "^"),
                (SyntaxKind::DATA, "2"),
                (SyntaxKind::SUPERSCRIPT_SEQUENCE, "^"),
                (SyntaxKind::DATA, "b"),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
            ]
        );
    }

    #[test]
    fn unpaired_run_inside_a_span_stays_inside() {
        assert_eq!(
            inline("==a~b==c~"),
            vec![
                (SyntaxKind::HIGHLIGHT, "==a~b=="),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
                (SyntaxKind::DATA, "a~b"),
                (SyntaxKind::HIGHLIGHT_SEQUENCE, "=="),
                (SyntaxKind::DATA, "c~"),
            ]
        );
    }

    #[test]
    fn merge_data_joins_touching_leaves() {
        let mut tokens = Tokens::new();
        let mut point = crate::parser::token::Point::start();
        let mut events = Vec::new();
        for text in ["ab", "cd"] {
            let start = point;
            point.advance_str(text);
            let id = tokens.push(Token {
                kind: SyntaxKind::DATA,
                start,
                end: point,
            });
            events.push(Event::enter(id, crate::parser::event::ContentType::Text));
            events.push(Event::exit(id, crate::parser::event::ContentType::Text));
        }

        let merged = merge_data(events, &mut tokens);

        assert_eq!(merged.len(), 2);
        assert_eq!(tokens[merged[0].token].range(), 0..4);
    }
}
