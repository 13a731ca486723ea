//! # Constructs
//!
//! A construct is a named recognizer bound to a trigger code point. The host
//! looks up the constructs registered for the code point it is at, asks each
//! one for a fresh [`Tokenizer`] and drives it until it accepts or rejects.
//!
//! ## Module Structure
//!
//! - [`block`] - ATX headings
//! - [`inline`] - Character escapes and code spans
//! - [`span`] - Highlight, subscript and superscript delimiter runs
//! - [`html`] - HTML-like blocks
//! - [`logic`] - Template logic blocks
//!
//! ## Registration
//!
//! | Trigger | Flow | Text |
//! |---------|------|------|
//! | `#` | heading | |
//! | `<` | html | html |
//! | `{` | logic | logic |
//! | `\` | | escape |
//! | `` ` `` | | code span |
//! | `=` `~` `^` | | span runs |
//!
//! The span constructs are also resolvers: after a text scope is tokenized,
//! the registered resolvers run over its events in registration order. The
//! same span constructs form the `inside_span` set used to resolve the
//! interior of a matched span.
//!
//! ## Writing a Construct
//!
//! ```ignore
//! struct Dollar;
//!
//! impl Construct for Dollar {
//!     fn name(&self) -> &'static str {
//!         "dollar"
//!     }
//!
//!     fn tokenizer(&self, _cx: &TokenizeContext) -> Box<dyn Tokenizer> {
//!         Box::new(DollarTokenizer::default())
//!     }
//! }
//! ```

pub mod block;
pub mod html;
pub mod inline;
pub mod logic;
pub mod span;

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::parser::event::Event;
use crate::parser::resolve::ResolveContext;
use crate::parser::{TokenizeContext, Tokenizer};

/// A named recognizer.
pub trait Construct {
    /// Name used in logs and to run each resolver once per scope.
    fn name(&self) -> &'static str;

    /// A fresh state machine positioned before the trigger code point.
    fn tokenizer(&self, cx: &TokenizeContext) -> Box<dyn Tokenizer>;

    /// Rewrite the events of a whole scope. Most constructs have nothing to
    /// resolve.
    fn resolve_all(&self, events: Vec<Event>, _cx: &mut ResolveContext<'_>) -> Vec<Event> {
        events
    }
}

/// Which extensions are enabled.
///
/// Headings, paragraphs, escapes and code spans are always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// `==text==`
    pub highlight: bool,
    /// `H~2~O`
    pub subscript: bool,
    /// `x^2^`
    pub superscript: bool,
    /// HTML-like blocks and inline tags
    pub html: bool,
    /// `{#if ...}` and friends, `{{literal}}`
    pub logic_block: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            highlight: true,
            subscript: true,
            superscript: true,
            html: true,
            logic_block: true,
        }
    }
}

impl ParseOptions {
    /// Every extension disabled: only headings, paragraphs, escapes and code
    /// spans are recognized.
    pub fn none() -> Self {
        Self {
            highlight: false,
            subscript: false,
            superscript: false,
            html: false,
            logic_block: false,
        }
    }
}

/// Registry of the constructs for each trigger code point.
#[derive(Default)]
pub struct Constructs {
    flow: HashMap<char, Vec<Rc<dyn Construct>>>,
    text: HashMap<char, Vec<Rc<dyn Construct>>>,
    pub(crate) resolvers: Vec<Rc<dyn Construct>>,
    pub(crate) inside_span: Vec<Rc<dyn Construct>>,
}

impl Constructs {
    pub fn new(options: &ParseOptions) -> Self {
        let mut constructs = Self::default();

        constructs.add_flow('#', Rc::new(block::Heading));
        constructs.add_text('\\', Rc::new(inline::CharacterEscape));
        constructs.add_text('`', Rc::new(inline::CodeSpan));

        let spans = [
            (span::SpanKind::Highlight, options.highlight),
            (span::SpanKind::Subscript, options.subscript),
            (span::SpanKind::Superscript, options.superscript),
        ];
        for (kind, enabled) in spans {
            if !enabled {
                continue;
            }
            let construct: Rc<dyn Construct> = Rc::new(span::Span(kind));
            constructs.add_text(kind.marker(), construct.clone());
            constructs.resolvers.push(construct.clone());
            constructs.inside_span.push(construct);
        }

        if options.html {
            let html: Rc<dyn Construct> = Rc::new(html::Html);
            constructs.add_flow('<', html.clone());
            constructs.add_text('<', html);
        }

        if options.logic_block {
            let logic: Rc<dyn Construct> = Rc::new(logic::Logic);
            constructs.add_flow('{', logic.clone());
            constructs.add_text('{', logic);
        }

        constructs
    }

    pub fn add_flow(&mut self, trigger: char, construct: Rc<dyn Construct>) {
        self.flow.entry(trigger).or_default().push(construct);
    }

    pub fn add_text(&mut self, trigger: char, construct: Rc<dyn Construct>) {
        self.text.entry(trigger).or_default().push(construct);
    }

    /// Flow constructs for `trigger`, in registration order.
    pub fn flow(&self, trigger: char) -> &[Rc<dyn Construct>] {
        self.flow.get(&trigger).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Text constructs for `trigger`, in registration order.
    pub fn text(&self, trigger: char) -> &[Rc<dyn Construct>] {
        self.text.get(&trigger).map(Vec::as_slice).unwrap_or(&[])
    }
}
