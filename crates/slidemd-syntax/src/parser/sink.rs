//! Sink for converting resolved events into a Rowan green tree.
//!
//! The sink is also where the coverage invariant is checked: the children of
//! every node must tile it exactly and the root must cover the whole source.

use rowan::GreenNodeBuilder;

use crate::error::CompileError;
use crate::parser::event::{Event, EventKind};
use crate::parser::token::{TokenId, Tokens};
use crate::syntax_kind::SyntaxNode;

/// Converts events and their tokens into a Rowan syntax tree.
pub struct Sink<'s, 'e> {
    builder: GreenNodeBuilder<'static>,
    source: &'s str,
    tokens: &'e Tokens,
    events: &'e [Event],
    cursor: usize,
    open: Vec<TokenId>,
}

impl<'s, 'e> Sink<'s, 'e> {
    /// Create a new sink.
    pub fn new(source: &'s str, tokens: &'e Tokens, events: &'e [Event]) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            source,
            tokens,
            events,
            cursor: 0,
            open: Vec::new(),
        }
    }

    /// Consume the sink and build the syntax tree.
    pub fn finish(mut self) -> Result<SyntaxNode, CompileError> {
        let events = self.events;
        let (Some(first), Some(last)) = (events.first(), events.last()) else {
            return Err(CompileError::MissingRoot);
        };
        if first.kind != EventKind::Enter
            || last.kind != EventKind::Exit
            || first.token != last.token
            || events.len() < 2
        {
            return Err(CompileError::MissingRoot);
        }

        let mut index = 0;
        while index < events.len() {
            let event = events[index];
            let token = self.tokens[event.token];

            match event.kind {
                EventKind::Enter => {
                    self.check_start(event.token)?;

                    let is_leaf = events.get(index + 1).is_some_and(|next| {
                        next.kind == EventKind::Exit && next.token == event.token
                    });

                    if is_leaf && !self.open.is_empty() {
                        let text = &self.source[token.range()];
                        self.builder.token(token.kind.into(), text);
                        self.cursor = token.end.offset;
                        index += 2;
                        continue;
                    }

                    self.builder.start_node(token.kind.into());
                    self.open.push(event.token);
                }
                EventKind::Exit => {
                    if self.open.pop() != Some(event.token) {
                        return Err(CompileError::MismatchedExit {
                            kind: token.kind,
                            offset: token.end.offset,
                        });
                    }
                    if self.cursor < token.end.offset {
                        return Err(CompileError::Gap {
                            start: self.cursor,
                            end: token.end.offset,
                        });
                    }
                    if self.cursor > token.end.offset {
                        return Err(CompileError::Overlap {
                            kind: token.kind,
                            start: token.end.offset,
                            cursor: self.cursor,
                        });
                    }
                    if self.open.is_empty() && index + 1 != events.len() {
                        return Err(CompileError::MissingRoot);
                    }
                    self.builder.finish_node();
                }
            }

            index += 1;
        }

        if !self.open.is_empty() {
            return Err(CompileError::UnclosedTokens {
                count: self.open.len(),
            });
        }
        if self.cursor != self.source.len() {
            return Err(CompileError::Incomplete {
                covered: self.cursor,
                len: self.source.len(),
            });
        }

        Ok(SyntaxNode::new_root(self.builder.finish()))
    }

    fn check_start(&self, id: TokenId) -> Result<(), CompileError> {
        let token = &self.tokens[id];
        if token.start.offset > self.cursor {
            return Err(CompileError::Gap {
                start: self.cursor,
                end: token.start.offset,
            });
        }
        if token.start.offset < self.cursor {
            return Err(CompileError::Overlap {
                kind: token.kind,
                start: token.start.offset,
                cursor: self.cursor,
            });
        }
        Ok(())
    }
}
