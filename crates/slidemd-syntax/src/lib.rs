//! # slidemd-syntax
//!
//! A push-driven tokenizer for the slidemd markdown extensions, producing a
//! lossless [Rowan] syntax tree.
//!
//! [Rowan]: https://docs.rs/rowan
//!
//! ## Extensions
//!
//! | Syntax | Node | Renders as |
//! |--------|------|------------|
//! | `==text==` | `HIGHLIGHT` | `<mark>` |
//! | `H~2~O` | `SUBSCRIPT` | `<sub>` |
//! | `x^2^` | `SUPERSCRIPT` | `<sup>` |
//! | `<div>...</div>`, `<!-- -->`, ... | `HTML_FLOW` / `HTML_TEXT` | passed through |
//! | `{#if cond}`, `{/if}`, `{@html x}` | `LOGIC_FLOW` / `LOGIC_TEXT` | passed through |
//! | `{{literal}}` | `INLINE_CODE` | `<code>` |
//!
//! Around them sits a small host: blank lines, ATX headings, paragraphs,
//! character escapes and code spans.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → flow pass → text pass per chunk → resolvers → Sink → Rowan Tree
//!               (blocks)    (inline constructs)   (pairing)   (GreenNodeBuilder)
//! ```
//!
//! ### 1. Constructs ([`parser::grammar`])
//!
//! Each construct is a state machine fed one code point at a time. It either
//! accepts, or rejects and leaves no trace, in which case the host tries the
//! next construct for the same trigger or reads the trigger as text.
//!
//! ### 2. Resolvers ([`parser::resolve`])
//!
//! Span constructs only mark their delimiter runs. Once a whole paragraph or
//! heading is tokenized, the resolvers pair the runs into spans:
//!
//! ```text
//! "==a==b==" → HIGHLIGHT("==a=="), DATA("b==")
//! ```
//!
//! ### 3. Sink ([`parser::sink`])
//!
//! The sink turns the resolved events into a Rowan green tree and checks that
//! every byte of the source is covered exactly once.
//!
//! ## Module Structure
//!
//! ```text
//! slidemd-syntax/
//! ├── lib.rs           # This file - public API
//! ├── syntax_kind.rs   # SyntaxKind enum and Rowan integration
//! ├── error.rs         # CompileError
//! ├── compile.rs       # Rendering hints for downstream compilers
//! └── parser/
//!     ├── mod.rs       # Host, Effects, tokenize() and parse()
//!     ├── token.rs     # Points, tokens and the token arena
//!     ├── event.rs     # Enter/exit events
//!     ├── resolve.rs   # Delimiter pairing and data merging
//!     ├── sink.rs      # Converts events to a Rowan GreenNode
//!     └── grammar/     # The constructs
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use slidemd_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("hello, ==markdown==").unwrap();
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "hello, ==markdown==");
//!
//! let paragraph = tree.children().next().unwrap();
//! assert_eq!(paragraph.kind(), SyntaxKind::PARAGRAPH);
//! let highlight = paragraph.children().next().unwrap();
//! assert_eq!(highlight.kind(), SyntaxKind::HIGHLIGHT);
//! ```
//!
//! Extensions can be switched off one by one:
//!
//! ```
//! use slidemd_syntax::{parse_with, ParseOptions, SyntaxKind};
//!
//! let options = ParseOptions {
//!     highlight: false,
//!     ..ParseOptions::default()
//! };
//! let tree = parse_with("==a==", &options).unwrap();
//! let paragraph = tree.children().next().unwrap();
//! assert_eq!(paragraph.children().count(), 0);
//! ```

pub mod compile;
pub mod error;
pub mod parser;
pub mod syntax_kind;

pub use error::CompileError;
pub use parser::grammar::ParseOptions;
pub use parser::{Document, parse, parse_with, tokenize};
pub use syntax_kind::{SlidemdLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Indented dump of a syntax tree, one node or token per line.
///
/// ```text
/// DOCUMENT@0..5
///   PARAGRAPH@0..5
///     DATA@0..5 "hello"
/// ```
pub fn format_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_tree(&mut out, node, 0);
    out
}

fn write_tree(out: &mut String, node: &SyntaxNode, indent: usize) {
    let prefix = "  ".repeat(indent);
    out.push_str(&format!(
        "{}{:?}@{:?}\n",
        prefix,
        node.kind(),
        node.text_range()
    ));

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => write_tree(out, &n, indent + 1),
            rowan::NodeOrToken::Token(t) => {
                out.push_str(&format!(
                    "{}  {:?}@{:?} {:?}\n",
                    prefix,
                    t.kind(),
                    t.text_range(),
                    t.text()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn snapshot_highlight() {
        let tree = parse("==markdown==").unwrap();
        assert_snapshot!(format_tree(&tree), @r#"
        DOCUMENT@0..12
          PARAGRAPH@0..12
            HIGHLIGHT@0..12
              HIGHLIGHT_SEQUENCE@0..2 "=="
              DATA@2..10 "markdown"
              HIGHLIGHT_SEQUENCE@10..12 "=="
        "#);
    }

    #[test]
    fn snapshot_heading_and_paragraph() {
        let tree = parse("# Hi\n\nh~2~o").unwrap();
        assert_snapshot!(format_tree(&tree), @r##"
        DOCUMENT@0..11
          HEADING@0..4
            HEADING_SEQUENCE@0..1 "#"
            WHITESPACE@1..2 " "
            HEADING_TEXT@2..4
              DATA@2..4 "Hi"
          LINE_ENDING@4..5 "\n"
          LINE_ENDING@5..6 "\n"
          PARAGRAPH@6..11
            DATA@6..7 "h"
            SUBSCRIPT@7..10
              SUBSCRIPT_SEQUENCE@7..8 "~"
              DATA@8..9 "2"
              SUBSCRIPT_SEQUENCE@9..10 "~"
            DATA@10..11 "o"
        "##);
    }

    #[test]
    fn snapshot_flow_blocks() {
        let tree = parse("<!--\nx\n-->\n{#if a}").unwrap();
        assert_snapshot!(format_tree(&tree), @r#"
        DOCUMENT@0..18
          HTML_FLOW@0..10
            HTML_FLOW_DATA@0..4 "<!--"
            LINE_ENDING@4..5 "\n"
            HTML_FLOW_DATA@5..6 "x"
            LINE_ENDING@6..7 "\n"
            HTML_FLOW_DATA@7..10 "-->"
          LINE_ENDING@10..11 "\n"
          LOGIC_FLOW@11..18
            LOGIC_FLOW_DATA@11..18 "{#if a}"
        "#);
    }

    #[test]
    fn snapshot_messy_unclosed_constructs() {
        // Half-finished edits: every construct is left open.
        let input = "==open ~sub <div> {#if `code\n\n^";
        let tree = parse(input).unwrap();
        assert_snapshot!(format_tree(&tree), @r#"
        DOCUMENT@0..31
          PARAGRAPH@0..28
            DATA@0..28 "==open ~sub <div> {#if `code"
          LINE_ENDING@28..29 "\n"
          LINE_ENDING@29..30 "\n"
          PARAGRAPH@30..31
            DATA@30..31 "^"
        "#);
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "hello, markdown\n",
            "# Heading\n",
            "==mark==\n",
            "H~2~O and x^2^\n",
            "<div>\nblock\n</div>\n",
            "{#each items as item}\n",
            "{{literal}}\n",
            "`code span`\n",
            "\\==not a span==\n",
        ];

        for input in inputs {
            let tree = parse(input).unwrap();
            assert_eq!(
                tree.text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }
}
