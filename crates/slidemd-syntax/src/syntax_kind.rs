//! SyntaxKind enum for every token type the tokenizer and resolvers emit.
//!
//! Following the rust-analyzer model, leaves and composite nodes share a single
//! enum. Whether a kind ends up as a Rowan token or a Rowan node is decided by
//! the [`Sink`](crate::parser::sink::Sink): a token with nested events becomes
//! a node, a token without becomes a leaf.
//!
//! A few kinds are transient. The `*_SEQUENCE_TEMP` kinds only exist between
//! tokenizing and resolving; the resolver relabels each of them to the final
//! `*_SEQUENCE` kind or to [`SyntaxKind::DATA`].

/// All syntax kinds for the slidemd CST.
///
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Host content ===
    /// Root of every document
    DOCUMENT,
    /// Literal text
    DATA,
    /// A `\n`
    LINE_ENDING,
    /// Spaces and tabs outside of text content
    WHITESPACE,
    /// Paragraph block, a text chunk
    PARAGRAPH,
    /// ATX heading (`# ...`)
    HEADING,
    /// The `#` run of a heading
    HEADING_SEQUENCE,
    /// Heading content, a text chunk
    HEADING_TEXT,
    /// `\` followed by ASCII punctuation
    CHARACTER_ESCAPE,
    /// The `\` of a character escape
    ESCAPE_MARKER,
    /// The escaped character
    CHARACTER_ESCAPE_VALUE,
    /// Backtick code span
    CODE_TEXT,
    /// Opening or closing backtick run
    CODE_TEXT_SEQUENCE,
    /// Code span content
    CODE_TEXT_DATA,

    // === Delimiter spans ===
    /// `==text==`
    HIGHLIGHT,
    /// A paired `==`
    HIGHLIGHT_SEQUENCE,
    /// An unpaired `==`, before resolution
    HIGHLIGHT_SEQUENCE_TEMP,
    /// `~text~`
    SUBSCRIPT,
    /// A paired `~`
    SUBSCRIPT_SEQUENCE,
    /// An unpaired `~`, before resolution
    SUBSCRIPT_SEQUENCE_TEMP,
    /// `^text^`
    SUPERSCRIPT,
    /// A paired `^`
    SUPERSCRIPT_SEQUENCE,
    /// An unpaired `^`, before resolution
    SUPERSCRIPT_SEQUENCE_TEMP,

    // === Block scanners ===
    /// HTML-like block at the start of a line
    HTML_FLOW,
    /// Content of an HTML flow block, one per line
    HTML_FLOW_DATA,
    /// HTML-like block inside text
    HTML_TEXT,
    /// Content of an inline HTML block
    HTML_TEXT_DATA,
    /// Template logic block at the start of a line (`{#if ...}`)
    LOGIC_FLOW,
    /// Content of a logic flow block, one per line
    LOGIC_FLOW_DATA,
    /// Template logic block inside text
    LOGIC_TEXT,
    /// Content of an inline logic block
    LOGIC_TEXT_DATA,
    /// `{{...}}` inside text, read as inline code
    INLINE_CODE,
}

impl SyntaxKind {
    /// Target markup tag for nodes that render as a single element.
    ///
    /// Headings are left out: their tag depends on the sequence length, see
    /// [`heading_rank`](crate::compile::heading_rank).
    pub fn html_tag(self) -> Option<&'static str> {
        match self {
            Self::PARAGRAPH => Some("p"),
            Self::HIGHLIGHT => Some("mark"),
            Self::SUBSCRIPT => Some("sub"),
            Self::SUPERSCRIPT => Some("sup"),
            Self::CODE_TEXT | Self::INLINE_CODE => Some("code"),
            _ => None,
        }
    }

    /// Whether a node of this kind may legitimately span several lines.
    pub fn can_contain_eols(self) -> bool {
        matches!(
            self,
            Self::PARAGRAPH
                | Self::HIGHLIGHT
                | Self::SUBSCRIPT
                | Self::SUPERSCRIPT
                | Self::INLINE_CODE
        )
    }

    /// Returns true for the chunk kinds whose interior is tokenized again in
    /// text context.
    pub fn is_text_chunk(self) -> bool {
        matches!(self, Self::PARAGRAPH | Self::HEADING_TEXT)
    }

    /// Returns true for the provisional delimiter run kinds.
    pub fn is_temp_sequence(self) -> bool {
        matches!(
            self,
            Self::HIGHLIGHT_SEQUENCE_TEMP
                | Self::SUBSCRIPT_SEQUENCE_TEMP
                | Self::SUPERSCRIPT_SEQUENCE_TEMP
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlidemdLang {}

impl rowan::Language for SlidemdLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::INLINE_CODE as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<SlidemdLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<SlidemdLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<SlidemdLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn span_kinds_render_as_tags() {
        assert_eq!(SyntaxKind::HIGHLIGHT.html_tag(), Some("mark"));
        assert_eq!(SyntaxKind::SUBSCRIPT.html_tag(), Some("sub"));
        assert_eq!(SyntaxKind::SUPERSCRIPT.html_tag(), Some("sup"));
        assert_eq!(SyntaxKind::INLINE_CODE.html_tag(), Some("code"));
        assert_eq!(SyntaxKind::HTML_FLOW.html_tag(), None);
    }

    #[test]
    fn eol_capable_kinds() {
        assert!(SyntaxKind::HIGHLIGHT.can_contain_eols());
        assert!(SyntaxKind::INLINE_CODE.can_contain_eols());
        assert!(!SyntaxKind::HEADING.can_contain_eols());
        assert!(!SyntaxKind::HIGHLIGHT_SEQUENCE.can_contain_eols());
    }

    #[test]
    fn temp_sequence_detection() {
        assert!(SyntaxKind::HIGHLIGHT_SEQUENCE_TEMP.is_temp_sequence());
        assert!(SyntaxKind::SUPERSCRIPT_SEQUENCE_TEMP.is_temp_sequence());
        assert!(!SyntaxKind::SUBSCRIPT_SEQUENCE.is_temp_sequence());
        assert!(!SyntaxKind::DATA.is_temp_sequence());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        for kind in [
            SyntaxKind::DOCUMENT,
            SyntaxKind::HIGHLIGHT,
            SyntaxKind::INLINE_CODE,
        ] {
            let raw: rowan::SyntaxKind = kind.into();
            assert_eq!(SlidemdLang::kind_from_raw(raw), kind);
        }
    }
}
