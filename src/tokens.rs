//! Token types emitted by the tokenizer.
//!
//! The tokenizer produces a flat stream of these tokens; paired sentinels
//! (`TemplateOpen`/`TemplateClose` and friends) bracket the contents of each
//! construct instead of nesting them in a tree. Apart from [`Token::Text`],
//! every token stands for a fixed run of source characters, so a token
//! stream can always be [rendered](render) back into the exact input it was
//! produced from.

/// A wikicode token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    /// A run of literal text.
    Text {
        /// The text content.
        text: String,
    },

    /// The `{{` opening a template.
    ///
    /// ```wikitext
    /// {{name|key=value}}
    /// ^^
    /// ```
    TemplateOpen,
    /// The `|` between template parameters.
    TemplateParamSeparator,
    /// The `=` between a template parameter's key and value.
    TemplateParamEquals,
    /// The `}}` closing a template.
    TemplateClose,

    /// The `{{{` opening a template argument.
    ///
    /// ```wikitext
    /// {{{name|default}}}
    /// ^^^
    /// ```
    ArgumentOpen,
    /// The `|` between an argument's name and its default value.
    ArgumentSeparator,
    /// The `}}}` closing a template argument.
    ArgumentClose,

    /// The `[[` opening a wikilink.
    ///
    /// ```wikitext
    /// [[title|text]]
    /// ^^
    /// ```
    WikilinkOpen,
    /// The `|` between a wikilink's title and its display text.
    WikilinkSeparator,
    /// The `]]` closing a wikilink.
    WikilinkClose,

    /// The `&` opening an HTML character entity.
    HtmlEntityStart,
    /// The `#` marking a numeric entity.
    HtmlEntityNumeric,
    /// The `x` (or `X`) marking a hexadecimal entity.
    HtmlEntityHex {
        /// The indicator character as written in the source.
        hex_char: char,
    },
    /// The `;` closing an HTML character entity.
    HtmlEntityEnd,

    /// The run of `=` opening a section heading.
    ///
    /// ```wikitext
    /// == title ==
    /// ^^
    /// ```
    HeadingStart {
        /// The heading level, `1..=6`.
        level: u8,
    },
    /// The run of `=` closing a section heading.
    HeadingEnd,

    /// The `<!--` opening an HTML comment.
    CommentStart,
    /// The `-->` closing an HTML comment.
    CommentEnd,
}

impl Token {
    /// Returns `true` if this is a [`Token::Text`].
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Renders a token stream back into the source text it was produced from.
///
/// The rendering of `tokenize(input)` is `input`, for every input: literal
/// text is stored verbatim in [`Token::Text`], every other token stands for
/// a fixed delimiter, and the surplus characters of over-long heading
/// delimiters are emitted as text next to the title.
#[must_use]
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    // A heading's closing run is as long as its opening run; the extra
    // characters of a lopsided heading are carried by Text tokens.
    let mut heading_level = 0;
    for token in tokens {
        match token {
            Token::Text { text } => out.push_str(text),
            Token::TemplateOpen => out.push_str("{{"),
            Token::TemplateParamSeparator
            | Token::ArgumentSeparator
            | Token::WikilinkSeparator => out.push('|'),
            Token::TemplateParamEquals => out.push('='),
            Token::TemplateClose => out.push_str("}}"),
            Token::ArgumentOpen => out.push_str("{{{"),
            Token::ArgumentClose => out.push_str("}}}"),
            Token::WikilinkOpen => out.push_str("[["),
            Token::WikilinkClose => out.push_str("]]"),
            Token::HtmlEntityStart => out.push('&'),
            Token::HtmlEntityNumeric => out.push('#'),
            Token::HtmlEntityHex { hex_char } => out.push(*hex_char),
            Token::HtmlEntityEnd => out.push(';'),
            Token::HeadingStart { level } => {
                heading_level = usize::from(*level);
                out.push_str(&"=".repeat(heading_level));
            }
            Token::HeadingEnd => out.push_str(&"=".repeat(heading_level)),
            Token::CommentStart => out.push_str("<!--"),
            Token::CommentEnd => out.push_str("-->"),
        }
    }
    out
}
