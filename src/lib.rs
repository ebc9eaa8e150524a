//! Tokenizer for MediaWiki wikicode.
//!
//! Turns a wikicode string into a flat stream of [`Token`]s covering
//! templates, template arguments, wikilinks, section headings, HTML
//! comments, and HTML character entities, with everything else preserved
//! as literal text. Malformed markup never errors; an unclosed or invalid
//! construct simply comes back as the text it was written as, so
//! [`render`] of the output always reproduces the input exactly.
//!
//! ```
//! use wikicode::{tokenize, Token};
//!
//! let tokens = tokenize("{{foo|bar=baz}}");
//! assert_eq!(tokens[0], Token::TemplateOpen);
//! assert_eq!(wikicode::render(&tokens), "{{foo|bar=baz}}");
//! ```

mod contexts;
mod tokenizer;
mod tokens;

#[cfg(test)]
mod tests;

pub use tokenizer::Tokenizer;
pub use tokens::{render, Token};

/// Builds a list of tokens from a string of wikicode.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::default().tokenize(text)
}
