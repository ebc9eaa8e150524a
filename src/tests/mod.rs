use crate::{render, tokenize, Token};

mod scenarios;

/// Shorthand for a Text token.
fn text(text: &str) -> Token {
    Token::Text {
        text: text.to_string(),
    }
}

#[track_caller]
fn assert_tokens(input: &str, expected: Vec<Token>) {
    let _ = env_logger::try_init();
    let actual = tokenize(input);
    assert_eq!(actual, expected, "token stream for {input:?}");
    assert_eq!(render(&actual), input, "render round-trip for {input:?}");
}

#[test]
fn empty_input() {
    assert_tokens("", vec![]);
}

#[test]
fn tokenizer_instance_is_reusable() {
    let mut tokenizer = crate::Tokenizer::default();
    assert_eq!(
        tokenizer.tokenize("{{a}}"),
        vec![Token::TemplateOpen, text("a"), Token::TemplateClose]
    );
    assert_eq!(tokenizer.tokenize("b"), vec![text("b")]);
}
