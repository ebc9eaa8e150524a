//! Literal token-stream expectations, one construct at a time.

use crate::Token::*;

macro_rules! scenario_tests {
    ($($name:ident: $input:expr => [$($token:expr),* $(,)?]);* $(;)?) => {
        $(#[test]
        fn $name() {
            super::assert_tokens($input, vec![$($token),*]);
        })*
    }
}

use super::text;

scenario_tests! {
    plain_text: "hello" => [text("hello")];
    inert_markers: "a*b;c:d/e-f!g#h" => [text("a*b;c:d/e-f!g#h")];
    equals_mid_line_is_text: "a=b" => [text("a=b")];
    pipe_outside_construct: "a|b" => [text("a|b")];

    template: "{{foo}}" => [TemplateOpen, text("foo"), TemplateClose];
    template_with_kv_param: "{{foo|bar=baz}}" => [
        TemplateOpen, text("foo"),
        TemplateParamSeparator, text("bar"), TemplateParamEquals, text("baz"),
        TemplateClose,
    ];
    template_anonymous_params: "{{foo|a|b}}" => [
        TemplateOpen, text("foo"),
        TemplateParamSeparator, text("a"),
        TemplateParamSeparator, text("b"),
        TemplateClose,
    ];
    template_mixed_params: "{{a|b=c|d}}" => [
        TemplateOpen, text("a"),
        TemplateParamSeparator, text("b"), TemplateParamEquals, text("c"),
        TemplateParamSeparator, text("d"),
        TemplateClose,
    ];
    template_in_name: "{{a{{b}}c}}" => [
        TemplateOpen, text("a"),
        TemplateOpen, text("b"), TemplateClose,
        text("c"), TemplateClose,
    ];
    template_in_param_key: "{{a|{{b}}=c}}" => [
        TemplateOpen, text("a"), TemplateParamSeparator,
        TemplateOpen, text("b"), TemplateClose,
        TemplateParamEquals, text("c"), TemplateClose,
    ];
    template_in_param_value: "{{a|b={{c}}}}" => [
        TemplateOpen, text("a"),
        TemplateParamSeparator, text("b"), TemplateParamEquals,
        TemplateOpen, text("c"), TemplateClose,
        TemplateClose,
    ];
    template_name_with_spaces: "{{foo bar}}" => [TemplateOpen, text("foo bar"), TemplateClose];
    template_name_trailing_newline: "{{foo\n}}" => [TemplateOpen, text("foo\n"), TemplateClose];
    template_name_spanning_lines_fails: "{{fo\no}}" => [text("{{fo\no}}")];
    unclosed_template: "{{" => [text("{{")];
    unclosed_template_with_name: "{{foo" => [text("{{foo")];

    argument: "{{{x}}}" => [ArgumentOpen, text("x"), ArgumentClose];
    argument_with_default: "{{{arg|def}}}" => [
        ArgumentOpen, text("arg"), ArgumentSeparator, text("def"), ArgumentClose,
    ];
    four_braces: "{{{{x}}}}" => [
        TemplateOpen, TemplateOpen, text("x"), TemplateClose, TemplateClose,
    ];
    five_braces: "{{{{{x}}}}}" => [
        TemplateOpen, ArgumentOpen, text("x"), ArgumentClose, TemplateClose,
    ];
    unclosed_argument: "{{{x" => [text("{{{x")];

    wikilink: "[[Page]]" => [WikilinkOpen, text("Page"), WikilinkClose];
    wikilink_with_text: "[[Page|link]]" => [
        WikilinkOpen, text("Page"), WikilinkSeparator, text("link"), WikilinkClose,
    ];
    wikilink_extra_pipes: "[[a|b|c]]" => [
        WikilinkOpen, text("a"), WikilinkSeparator, text("b|c"), WikilinkClose,
    ];
    wikilink_title_spanning_lines_fails: "[[bad\nname]]" => [text("[[bad\nname]]")];
    wikilink_bracket_in_title_fails: "[[a[b]]" => [text("[[a[b]]")];
    unclosed_wikilink: "[[Page" => [text("[[Page")];

    heading: "\n== Title ==\n" => [
        text("\n"), HeadingStart { level: 2 }, text(" Title "), HeadingEnd, text("\n"),
    ];
    heading_at_start_of_input: "== T ==" => [
        HeadingStart { level: 2 }, text(" T "), HeadingEnd,
    ];
    heading_level_1: "=T=" => [HeadingStart { level: 1 }, text("T"), HeadingEnd];
    heading_level_clamped_to_6: "======= T =======" => [
        HeadingStart { level: 6 }, text("= T ="), HeadingEnd,
    ];
    heading_extra_opening_equals: "===T==" => [
        HeadingStart { level: 2 }, text("=T"), HeadingEnd,
    ];
    heading_extra_closing_equals: "==T===" => [
        HeadingStart { level: 2 }, text("T="), HeadingEnd,
    ];
    heading_inner_equals_run: "==a==b==" => [
        HeadingStart { level: 2 }, text("a==b"), HeadingEnd,
    ];
    heading_unclosed: "==abc" => [text("==abc")];
    heading_broken_by_newline: "==a\nb==" => [text("==a\nb==")];

    comment: "<!-- c -->" => [CommentStart, text(" c "), CommentEnd];
    comment_empty: "<!---->" => [CommentStart, CommentEnd];
    comment_unclosed: "<!--x" => [text("<!--x")];
    comment_in_template_name: "{{a<!--b-->c}}" => [
        TemplateOpen, text("a"),
        CommentStart, text("b"), CommentEnd,
        text("c"), TemplateClose,
    ];

    entity_named: "&amp;" => [HtmlEntityStart, text("amp"), HtmlEntityEnd];
    entity_numeric: "&#65;" => [HtmlEntityStart, HtmlEntityNumeric, text("65"), HtmlEntityEnd];
    entity_numeric_leading_zeros: "&#0065;" => [
        HtmlEntityStart, HtmlEntityNumeric, text("0065"), HtmlEntityEnd,
    ];
    entity_hex: "&#x1f4a9;" => [
        HtmlEntityStart, HtmlEntityNumeric, HtmlEntityHex { hex_char: 'x' },
        text("1f4a9"), HtmlEntityEnd,
    ];
    entity_hex_uppercase_indicator: "&#X41;" => [
        HtmlEntityStart, HtmlEntityNumeric, HtmlEntityHex { hex_char: 'X' },
        text("41"), HtmlEntityEnd,
    ];
    entity_in_template: "{{a&nbsp;b}}" => [
        TemplateOpen, text("a"),
        HtmlEntityStart, text("nbsp"), HtmlEntityEnd,
        text("b"), TemplateClose,
    ];
    entity_unknown_name: "&bogusname;" => [text("&bogusname;")];
    entity_value_out_of_range: "&#1114112;" => [text("&#1114112;")];
    entity_zero: "&#0;" => [text("&#0;")];
    entity_empty_hex: "&#x;" => [text("&#x;")];
    entity_missing_semicolon: "&amp " => [text("&amp ")];
    entity_at_end_of_input: "&" => [text("&")];

    wikilink_after_failed_nesting: "[[a[[b]]c]]" => [
        text("[[a"), WikilinkOpen, text("b"), WikilinkClose, text("c]]"),
    ];
    template_around_text: "pre {{t}} post" => [
        text("pre "), TemplateOpen, text("t"), TemplateClose, text(" post"),
    ];
}
