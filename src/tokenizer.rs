//! The wikicode tokenizer.
//!
//! Wikicode is riddled with constructs whose meaning cannot be decided
//! locally: `{{{` may open a template argument or a template with a stray
//! brace, a heading only exists if its line also closes it, and a `[[` with
//! no matching `]]` is plain text. The tokenizer resolves this with
//! speculative parsing: each candidate construct is parsed into its own
//! frame, and when the speculation turns out to be wrong the frame is
//! discarded ("the route fails") and the consumed characters are re-read
//! under the next interpretation, falling back to literal text.
//!
//! State is one [`Tokenizer`] value: the input scalars, a read head, and a
//! stack of frames, each holding the tokens, context flags, and pending
//! literal text of one speculation.

use crate::{
    contexts::{Context, Global},
    tokens::Token,
};

/// Characters that can begin or delimit a construct. Anything else is
/// always literal text.
const MARKERS: &[char] = &[
    '{', '}', '[', ']', '<', '>', '|', '=', '&', '#', '*', ';', ':', '/', '-', '!', '\n',
];

/// Frames of speculation allowed before `{{` and `[[` stop recursing and
/// become literal text. Bounds stack use on pathological nesting.
const MAX_DEPTH: usize = 100;

/// Signal that the active speculative route cannot produce a valid parse.
///
/// Failing a route is ordinary control flow: the frame in progress is
/// discarded, and the nearest attempting parser either retries another
/// interpretation or falls back to literal text. It never escapes
/// [`Tokenizer::tokenize`].
#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("bad tokenization route")]
struct BadRoute;

/// One entry in the speculation stack.
#[derive(Debug, Default)]
struct Frame {
    /// Tokens emitted so far.
    tokens: Vec<Token>,
    /// What the frame is parsing and which look-ahead hazards are armed.
    context: Context,
    /// Literal characters pending since the last emitted token.
    buffer: String,
}

impl Frame {
    fn new(context: Context) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }
}

/// The result of parsing one frame.
enum Parsed {
    /// The frame's token list.
    Tokens(Vec<Token>),
    /// A heading title together with the level implied by its terminator.
    Heading { title: Vec<Token>, level: u8 },
}

impl Parsed {
    /// The frame's token list. Only frames pushed with a heading context
    /// produce a heading record instead.
    fn into_tokens(self) -> Vec<Token> {
        match self {
            Self::Tokens(tokens) => tokens,
            Self::Heading { .. } => unreachable!("heading record outside a heading context"),
        }
    }

    /// The heading record. Frames pushed with a heading context can only
    /// exit through the heading terminator.
    fn into_heading(self) -> (Vec<Token>, u8) {
        match self {
            Self::Heading { title, level } => (title, level),
            Self::Tokens(_) => unreachable!("plain token list out of a heading context"),
        }
    }
}

/// A wikicode tokenizer.
///
/// One instance owns all of its parse state, so distinct instances are
/// fully independent; a single instance must finish one
/// [`tokenize`](Self::tokenize) call before starting another.
#[derive(Debug, Default)]
pub struct Tokenizer {
    /// The input as Unicode scalars, indexable by position.
    text: Vec<char>,
    /// The current position in the input.
    head: usize,
    /// The active frame.
    top: Frame,
    /// The parents of the active frame, innermost last.
    stack: Vec<Frame>,
    /// Flags spanning the whole parse rather than a single frame.
    global: Global,
}

impl Tokenizer {
    /// Builds a list of tokens from a string of wikicode.
    pub fn tokenize(&mut self, text: &str) -> Vec<Token> {
        log::debug!("tokenizing {} bytes of wikicode", text.len());
        self.text = text.chars().collect();
        self.head = 0;
        self.top = Frame::default();
        self.stack.clear();
        self.global = Global::default();
        match self.parse(Context::empty()) {
            Ok(parsed) => parsed.into_tokens(),
            // The outermost frame has no unclosed-construct context, so end
            // of input pops it instead of failing.
            Err(BadRoute) => unreachable!("the outermost route cannot fail"),
        }
    }

    /// Reads the scalar at a relative point forwards of the head.
    fn read(&self, delta: usize) -> Option<char> {
        self.text.get(self.head + delta).copied()
    }

    /// Reads the scalar at a relative point backwards of the head.
    fn read_backwards(&self, delta: usize) -> Option<char> {
        self.head
            .checked_sub(delta)
            .and_then(|index| self.text.get(index).copied())
    }

    /// Adds a new frame with the given context; it becomes the active one.
    fn push(&mut self, context: Context) {
        let parent = std::mem::replace(&mut self.top, Frame::new(context));
        self.stack.push(parent);
    }

    /// Returns whether another `{{` or `[[` may still open a nested frame.
    fn can_recurse(&self) -> bool {
        self.stack.len() < MAX_DEPTH
    }

    /// Flushes the pending text buffer as a single Text token.
    fn flush_text(&mut self) {
        if !self.top.buffer.is_empty() {
            let text = std::mem::take(&mut self.top.buffer);
            self.top.tokens.push(Token::Text { text });
        }
    }

    /// Detaches the active frame and returns its tokens. The parent frame
    /// becomes active with its context unchanged.
    fn pop(&mut self) -> Vec<Token> {
        self.flush_text();
        let frame = std::mem::replace(&mut self.top, self.stack.pop().unwrap_or_default());
        frame.tokens
    }

    /// Like [`pop`](Self::pop), but the popped frame's context replaces the
    /// parent's. Used when a parameter sub-parse must hand its final
    /// context back to the template frame.
    fn pop_keeping_context(&mut self) -> Vec<Token> {
        self.flush_text();
        let frame = std::mem::replace(&mut self.top, self.stack.pop().unwrap_or_default());
        self.top.context = frame.context;
        frame.tokens
    }

    /// Discards the active frame and signals the failed route to the
    /// nearest attempting parser.
    fn fail_route(&mut self) -> BadRoute {
        log::trace!(
            "route failed at {} in context {:?}",
            self.head,
            self.top.context
        );
        self.top = self.stack.pop().unwrap_or_default();
        BadRoute
    }

    /// Appends a token to the end of the active frame.
    fn emit(&mut self, token: Token) {
        self.flush_text();
        self.top.tokens.push(token);
    }

    /// Prepends a token to the beginning of the active frame.
    fn emit_first(&mut self, token: Token) {
        self.flush_text();
        self.top.tokens.insert(0, token);
    }

    /// Appends one literal scalar to the pending text buffer.
    fn emit_char(&mut self, ch: char) {
        self.top.buffer.push(ch);
    }

    /// Appends literal text to the pending text buffer.
    fn emit_text(&mut self, text: &str) {
        self.top.buffer.push_str(text);
    }

    /// Splices a token list onto the end of the active frame. A leading
    /// Text token merges into the pending buffer first, so that adjacent
    /// Text never survives a splice.
    fn emit_all(&mut self, tokens: Vec<Token>) {
        let mut tokens = tokens.into_iter();
        let mut first = tokens.next();
        if let Some(Token::Text { text }) = &mut first {
            self.top.buffer.push_str(text);
            first = None;
        }
        self.flush_text();
        self.top.tokens.extend(first);
        self.top.tokens.extend(tokens);
    }

    /// Pops the active frame, writes the given literal text into the
    /// parent, splices the popped tokens after it, and steps the head back
    /// one scalar so the dispatch loop's advance lands on the right place.
    fn emit_text_then_stack(&mut self, text: &str) {
        let stack = self.pop();
        self.emit_text(text);
        if !stack.is_empty() {
            self.emit_all(stack);
        }
        self.head -= 1;
    }

    /// Parses a template or argument at the head of the wikicode string.
    ///
    /// A run of braces is ambiguous until the matching close is found:
    /// `{{{foo}}}` is an argument, `{{{{foo}}}}` a template holding a
    /// template, `{{{{{foo}}}}}` a template holding an argument. Each pass
    /// of the loop speculatively parses one construct out of the remaining
    /// braces and wraps whatever the previous passes built.
    fn parse_template_or_argument(&mut self) {
        self.head += 2;
        let mut braces = 2;
        while self.read(0) == Some('{') {
            self.head += 1;
            braces += 1;
        }
        self.push(Context::empty());

        while braces > 0 {
            if braces == 1 {
                self.emit_text_then_stack("{");
                return;
            }
            if braces == 2 {
                if self.parse_template().is_err() {
                    self.emit_text_then_stack("{{");
                    return;
                }
                break;
            }
            // An argument consumes three braces per success, a template
            // two. Prefer the argument, except where it would strand a
            // lone surplus `{` that the template reading packs exactly.
            let consumed = if braces == 4 {
                if self.parse_template().is_ok() {
                    Some(2)
                } else if self.parse_argument().is_ok() {
                    Some(3)
                } else {
                    None
                }
            } else if self.parse_argument().is_ok() {
                Some(3)
            } else if self.parse_template().is_ok() {
                Some(2)
            } else {
                None
            };
            let Some(consumed) = consumed else {
                self.emit_text_then_stack(&"{".repeat(braces));
                return;
            };
            braces -= consumed;
            if braces > 0 {
                self.head += 1;
            }
        }

        let stack = self.pop();
        self.emit_all(stack);
        self.top.context.remove(Context::FAIL_NEXT);
    }

    /// Parses a template at the head of the wikicode string.
    fn parse_template(&mut self) -> Result<(), BadRoute> {
        let reset = self.head;
        let template = match self.parse(Context::TEMPLATE_NAME) {
            Ok(parsed) => parsed.into_tokens(),
            Err(route) => {
                self.head = reset;
                return Err(route);
            }
        };
        self.emit_first(Token::TemplateOpen);
        self.emit_all(template);
        self.emit(Token::TemplateClose);
        Ok(())
    }

    /// Parses a template argument at the head of the wikicode string.
    fn parse_argument(&mut self) -> Result<(), BadRoute> {
        let reset = self.head;
        let argument = match self.parse(Context::ARGUMENT_NAME) {
            Ok(parsed) => parsed.into_tokens(),
            Err(route) => {
                self.head = reset;
                return Err(route);
            }
        };
        self.emit_first(Token::ArgumentOpen);
        self.emit_all(argument);
        self.emit(Token::ArgumentClose);
        Ok(())
    }

    /// Checks one character against the restrictions of name-like contexts:
    /// significant braces may not appear mid-name, and a name may not
    /// continue on a new line once it has text.
    fn verify_safe(&mut self, this: char) -> Result<(), BadRoute> {
        let context = self.top.context;
        if context.contains(Context::FAIL_NEXT) {
            return Err(self.fail_route());
        }
        if context.intersects(Context::TEMPLATE_NAME | Context::WIKILINK_TITLE) {
            if matches!(this, '{' | '}' | '[' | ']') {
                // Not an immediate failure: a sub-handler may consume the
                // brace this tick (`{{` starting a nested template, `}}`
                // closing this one). If nothing does, the next tick fails.
                self.top.context.insert(Context::FAIL_NEXT);
                return Ok(());
            }
        } else if context.intersects(Context::TEMPLATE_PARAM_KEY | Context::ARGUMENT_NAME) {
            if context.contains(Context::FAIL_ON_LBRACE) {
                if this == '{' {
                    return Err(self.fail_route());
                }
                self.top.context.remove(Context::FAIL_ON_LBRACE);
            }
            if context.contains(Context::FAIL_ON_RBRACE) {
                if this == '}' {
                    return Err(self.fail_route());
                }
                self.top.context.remove(Context::FAIL_ON_RBRACE);
            }
            // A lone brace is legal here; only a doubled one is not.
            if this == '{' {
                self.top.context.insert(Context::FAIL_ON_LBRACE);
                return Ok(());
            }
            if this == '}' {
                self.top.context.insert(Context::FAIL_ON_RBRACE);
                return Ok(());
            }
        }
        if context.contains(Context::FAIL_ON_TEXT) {
            if !this.is_whitespace() {
                return Err(self.fail_route());
            }
        } else if !context.contains(Context::HAS_TEXT) {
            if !this.is_whitespace() {
                self.top.context.insert(Context::HAS_TEXT);
            }
        } else if this == '\n' {
            self.top.context.insert(Context::FAIL_ON_TEXT);
        }
        Ok(())
    }

    /// Handles a template parameter separator at the head of the string.
    ///
    /// ```wikitext
    /// {{name|key=value|anonymous}}
    ///       ^         ^
    /// ```
    fn handle_template_param(&mut self) {
        if self.top.context.contains(Context::TEMPLATE_NAME) {
            self.top.context.remove(Context::TEMPLATE_NAME);
        } else if self.top.context.contains(Context::TEMPLATE_PARAM_VALUE) {
            self.top.context.remove(Context::TEMPLATE_PARAM_VALUE);
        }
        if self.top.context.contains(Context::TEMPLATE_PARAM_KEY) {
            // A second pipe with no `=` in between: the previous parameter
            // was anonymous, and its frame closes here.
            let stack = self.pop_keeping_context();
            self.emit_all(stack);
        } else {
            self.top.context.insert(Context::TEMPLATE_PARAM_KEY);
        }
        self.emit(Token::TemplateParamSeparator);
        self.push(self.top.context);
    }

    /// Handles a template parameter's value at the head of the string.
    ///
    /// ```wikitext
    /// {{name|key=value}}
    ///           ^
    /// ```
    fn handle_template_param_value(&mut self) {
        let stack = self.pop_keeping_context();
        self.emit_all(stack);
        self.top.context.remove(Context::TEMPLATE_PARAM_KEY);
        self.top.context.insert(Context::TEMPLATE_PARAM_VALUE);
        self.emit(Token::TemplateParamEquals);
    }

    /// Handles the end of a template at the head of the string.
    fn handle_template_end(&mut self) -> Vec<Token> {
        if self.top.context.contains(Context::TEMPLATE_PARAM_KEY) {
            let stack = self.pop_keeping_context();
            self.emit_all(stack);
        }
        self.head += 1;
        self.pop()
    }

    /// Handles the separator between an argument's name and its default.
    fn handle_argument_separator(&mut self) {
        self.top.context.remove(Context::ARGUMENT_NAME);
        self.top.context.insert(Context::ARGUMENT_DEFAULT);
        self.emit(Token::ArgumentSeparator);
    }

    /// Handles the end of an argument at the head of the string.
    fn handle_argument_end(&mut self) -> Vec<Token> {
        self.head += 2;
        self.pop()
    }

    /// Parses an internal wikilink at the head of the wikicode string.
    fn parse_wikilink(&mut self) {
        self.head += 2;
        let reset = self.head - 1;
        match self.parse(Context::WIKILINK_TITLE) {
            Ok(parsed) => {
                let wikilink = parsed.into_tokens();
                self.emit(Token::WikilinkOpen);
                self.emit_all(wikilink);
                self.emit(Token::WikilinkClose);
            }
            Err(BadRoute) => {
                self.head = reset;
                self.emit_text("[[");
            }
        }
    }

    /// Handles the separator between a wikilink's title and display text.
    fn handle_wikilink_separator(&mut self) {
        self.top.context.remove(Context::WIKILINK_TITLE);
        self.top.context.insert(Context::WIKILINK_TEXT);
        self.emit(Token::WikilinkSeparator);
    }

    /// Handles the end of a wikilink at the head of the string.
    fn handle_wikilink_end(&mut self) -> Vec<Token> {
        self.head += 1;
        self.pop()
    }

    /// Parses a section heading at the head of the wikicode string.
    ///
    /// The level of the heading is not the length of its opening run: a
    /// lopsided heading like `===x==` settles for the shorter side and
    /// turns the surplus `=` into title text.
    fn parse_heading(&mut self) {
        self.global.insert(Global::HEADING);
        let reset = self.head;
        self.head += 1;
        let mut best = 1;
        while self.read(0) == Some('=') {
            best += 1;
            self.head += 1;
        }
        let context = Context::heading(best.min(6) as u8);
        match self.parse(context) {
            Ok(parsed) => {
                let (title, level) = parsed.into_heading();
                self.emit(Token::HeadingStart { level });
                if usize::from(level) < best {
                    self.emit_text(&"=".repeat(best - usize::from(level)));
                }
                self.emit_all(title);
                self.emit(Token::HeadingEnd);
            }
            Err(BadRoute) => {
                // No terminator on this line; the run is literal. The head
                // lands one before the run's last `=` so the dispatch
                // advance re-reads what follows it.
                self.head = reset + best - 1;
                self.emit_text(&"=".repeat(best));
            }
        }
        self.global.remove(Global::HEADING);
    }

    /// Handles a run of `=` inside a heading, which may or may not be its
    /// terminator.
    ///
    /// A further terminator on the same line demotes this run to title
    /// text; the recursive parse goes looking for one, and its level wins
    /// if it exists.
    fn handle_heading_end(&mut self) -> (Vec<Token>, u8) {
        let reset = self.head;
        self.head += 1;
        let mut best = 1;
        while self.read(0) == Some('=') {
            best += 1;
            self.head += 1;
        }
        let current = usize::from(self.top.context.heading_level());
        let level = best.min(current).min(6);

        let lookahead = if self.can_recurse() {
            self.parse(self.top.context)
        } else {
            Err(BadRoute)
        };
        match lookahead {
            Ok(parsed) => {
                let (after, after_level) = parsed.into_heading();
                self.emit_text(&"=".repeat(best));
                self.emit_all(after);
                (self.pop(), after_level)
            }
            Err(BadRoute) => {
                if level < best {
                    self.emit_text(&"=".repeat(best - level));
                }
                self.head = reset + best - 1;
                (self.pop(), level as u8)
            }
        }
    }

    /// Parses an HTML entity past the opening `&` and validates it.
    fn really_parse_entity(&mut self) -> Result<(), BadRoute> {
        self.emit(Token::HtmlEntityStart);
        self.head += 1;

        let Some(mut this) = self.read(0) else {
            return Err(self.fail_route());
        };
        let mut numeric = false;
        let mut hexadecimal = false;
        if this == '#' {
            numeric = true;
            self.emit(Token::HtmlEntityNumeric);
            self.head += 1;
            this = match self.read(0) {
                Some(this) => this,
                None => return Err(self.fail_route()),
            };
            if this == 'x' || this == 'X' {
                hexadecimal = true;
                self.emit(Token::HtmlEntityHex { hex_char: this });
                self.head += 1;
            }
        }

        let valid = |ch: char| {
            if hexadecimal {
                ch.is_ascii_hexdigit()
            } else if numeric {
                ch.is_ascii_digit()
            } else {
                ch.is_ascii_alphanumeric()
            }
        };

        let mut body = String::new();
        loop {
            match self.read(0) {
                Some(';') => break,
                Some(ch) if valid(ch) => {
                    body.push(ch);
                    self.head += 1;
                }
                _ => return Err(self.fail_route()),
            }
        }
        if body.is_empty() {
            return Err(self.fail_route());
        }

        if numeric {
            let radix = if hexadecimal { 16 } else { 10 };
            match u32::from_str_radix(&body, radix) {
                Ok(value) if (1..=0x0010_FFFF).contains(&value) => {}
                _ => return Err(self.fail_route()),
            }
        } else if !is_named_entity(&body) {
            return Err(self.fail_route());
        }

        self.emit(Token::Text { text: body });
        self.emit(Token::HtmlEntityEnd);
        Ok(())
    }

    /// Parses an HTML entity at the head of the wikicode string, falling
    /// back to a literal `&` when it is not one.
    fn parse_entity(&mut self) {
        let reset = self.head;
        self.push(Context::empty());
        match self.really_parse_entity() {
            Ok(()) => {
                let stack = self.pop();
                self.emit_all(stack);
            }
            Err(BadRoute) => {
                self.head = reset;
                self.emit_char('&');
            }
        }
    }

    /// Parses an HTML comment at the head of the wikicode string.
    ///
    /// An unterminated comment is not a comment at all; only the `<!--` of
    /// a closed one leaves the literal text path.
    fn parse_comment(&mut self) {
        self.head += 4;
        let reset = self.head - 1;
        match self.parse(Context::COMMENT) {
            Ok(parsed) => {
                let comment = parsed.into_tokens();
                self.emit(Token::CommentStart);
                self.emit_all(comment);
                self.emit(Token::CommentEnd);
                self.head += 2;
            }
            Err(BadRoute) => {
                self.head = reset;
                self.emit_text("<!--");
            }
        }
    }

    /// Parses the wikicode string, using the context to decide when to
    /// stop.
    ///
    /// Each pass classifies the scalar under the head and consults the
    /// dispatch cascade; rules that close the current frame return out of
    /// the loop, everything else advances the head by one and continues.
    fn parse(&mut self, context: Context) -> Result<Parsed, BadRoute> {
        self.push(context);
        loop {
            let Some(this) = self.read(0) else {
                if self.top.context.intersects(Context::UNCLOSED) {
                    return Err(self.fail_route());
                }
                return Ok(Parsed::Tokens(self.pop()));
            };
            if self.top.context.intersects(Context::UNSAFE) {
                self.verify_safe(this)?;
            }
            if !MARKERS.contains(&this) {
                self.emit_char(this);
                self.head += 1;
                continue;
            }
            let next = self.read(1);
            let context = self.top.context;
            if context.contains(Context::COMMENT) {
                if this == '-' && next == Some('-') && self.read(2) == Some('>') {
                    return Ok(Parsed::Tokens(self.pop()));
                }
                self.emit_char(this);
            } else if this == '{' && next == Some('{') {
                if self.can_recurse() {
                    self.parse_template_or_argument();
                } else {
                    self.emit_char(this);
                }
            } else if this == '|' && context.intersects(Context::TEMPLATE) {
                self.handle_template_param();
            } else if this == '=' && context.contains(Context::TEMPLATE_PARAM_KEY) {
                self.handle_template_param_value();
            } else if this == '}' && next == Some('}') && context.intersects(Context::TEMPLATE) {
                return Ok(Parsed::Tokens(self.handle_template_end()));
            } else if this == '|' && context.contains(Context::ARGUMENT_NAME) {
                self.handle_argument_separator();
            } else if this == '}' && next == Some('}') && context.intersects(Context::ARGUMENT) {
                if self.read(2) == Some('}') {
                    return Ok(Parsed::Tokens(self.handle_argument_end()));
                }
                self.emit_char(this);
            } else if this == '[' && next == Some('[') {
                if !context.contains(Context::WIKILINK_TITLE) && self.can_recurse() {
                    self.parse_wikilink();
                } else {
                    self.emit_char(this);
                }
            } else if this == '|' && context.contains(Context::WIKILINK_TITLE) {
                self.handle_wikilink_separator();
            } else if this == ']' && next == Some(']') && context.intersects(Context::WIKILINK) {
                return Ok(Parsed::Tokens(self.handle_wikilink_end()));
            } else if this == '=' && !self.global.contains(Global::HEADING) {
                if matches!(self.read_backwards(1), Some('\n') | None) {
                    self.parse_heading();
                } else {
                    self.emit_char(this);
                }
            } else if this == '=' && context.intersects(Context::HEADING) {
                let (title, level) = self.handle_heading_end();
                return Ok(Parsed::Heading { title, level });
            } else if this == '\n' && context.intersects(Context::HEADING) {
                // A heading must close on its own line.
                return Err(self.fail_route());
            } else if this == '&' {
                self.parse_entity();
            } else if this == '<' && next == Some('!') {
                if self.read(2) == Some('-') && self.read(3) == Some('-') {
                    self.parse_comment();
                } else {
                    self.emit_char(this);
                }
            } else {
                self.emit_char(this);
            }
            self.head += 1;
        }
    }
}

/// Returns whether `name` is a known HTML named character reference.
fn is_named_entity(name: &str) -> bool {
    let raw = format!("&{name};");
    html_escape::decode_html_entities(&raw) != raw.as_str()
}
