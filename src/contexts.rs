//! Parse context flags.
//!
//! Every frame on the tokenizer's stack carries a [`Context`] word describing
//! what construct the frame is parsing and which single-character look-ahead
//! hazards are currently armed. The dispatch loop and the construct handlers
//! test and update these flags on every character, so the whole set lives in
//! one machine word and membership checks are single AND operations.

bitflags::bitflags! {
    /// The context of a single parse frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct Context: u32 {
        /// In the name of a template.
        const TEMPLATE_NAME = 1 << 0;
        /// In the key of a template parameter.
        const TEMPLATE_PARAM_KEY = 1 << 1;
        /// In the value of a template parameter.
        const TEMPLATE_PARAM_VALUE = 1 << 2;

        /// In the name of a template argument.
        const ARGUMENT_NAME = 1 << 3;
        /// In the default value of a template argument.
        const ARGUMENT_DEFAULT = 1 << 4;

        /// In the title of a wikilink.
        const WIKILINK_TITLE = 1 << 5;
        /// In the display text of a wikilink.
        const WIKILINK_TEXT = 1 << 6;

        const HEADING_LEVEL_1 = 1 << 7;
        const HEADING_LEVEL_2 = 1 << 8;
        const HEADING_LEVEL_3 = 1 << 9;
        const HEADING_LEVEL_4 = 1 << 10;
        const HEADING_LEVEL_5 = 1 << 11;
        const HEADING_LEVEL_6 = 1 << 12;

        /// In an HTML comment.
        const COMMENT = 1 << 13;

        /// The current name has seen at least one non-whitespace character.
        const HAS_TEXT = 1 << 14;
        /// The current name has seen a newline after text; any further
        /// non-whitespace fails the route.
        const FAIL_ON_TEXT = 1 << 15;
        /// The next character unconditionally fails the route, unless a
        /// sub-handler consumes it first.
        const FAIL_NEXT = 1 << 16;
        /// A `{` was just seen; a second one on the very next character fails
        /// the route.
        const FAIL_ON_LBRACE = 1 << 17;
        /// A `}` was just seen; a second one on the very next character fails
        /// the route.
        const FAIL_ON_RBRACE = 1 << 18;

        /// Anywhere inside a template.
        const TEMPLATE = Self::TEMPLATE_NAME.bits()
            | Self::TEMPLATE_PARAM_KEY.bits()
            | Self::TEMPLATE_PARAM_VALUE.bits();
        /// Anywhere inside a template argument.
        const ARGUMENT = Self::ARGUMENT_NAME.bits() | Self::ARGUMENT_DEFAULT.bits();
        /// Anywhere inside a wikilink.
        const WIKILINK = Self::WIKILINK_TITLE.bits() | Self::WIKILINK_TEXT.bits();
        /// Anywhere inside a heading.
        const HEADING = Self::HEADING_LEVEL_1.bits()
            | Self::HEADING_LEVEL_2.bits()
            | Self::HEADING_LEVEL_3.bits()
            | Self::HEADING_LEVEL_4.bits()
            | Self::HEADING_LEVEL_5.bits()
            | Self::HEADING_LEVEL_6.bits();

        /// Contexts in which names must be checked for unsafe characters.
        const UNSAFE = Self::TEMPLATE_NAME.bits()
            | Self::WIKILINK_TITLE.bits()
            | Self::TEMPLATE_PARAM_KEY.bits()
            | Self::ARGUMENT_NAME.bits();
        /// Contexts in which end-of-input means an unclosed construct.
        const UNCLOSED = Self::TEMPLATE.bits()
            | Self::ARGUMENT.bits()
            | Self::WIKILINK.bits()
            | Self::HEADING.bits()
            | Self::COMMENT.bits();
    }
}

bitflags::bitflags! {
    /// Flags spanning the whole tokenization rather than a single frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct Global: u32 {
        /// Anywhere inside heading parsing. A nested `=` must not start
        /// another heading.
        const HEADING = 1 << 0;
    }
}

impl Context {
    /// The context for a heading of the given level, which must be in
    /// `1..=6`.
    pub(crate) fn heading(level: u8) -> Self {
        debug_assert!((1..=6).contains(&level));
        Self::from_bits_retain(Self::HEADING_LEVEL_1.bits() << (level - 1))
    }

    /// The level implied by this context's heading flag.
    pub(crate) fn heading_level(self) -> u8 {
        let bits = (self & Self::HEADING).bits() >> Self::HEADING_LEVEL_1.bits().trailing_zeros();
        debug_assert!(bits != 0, "no heading level in {self:?}");
        (bits.trailing_zeros() + 1) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_round_trip() {
        for level in 1..=6 {
            let context = Context::heading(level);
            assert!(context.intersects(Context::HEADING));
            assert_eq!(context.heading_level(), level);
        }
    }

    #[test]
    fn sub_contexts_imply_parents() {
        assert!(Context::TEMPLATE_PARAM_VALUE.intersects(Context::TEMPLATE));
        assert!(Context::ARGUMENT_DEFAULT.intersects(Context::ARGUMENT));
        assert!(Context::WIKILINK_TEXT.intersects(Context::WIKILINK));
        assert!(!Context::COMMENT.intersects(Context::TEMPLATE));
    }
}
