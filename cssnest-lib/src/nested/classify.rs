/// What a style key asks the nested plugin to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `""`, `@global`, `@global-*`, `@global_*`: unscoped rules.
    Global,
    /// `@media`, `@supports`, `@document`: hoisted next to the parent rule.
    Conditional,
    /// `@keyframes <name>`: a container of frames.
    KeyframesLike,
    /// `@font-face`: a style rule whose selector is always `@font-face`.
    FontFace,
    /// `@fallbacks`: declaration blocks rendered before the rule's own.
    Fallbacks,
    /// A selector containing `&`.
    PlainNested,
    /// Any other at-rule; relocated to the top of the sheet.
    BareAtRule,
    /// A plain CSS property, left alone.
    Property,
}

impl DirectiveKind {
    /// Kinds handled by the per-rule directive loop: everything but plain
    /// properties. Keyframes and font-face found inside a style rule move to
    /// the top of the sheet like any other bare at-rule.
    pub fn is_relocatable(self) -> bool {
        self != DirectiveKind::Property
    }
}

/// Classify a style key. Checks run in precedence order.
pub fn classify(key: &str) -> DirectiveKind {
    if is_global(key) {
        DirectiveKind::Global
    } else if ["@media", "@supports", "@document"]
        .iter()
        .any(|prefix| key.starts_with(prefix))
    {
        DirectiveKind::Conditional
    } else if key.starts_with("@keyframes ") {
        DirectiveKind::KeyframesLike
    } else if key.starts_with("@font-face") {
        DirectiveKind::FontFace
    } else if key == "@fallbacks" {
        DirectiveKind::Fallbacks
    } else if !key.starts_with('@') && key.contains('&') {
        DirectiveKind::PlainNested
    } else if key.starts_with('@') {
        DirectiveKind::BareAtRule
    } else {
        DirectiveKind::Property
    }
}

fn is_global(key: &str) -> bool {
    key.is_empty()
        || key == "@global"
        || key.starts_with("@global-")
        || key.starts_with("@global_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let cases = [
            ("", DirectiveKind::Global),
            ("@global", DirectiveKind::Global),
            ("@global-reset", DirectiveKind::Global),
            ("@global_2", DirectiveKind::Global),
            ("@globalx", DirectiveKind::BareAtRule),
            ("@media (min-width: 1024px)", DirectiveKind::Conditional),
            ("@supports (display: grid)", DirectiveKind::Conditional),
            ("@document url(x)", DirectiveKind::Conditional),
            ("@keyframes spin", DirectiveKind::KeyframesLike),
            ("@keyframes", DirectiveKind::BareAtRule),
            ("@font-face", DirectiveKind::FontFace),
            ("@font-face-2", DirectiveKind::FontFace),
            ("@fallbacks", DirectiveKind::Fallbacks),
            ("&:hover", DirectiveKind::PlainNested),
            (".a &", DirectiveKind::PlainNested),
            ("@page", DirectiveKind::BareAtRule),
            ("@import", DirectiveKind::BareAtRule),
            ("color", DirectiveKind::Property),
            (".child", DirectiveKind::Property),
        ];
        for (key, expected) in cases {
            assert_eq!(classify(key), expected, "{:?}", key);
        }
    }

    #[test]
    fn test_relocatable_kinds() {
        assert!(DirectiveKind::Conditional.is_relocatable());
        assert!(DirectiveKind::BareAtRule.is_relocatable());
        assert!(DirectiveKind::FontFace.is_relocatable());
        assert!(DirectiveKind::KeyframesLike.is_relocatable());
        assert!(!DirectiveKind::Property.is_relocatable());
    }
}
