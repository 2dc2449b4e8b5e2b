//! Minimal color/attribute vocabulary for styled chunks and highlights.
//! Rendering itself (turning a style into ANSI escapes) is out of scope —
//! spec.md §1 treats ANSI output encoding as an external collaborator.

/// 24-bit color with alpha, matching the teacher's `Rgba` convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name(pub $repr);

        impl $name {
            $(pub const $variant: Self = Self($value);)*

            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            #[must_use]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }
    };
}

bitflags_like! {
    /// Text attribute bits (bold, underline, ...). A hand-rolled bitset
    /// rather than pulling in the `bitflags` crate for four bits.
    pub struct TextAttributes: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const DIM = 1 << 4;
        const REVERSE = 1 << 5;
    }
}

/// A resolved visual style: optional foreground/background color plus
/// attribute bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub attrs: TextAttributes,
}

impl Style {
    pub const NONE: Self = Self { fg: None, bg: None, attrs: TextAttributes::NONE };

    #[must_use]
    pub fn bold() -> Self {
        Self { attrs: TextAttributes::BOLD, ..Self::NONE }
    }

    #[must_use]
    pub fn fg(color: Rgba) -> Self {
        Self { fg: Some(color), ..Self::NONE }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }

    /// Later-wins merge: any field `other` sets overrides `self`'s.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: self.attrs.union(other.attrs),
        }
    }
}

/// A registry mapping generated `style_id`s to resolved [`Style`]s, shared
/// (weakly) by a text buffer (spec.md §4.4 `set_syntax_style`, §9 design
/// note "weak back-reference to syntax style"). The registry may outlive or
/// predecease the buffer; `Weak::upgrade` returning `None` is how the buffer
/// detects the latter, rather than an explicit destroy callback.
#[derive(Debug, Default)]
pub struct SyntaxStyleRegistry {
    styles: std::cell::RefCell<Vec<Style>>,
}

impl SyntaxStyleRegistry {
    #[must_use]
    pub fn new() -> std::rc::Rc<Self> {
        std::rc::Rc::new(Self::default())
    }

    /// Register `style`, returning its id (`1`-based; `0` is reserved for
    /// "no style" / default, per spec.md §4.4's highlight sweep).
    pub fn register(&self, style: Style) -> u32 {
        let mut styles = self.styles.borrow_mut();
        styles.push(style);
        styles.len() as u32
    }

    #[must_use]
    pub fn style(&self, style_id: u32) -> Option<Style> {
        if style_id == 0 {
            return Some(Style::NONE);
        }
        self.styles.borrow().get((style_id - 1) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_assigns_increasing_ids() {
        let registry = SyntaxStyleRegistry::new();
        let a = registry.register(Style::bold());
        let b = registry.register(Style::fg(Rgba::rgb(255, 0, 0)));
        assert_ne!(a, b);
        assert_eq!(registry.style(a), Some(Style::bold()));
    }

    #[test]
    fn style_id_zero_is_default() {
        let registry = SyntaxStyleRegistry::new();
        assert_eq!(registry.style(0), Some(Style::NONE));
    }

    #[test]
    fn merge_prefers_other_fields() {
        let base = Style::bold();
        let overlay = Style::fg(Rgba::WHITE);
        let merged = base.merge(overlay);
        assert_eq!(merged.fg, Some(Rgba::WHITE));
        assert!(merged.attrs.contains(TextAttributes::BOLD));
    }
}
