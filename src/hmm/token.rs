use bitflags::bitflags;

bitflags! {
    /// Surface features of a token, derived on demand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Shape: u16 {
        const CAPITALIZED = 1 << 0;
        const HAS_DIGIT = 1 << 1;
        const HAS_HYPHEN = 1 << 2;
        const ENDS_S = 1 << 3;
        const ENDS_ES = 1 << 4;
        const ENDS_IES = 1 << 5;
        const ENDS_ED = 1 << 6;
        const ENDS_ER = 1 << 7;
        const ENDS_LY = 1 << 8;
        const ENDS_ING = 1 << 9;
        const ENDS_IZE = 1 << 10;
    }
}

const SUFFIXES: [(&str, Shape); 8] = [
    ("s", Shape::ENDS_S),
    ("es", Shape::ENDS_ES),
    ("ies", Shape::ENDS_IES),
    ("ed", Shape::ENDS_ED),
    ("er", Shape::ENDS_ER),
    ("ly", Shape::ENDS_LY),
    ("ing", Shape::ENDS_ING),
    ("ize", Shape::ENDS_IZE),
];

impl Shape {
    pub fn of(token: &str) -> Self {
        let mut shape = Self::empty();
        if is_capitalized(token) {
            shape |= Self::CAPITALIZED;
        }
        if token.bytes().any(|b| b.is_ascii_digit()) {
            shape |= Self::HAS_DIGIT;
        }
        if token.contains('-') {
            shape |= Self::HAS_HYPHEN;
        }
        for (suffix, flag) in SUFFIXES {
            if token.ends_with(suffix) {
                shape |= flag;
            }
        }
        shape
    }
}

#[inline]
pub fn is_capitalized(token: &str) -> bool {
    token.chars().next().map_or(false, char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        let shape = Shape::of("flies");
        assert!(shape.contains(Shape::ENDS_S | Shape::ENDS_ES | Shape::ENDS_IES));
        assert!(!shape.intersects(Shape::CAPITALIZED | Shape::ENDS_ED));

        let shape = Shape::of("Running");
        assert_eq!(shape, Shape::CAPITALIZED | Shape::ENDS_ING);
    }

    #[test]
    fn digits_and_hyphens() {
        assert!(Shape::of("1990s").contains(Shape::HAS_DIGIT | Shape::ENDS_S));
        assert_eq!(Shape::of("well-known"), Shape::HAS_HYPHEN);
        assert_eq!(Shape::of(""), Shape::empty());
    }
}
