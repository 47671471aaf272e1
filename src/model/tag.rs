use super::BrushFace;

/// A set of tag bits. Tags are registered by an external tagging pass; the
/// kernel only stores which ones apply to a face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagMask(u64);

impl TagMask {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Mask with only the tag at `index` set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 64 or more.
    #[must_use]
    pub fn single(index: u32) -> Self {
        assert!(index < u64::BITS, "tag index out of range");
        Self(1 << index)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any tag of `other` is also set here.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

/// Visits faces with write access, typically to update their tags.
pub trait TagVisitor {
    fn visit_face(&mut self, face: &mut BrushFace);
}

/// Visits faces read-only, typically to evaluate tag matchers.
pub trait ConstTagVisitor {
    fn visit_face(&mut self, face: &BrushFace);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove_bits() {
        let mut mask = TagMask::NONE;
        assert!(mask.is_empty());
        mask.insert(TagMask::single(3));
        mask.insert(TagMask::single(5));
        assert_eq!(mask.bits(), 0b10_1000);
        assert!(mask.intersects(TagMask::single(5)));
        mask.remove(TagMask::single(5));
        assert!(!mask.intersects(TagMask::single(5)));
        assert_eq!(mask, TagMask::new(8));
    }
}
