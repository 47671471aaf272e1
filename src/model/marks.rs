use std::collections::HashSet;

use crate::topology::FaceId;

/// Faces marked for rendering by a read-only traversal.
///
/// Kept outside the faces so that marking never needs write access to them.
/// Each pass owns its own table.
#[derive(Debug, Clone, Default)]
pub struct FaceMarks {
    marked: HashSet<FaceId>,
}

impl FaceMarks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `face`; returns `false` if it was already marked.
    pub fn mark(&mut self, face: FaceId) -> bool {
        self.marked.insert(face)
    }

    /// Unmarks `face`; returns `false` if it was not marked.
    pub fn unmark(&mut self, face: FaceId) -> bool {
        self.marked.remove(&face)
    }

    #[must_use]
    pub fn is_marked(&self, face: FaceId) -> bool {
        self.marked.contains(&face)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn marks_are_per_face() {
        let mut keys: SlotMap<FaceId, ()> = SlotMap::with_key();
        let (a, b) = (keys.insert(()), keys.insert(()));
        let mut marks = FaceMarks::new();
        assert!(marks.mark(a));
        assert!(!marks.mark(a));
        assert!(marks.is_marked(a));
        assert!(!marks.is_marked(b));
        assert!(marks.unmark(a));
        assert!(marks.is_empty());
        marks.mark(b);
        marks.clear();
        assert_eq!(marks.len(), 0);
    }
}
