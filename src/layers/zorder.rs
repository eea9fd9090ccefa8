use crate::layers::base::LayerId;

/// Back-to-front ordering of layer ids
///
/// The first id is painted first (bottom), the last id last (top). Every
/// mutator keeps the sequence free of duplicates, and an unknown id leaves
/// it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZOrder {
    ids: Vec<LayerId>,
}

impl ZOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` on top; an id already present is left where it is
    pub fn push(&mut self, id: LayerId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: LayerId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn to_back(&mut self, id: LayerId) -> bool {
        if !self.remove(id) {
            return false;
        }
        self.ids.insert(0, id);
        true
    }

    pub fn to_front(&mut self, id: LayerId) -> bool {
        if !self.remove(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Moves `id` directly beneath `anchor`, so `anchor` paints after it
    pub fn place_after(&mut self, id: LayerId, anchor: LayerId) -> bool {
        if id == anchor || !self.contains(id) || !self.contains(anchor) {
            return false;
        }
        self.remove(id);
        // anchor is still present, so the lookup succeeds
        let index = self.position(anchor).unwrap_or(self.ids.len());
        self.ids.insert(index, id);
        true
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.ids.iter().position(|&other| other == id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = LayerId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[LayerId] {
        &self.ids
    }

    /// Copy of the current order, for iterating while the store changes
    pub fn snapshot(&self) -> Vec<LayerId> {
        self.ids.clone()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(ids: &[u32]) -> ZOrder {
        let mut z = ZOrder::new();
        for &id in ids {
            z.push(LayerId::new(id));
        }
        z
    }

    fn ids(z: &ZOrder) -> Vec<u32> {
        z.iter().map(|id| id.value()).collect()
    }

    #[test]
    fn test_push_ignores_duplicates() {
        let mut z = order(&[1, 2]);
        z.push(LayerId::new(1));
        assert_eq!(ids(&z), vec![1, 2]);
    }

    #[test]
    fn test_to_back_and_front() {
        let mut z = order(&[1, 2, 3]);

        assert!(z.to_back(LayerId::new(3)));
        assert_eq!(ids(&z), vec![3, 1, 2]);

        assert!(z.to_front(LayerId::new(3)));
        assert_eq!(ids(&z), vec![1, 2, 3]);

        // Already in front
        assert!(z.to_front(LayerId::new(3)));
        assert_eq!(ids(&z), vec![1, 2, 3]);

        assert!(!z.to_back(LayerId::new(9)));
        assert_eq!(ids(&z), vec![1, 2, 3]);
    }

    #[test]
    fn test_place_after() {
        let mut z = order(&[1, 2, 3, 4]);

        assert!(z.place_after(LayerId::new(4), LayerId::new(2)));
        assert_eq!(ids(&z), vec![1, 4, 2, 3]);

        // Idempotent
        assert!(z.place_after(LayerId::new(4), LayerId::new(2)));
        assert_eq!(ids(&z), vec![1, 4, 2, 3]);

        assert!(z.place_after(LayerId::new(1), LayerId::new(3)));
        assert_eq!(ids(&z), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_place_after_unknown_ids() {
        let mut z = order(&[1, 2, 3]);
        assert!(!z.place_after(LayerId::new(9), LayerId::new(2)));
        assert!(!z.place_after(LayerId::new(1), LayerId::new(9)));
        assert!(!z.place_after(LayerId::new(2), LayerId::new(2)));
        assert_eq!(ids(&z), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove() {
        let mut z = order(&[1, 2, 3]);
        assert!(z.remove(LayerId::new(2)));
        assert!(!z.remove(LayerId::new(2)));
        assert_eq!(ids(&z), vec![1, 3]);
        assert_eq!(z.len(), 2);
    }
}
