use crate::app::stage::PropId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DepthEntry {
    id: PropId,
    key: i64,
}

/// Draw-order bookkeeping for the stage. Membership and key changes only
/// mark the order dirty; the actual O(n log n) sort runs at most once per
/// frame when [`DepthOrder::sort_if_dirty`] is called.
#[derive(Debug, Default)]
pub struct DepthOrder {
    entries: Vec<DepthEntry>,
    dirty: bool,
}

impl DepthOrder {
    pub fn insert(&mut self, id: PropId, key: i64) {
        if self.entries.iter().any(|entry| entry.id == id) {
            self.set_key(id, key);
            return;
        }
        self.entries.push(DepthEntry { id, key });
        self.dirty = true;
    }

    pub fn remove(&mut self, id: PropId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn set_key(&mut self, id: PropId, key: i64) {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return;
        };
        if entry.key == key {
            return;
        }
        entry.key = key;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty = false;
    }

    /// Sorts back-to-front if anything changed since the last sort.
    /// Returns whether a sort actually ran. The sort is stable, so props
    /// with equal keys keep their insertion order.
    pub fn sort_if_dirty(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.entries.sort_by_key(|entry| entry.key);
        self.dirty = false;
        true
    }

    pub fn ids(&self) -> impl Iterator<Item = PropId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }
}
