use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

use super::EntityKind;

/// Old id -> new id, one table per [`EntityKind`], scoped to a single import run.
///
/// Entries are write-once and never removed.
pub struct IdRemapTable {
    tables: [DashMap<i32, i32>; EntityKind::COUNT],
}

impl IdRemapTable {
    pub fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| DashMap::new()),
        }
    }

    /// Register `old_id -> new_id`; returns false if `old_id` was already mapped.
    pub fn set_id(&self, kind: EntityKind, old_id: i32, new_id: i32) -> bool {
        match self.tables[kind.index()].entry(old_id) {
            Entry::Occupied(existing) => {
                warn!(
                    "Ignoring second mapping for {} {} ({} already maps to {})",
                    kind,
                    old_id,
                    old_id,
                    existing.get()
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(new_id);
                true
            }
        }
    }

    pub fn get_id(&self, kind: EntityKind, old_id: i32) -> Option<i32> {
        self.tables[kind.index()].get(&old_id).map(|entry| *entry.value())
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|table| table.is_empty())
    }
}

impl Default for IdRemapTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_isolated() {
        let table = IdRemapTable::new();
        assert!(table.set_id(EntityKind::Tag, 10, 1));
        assert_eq!(table.get_id(EntityKind::Tag, 10), Some(1));
        assert_eq!(table.get_id(EntityKind::Category, 10), None);
        assert_eq!(table.len(EntityKind::Tag), 1);
        assert_eq!(table.len(EntityKind::Asset), 0);
    }

    #[test]
    fn first_registration_wins() {
        let table = IdRemapTable::new();
        assert!(table.set_id(EntityKind::Character, 100, 7));
        assert!(!table.set_id(EntityKind::Character, 100, 8));
        assert_eq!(table.get_id(EntityKind::Character, 100), Some(7));
    }

    #[test]
    fn starts_empty() {
        let table = IdRemapTable::default();
        assert!(table.is_empty());
        table.set_id(EntityKind::StaticCategory, 1, 2);
        assert!(!table.is_empty());
    }
}
