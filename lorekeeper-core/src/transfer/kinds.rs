use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds whose ids can be referenced from another record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Tag,
    Category,
    AssetGroup,
    CharacterGroup,
    Character,
    Asset,
    StaticCategory,
}

impl EntityKind {
    pub const COUNT: usize = 7;

    pub const ALL: [EntityKind; EntityKind::COUNT] = [
        EntityKind::Tag,
        EntityKind::Category,
        EntityKind::AssetGroup,
        EntityKind::CharacterGroup,
        EntityKind::Character,
        EntityKind::Asset,
        EntityKind::StaticCategory,
    ];

    /// Slot of this kind in per-kind tables
    pub const fn index(self) -> usize {
        match self {
            EntityKind::Tag => 0,
            EntityKind::Category => 1,
            EntityKind::AssetGroup => 2,
            EntityKind::CharacterGroup => 3,
            EntityKind::Character => 4,
            EntityKind::Asset => 5,
            EntityKind::StaticCategory => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Tag => "tag",
            EntityKind::Category => "category",
            EntityKind::AssetGroup => "asset group",
            EntityKind::CharacterGroup => "character group",
            EntityKind::Character => "character",
            EntityKind::Asset => "asset",
            EntityKind::StaticCategory => "static category",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_every_slot_once() {
        let mut seen = [false; EntityKind::COUNT];
        for kind in EntityKind::ALL {
            assert!(!seen[kind.index()], "{} shares a slot", kind);
            seen[kind.index()] = true;
        }
        assert!(seen.iter().all(|slot| *slot));
    }
}
