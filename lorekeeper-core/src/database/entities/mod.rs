pub mod asset_groups;
pub mod assets;
pub mod categories;
pub mod character_groups;
pub mod characters;
pub mod relationships;
pub mod static_categories;
pub mod tags;
