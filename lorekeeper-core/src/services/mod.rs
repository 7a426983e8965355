//! Entity Store services, one per entity kind.
//!
//! Each service exposes the same narrow surface the transfer pipeline relies
//! on: `create`, `find_all` and `find_by_id`, plus one-at-a-time pagination
//! for characters and assets.

pub mod asset_service;
pub mod category_service;
pub mod character_service;
pub mod group_service;
pub mod relationship_service;
pub mod static_category_service;
pub mod storage;
pub mod tag_service;
pub mod validation;

pub use asset_service::{AssetCreate, AssetService};
pub use category_service::{CategoryCreate, CategoryService};
pub use character_service::{CharacterCreate, CharacterService};
pub use group_service::{AssetGroupService, CharacterGroupService, GroupCreate};
pub use relationship_service::{RelationshipCreate, RelationshipService};
pub use static_category_service::{StaticCategoryCreate, StaticCategoryService};
pub use storage::{BinarySource, StorageLayout};
pub use tag_service::{TagCreate, TagService};
pub use validation::ValidationService;
