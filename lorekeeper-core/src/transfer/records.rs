//! On-disk JSON shapes of an export directory.
//!
//! ```text
//! <root>/
//!   context.json
//!   characters/<id>/character.json   (+ avatar.<ext>, fullbody.<ext>)
//!   assets/<id>.json                 (+ assets/<id>/ payload)
//! ```
//!
//! Ids are written verbatim from the source database; remapping happens only
//! on import.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::entities::assets::AssetType;
use crate::database::entities::{
    asset_groups, assets, categories, character_groups, characters, relationships,
    static_categories, tags,
};
use crate::services::character_service::decode_static_categories;

pub const CONTEXT_FILE: &str = "context.json";
pub const CHARACTERS_DIR: &str = "characters";
pub const CHARACTER_FILE: &str = "character.json";
pub const ASSETS_DIR: &str = "assets";
pub const AVATAR_BASENAME: &str = "avatar";
pub const FULLBODY_BASENAME: &str = "fullbody";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    #[serde(default)]
    pub order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub category_type: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

/// Shared shape of asset groups and character groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarNameRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub rating: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub intro: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCategoryRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub intro: String,
}

/// `context.json`: categories carry their tags nested.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextManifest {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub asset_groups: Vec<StarNameRecord>,
    #[serde(default)]
    pub character_groups: Vec<StarNameRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
    #[serde(default)]
    pub static_categories: Vec<StaticCategoryRecord>,
}

/// The manifest as consumed by an import: tags pulled out of their categories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub tags: Vec<TagRecord>,
    pub categories: Vec<CategoryRecord>,
    pub asset_groups: Vec<StarNameRecord>,
    pub character_groups: Vec<StarNameRecord>,
    pub relationships: Vec<RelationshipRecord>,
    pub static_categories: Vec<StaticCategoryRecord>,
}

impl From<ContextManifest> for Context {
    fn from(manifest: ContextManifest) -> Self {
        let mut tags = Vec::new();
        let categories = manifest
            .categories
            .into_iter()
            .map(|mut category| {
                for mut tag in std::mem::take(&mut category.tags) {
                    // The nesting is authoritative for ownership
                    tag.category_id = category.id;
                    tags.push(tag);
                }
                category
            })
            .collect();

        Context {
            tags,
            categories,
            asset_groups: manifest.asset_groups,
            character_groups: manifest.character_groups,
            relationships: manifest.relationships,
            static_categories: manifest.static_categories,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub full_length_picture: String,
    #[serde(default)]
    pub tag_ids: String,
    #[serde(default)]
    pub group_ids: String,
    #[serde(default)]
    pub static_categories: BTreeMap<i32, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub asset_type: AssetType,
    #[serde(default)]
    pub tag_ids: String,
    #[serde(default)]
    pub group_ids: String,
    #[serde(default)]
    pub character_ids: String,
    #[serde(default)]
    pub asset_set_ids: String,
}

impl From<&tags::Model> for TagRecord {
    fn from(model: &tags::Model) -> Self {
        TagRecord {
            id: model.id,
            name: model.name.clone(),
            category_id: model.category_id,
            order: model.sort_order,
        }
    }
}

impl CategoryRecord {
    pub fn from_model(model: &categories::Model, tags: &[tags::Model]) -> Self {
        CategoryRecord {
            id: model.id,
            name: model.name.clone(),
            category_type: model.category_type,
            order: model.sort_order,
            intro: model.intro.clone(),
            tags: tags.iter().map(TagRecord::from).collect(),
        }
    }
}

impl From<&asset_groups::Model> for StarNameRecord {
    fn from(model: &asset_groups::Model) -> Self {
        StarNameRecord {
            id: model.id,
            name: model.name.clone(),
            star: model.star,
            rating: model.rating,
        }
    }
}

impl From<&character_groups::Model> for StarNameRecord {
    fn from(model: &character_groups::Model) -> Self {
        StarNameRecord {
            id: model.id,
            name: model.name.clone(),
            star: model.star,
            rating: model.rating,
        }
    }
}

impl From<&relationships::Model> for RelationshipRecord {
    fn from(model: &relationships::Model) -> Self {
        RelationshipRecord {
            id: model.id,
            name: model.name.clone(),
            star: model.star,
            rating: model.rating,
            intro: model.intro.clone(),
        }
    }
}

impl From<&static_categories::Model> for StaticCategoryRecord {
    fn from(model: &static_categories::Model) -> Self {
        StaticCategoryRecord {
            id: model.id,
            name: model.name.clone(),
            order: model.sort_order,
            intro: model.intro.clone(),
        }
    }
}

impl CharacterRecord {
    pub fn from_model(model: &characters::Model) -> serde_json::Result<Self> {
        Ok(CharacterRecord {
            id: model.id,
            name: model.name.clone(),
            star: model.star,
            rating: model.rating,
            intro: model.intro.clone(),
            remark: model.remark.clone(),
            avatar: model.avatar.clone(),
            full_length_picture: model.full_length_picture.clone(),
            tag_ids: model.tag_ids.clone(),
            group_ids: model.group_ids.clone(),
            static_categories: decode_static_categories(&model.static_categories)?,
        })
    }
}

impl From<&assets::Model> for AssetRecord {
    fn from(model: &assets::Model) -> Self {
        AssetRecord {
            id: model.id,
            name: model.name.clone(),
            star: model.star,
            rating: model.rating,
            intro: model.intro.clone(),
            remark: model.remark.clone(),
            path: model.path.clone(),
            // Unknown values fall back to a single file
            asset_type: model.asset_type.parse().unwrap_or_default(),
            tag_ids: model.tag_ids.clone(),
            group_ids: model.group_ids.clone(),
            character_ids: model.character_ids.clone(),
            asset_set_ids: model.asset_set_ids.clone(),
        }
    }
}
