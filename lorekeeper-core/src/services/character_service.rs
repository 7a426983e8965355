use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Paginator, PaginatorTrait, QueryOrder,
    SelectModel, Set,
};
use serde_json::Value;

use crate::database::entities::characters;
use crate::errors::{CoreError, CoreResult};
use crate::services::{BinarySource, StorageLayout, ValidationService};

#[derive(Debug, Clone, Default)]
pub struct CharacterCreate {
    pub name: String,
    pub star: bool,
    pub rating: i32,
    pub intro: String,
    pub remark: String,
    pub avatar: BinarySource,
    pub full_length_picture: BinarySource,
    pub tag_ids: String,
    pub group_ids: String,
    pub static_categories: BTreeMap<i32, Value>,
}

#[derive(Clone)]
pub struct CharacterService {
    db: DatabaseConnection,
    storage: StorageLayout,
}

impl CharacterService {
    pub fn new(db: DatabaseConnection, storage: StorageLayout) -> Self {
        Self { db, storage }
    }

    /// Validate and insert a character, moving staged pictures into storage.
    pub async fn create(&self, body: CharacterCreate) -> CoreResult<characters::Model> {
        let name = ValidationService::validate_name("Character", &body.name)?;
        let rating = ValidationService::validate_rating(body.rating)?;
        let static_categories = serde_json::to_string(&body.static_categories).map_err(|e| {
            CoreError::validation(format!("Invalid static category values: {}", e))
        })?;

        let avatar = body.avatar.resolve(&self.storage)?;
        let full_length_picture = match body.full_length_picture.resolve(&self.storage) {
            Ok(path) => path,
            Err(err) => {
                body.avatar.rollback(&self.storage);
                return Err(err);
            }
        };

        let inserted = characters::ActiveModel {
            name: Set(name),
            star: Set(body.star),
            rating: Set(rating),
            intro: Set(body.intro),
            remark: Set(body.remark),
            avatar: Set(avatar),
            full_length_picture: Set(full_length_picture),
            tag_ids: Set(body.tag_ids),
            group_ids: Set(body.group_ids),
            static_categories: Set(static_categories),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        inserted.map_err(|err| {
            body.avatar.rollback(&self.storage);
            body.full_length_picture.rollback(&self.storage);
            err.into()
        })
    }

    pub async fn find_all(&self) -> CoreResult<Vec<characters::Model>> {
        Ok(characters::Entity::find()
            .order_by_asc(characters::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<characters::Model>> {
        Ok(characters::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Walk every character in id order without loading the whole table.
    pub fn paginate(
        &self,
        page_size: u64,
    ) -> Paginator<'_, DatabaseConnection, SelectModel<characters::Model>> {
        characters::Entity::find()
            .order_by_asc(characters::Column::Id)
            .paginate(&self.db, page_size)
    }
}

/// Decode the JSON map stored in `characters.static_categories`.
pub fn decode_static_categories(raw: &str) -> serde_json::Result<BTreeMap<i32, Value>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(raw)
}
