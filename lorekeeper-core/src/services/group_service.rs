//! Asset groups and character groups: flat `{name, star, rating}` records.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::database::entities::{asset_groups, character_groups};
use crate::errors::CoreResult;
use crate::services::ValidationService;

#[derive(Debug, Clone, Default)]
pub struct GroupCreate {
    pub name: String,
    pub star: bool,
    pub rating: i32,
}

#[derive(Clone)]
pub struct AssetGroupService {
    db: DatabaseConnection,
}

impl AssetGroupService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: GroupCreate) -> CoreResult<asset_groups::Model> {
        let name = ValidationService::validate_name("Asset group", &body.name)?;
        let rating = ValidationService::validate_rating(body.rating)?;

        Ok(asset_groups::ActiveModel {
            name: Set(name),
            star: Set(body.star),
            rating: Set(rating),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<asset_groups::Model>> {
        Ok(asset_groups::Entity::find()
            .order_by_asc(asset_groups::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<asset_groups::Model>> {
        Ok(asset_groups::Entity::find_by_id(id).one(&self.db).await?)
    }
}

#[derive(Clone)]
pub struct CharacterGroupService {
    db: DatabaseConnection,
}

impl CharacterGroupService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: GroupCreate) -> CoreResult<character_groups::Model> {
        let name = ValidationService::validate_name("Character group", &body.name)?;
        let rating = ValidationService::validate_rating(body.rating)?;

        Ok(character_groups::ActiveModel {
            name: Set(name),
            star: Set(body.star),
            rating: Set(rating),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<character_groups::Model>> {
        Ok(character_groups::Entity::find()
            .order_by_asc(character_groups::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<character_groups::Model>> {
        Ok(character_groups::Entity::find_by_id(id).one(&self.db).await?)
    }
}
