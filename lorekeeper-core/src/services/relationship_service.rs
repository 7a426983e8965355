use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::database::entities::relationships;
use crate::errors::CoreResult;
use crate::services::ValidationService;

#[derive(Debug, Clone, Default)]
pub struct RelationshipCreate {
    pub name: String,
    pub star: bool,
    pub rating: i32,
    pub intro: String,
}

#[derive(Clone)]
pub struct RelationshipService {
    db: DatabaseConnection,
}

impl RelationshipService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: RelationshipCreate) -> CoreResult<relationships::Model> {
        let name = ValidationService::validate_name("Relationship", &body.name)?;
        let rating = ValidationService::validate_rating(body.rating)?;

        Ok(relationships::ActiveModel {
            name: Set(name),
            star: Set(body.star),
            rating: Set(rating),
            intro: Set(body.intro),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<relationships::Model>> {
        Ok(relationships::Entity::find()
            .order_by_asc(relationships::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<relationships::Model>> {
        Ok(relationships::Entity::find_by_id(id).one(&self.db).await?)
    }
}
