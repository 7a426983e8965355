use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::database::entities::static_categories;
use crate::errors::CoreResult;
use crate::services::ValidationService;

#[derive(Debug, Clone, Default)]
pub struct StaticCategoryCreate {
    pub name: String,
    pub sort_order: i32,
    pub intro: String,
}

#[derive(Clone)]
pub struct StaticCategoryService {
    db: DatabaseConnection,
}

impl StaticCategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: StaticCategoryCreate) -> CoreResult<static_categories::Model> {
        let name = ValidationService::validate_name("Static category", &body.name)?;

        Ok(static_categories::ActiveModel {
            name: Set(name),
            sort_order: Set(body.sort_order),
            intro: Set(body.intro),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<static_categories::Model>> {
        Ok(static_categories::Entity::find()
            .order_by_asc(static_categories::Column::SortOrder)
            .order_by_asc(static_categories::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<static_categories::Model>> {
        Ok(static_categories::Entity::find_by_id(id).one(&self.db).await?)
    }
}
