use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::database::entities::{categories, tags};
use crate::errors::CoreResult;
use crate::services::ValidationService;

#[derive(Debug, Clone, Default)]
pub struct CategoryCreate {
    pub name: String,
    pub category_type: i32,
    pub sort_order: i32,
    pub intro: String,
}

#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseConnection,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: CategoryCreate) -> CoreResult<categories::Model> {
        let name = ValidationService::validate_name("Category", &body.name)?;

        let category = categories::ActiveModel {
            name: Set(name),
            category_type: Set(body.category_type),
            sort_order: Set(body.sort_order),
            intro: Set(body.intro),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(category)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<categories::Model>> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<categories::Model>> {
        Ok(categories::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Every category together with the tags it owns
    pub async fn find_with_tags(&self) -> CoreResult<Vec<(categories::Model, Vec<tags::Model>)>> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .find_with_related(tags::Entity)
            .all(&self.db)
            .await?)
    }
}
