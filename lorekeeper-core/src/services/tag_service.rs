use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::database::entities::{categories, tags};
use crate::errors::{CoreError, CoreResult};
use crate::services::ValidationService;

#[derive(Debug, Clone, Default)]
pub struct TagCreate {
    pub name: String,
    pub category_id: i32,
    pub sort_order: i32,
}

#[derive(Clone)]
pub struct TagService {
    db: DatabaseConnection,
}

impl TagService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: TagCreate) -> CoreResult<tags::Model> {
        let name = ValidationService::validate_name("Tag", &body.name)?;

        let category = categories::Entity::find_by_id(body.category_id)
            .one(&self.db)
            .await?;
        if category.is_none() {
            return Err(CoreError::validation(format!(
                "Tag '{}' references unknown category {}",
                name, body.category_id
            )));
        }

        let tag = tags::ActiveModel {
            name: Set(name),
            category_id: Set(body.category_id),
            sort_order: Set(body.sort_order),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(tag)
    }

    pub async fn find_all(&self) -> CoreResult<Vec<tags::Model>> {
        Ok(tags::Entity::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<tags::Model>> {
        Ok(tags::Entity::find_by_id(id).one(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::errors::CoreErrorKind;
    use crate::services::{CategoryCreate, CategoryService};

    #[tokio::test]
    async fn tag_requires_existing_category() {
        let db = setup_test_db().await;
        let service = TagService::new(db.clone());

        let err = service
            .create(TagCreate {
                name: "elf".to_string(),
                category_id: 99,
                sort_order: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::Validation);

        let category = CategoryService::new(db)
            .create(CategoryCreate {
                name: "species".to_string(),
                category_type: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        let tag = service
            .create(TagCreate {
                name: " elf ".to_string(),
                category_id: category.id,
                sort_order: 2,
            })
            .await
            .unwrap();
        assert_eq!(tag.name, "elf");
        assert_eq!(tag.category_id, category.id);
    }
}
