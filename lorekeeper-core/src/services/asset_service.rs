use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Paginator, PaginatorTrait, QueryOrder,
    SelectModel, Set,
};

use crate::database::entities::assets::{self, AssetType};
use crate::errors::CoreResult;
use crate::services::{BinarySource, StorageLayout, ValidationService};

#[derive(Debug, Clone, Default)]
pub struct AssetCreate {
    pub name: String,
    pub star: bool,
    pub rating: i32,
    pub intro: String,
    pub remark: String,
    pub path: BinarySource,
    pub asset_type: AssetType,
    pub tag_ids: String,
    pub group_ids: String,
    pub character_ids: String,
    pub asset_set_ids: String,
}

#[derive(Clone)]
pub struct AssetService {
    db: DatabaseConnection,
    storage: StorageLayout,
}

impl AssetService {
    pub fn new(db: DatabaseConnection, storage: StorageLayout) -> Self {
        Self { db, storage }
    }

    /// Validate and insert an asset, moving a staged payload into storage.
    pub async fn create(&self, body: AssetCreate) -> CoreResult<assets::Model> {
        let name = ValidationService::validate_name("Asset", &body.name)?;
        let rating = ValidationService::validate_rating(body.rating)?;
        let path = body.path.resolve(&self.storage)?;

        let inserted = assets::ActiveModel {
            name: Set(name),
            star: Set(body.star),
            rating: Set(rating),
            intro: Set(body.intro),
            remark: Set(body.remark),
            path: Set(path),
            asset_type: Set(body.asset_type.as_str().to_string()),
            tag_ids: Set(body.tag_ids),
            group_ids: Set(body.group_ids),
            character_ids: Set(body.character_ids),
            asset_set_ids: Set(body.asset_set_ids),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        inserted.map_err(|err| {
            body.path.rollback(&self.storage);
            err.into()
        })
    }

    pub async fn find_all(&self) -> CoreResult<Vec<assets::Model>> {
        Ok(assets::Entity::find()
            .order_by_asc(assets::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> CoreResult<Option<assets::Model>> {
        Ok(assets::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Walk every asset in id order without loading the whole table.
    pub fn paginate(
        &self,
        page_size: u64,
    ) -> Paginator<'_, DatabaseConnection, SelectModel<assets::Model>> {
        assets::Entity::find()
            .order_by_asc(assets::Column::Id)
            .paginate(&self.db, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;

    #[tokio::test]
    async fn staged_directory_payload_is_adopted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageLayout::new(dir.path().join("static"), dir.path().join("staging"));
        storage.ensure_dirs().unwrap();
        let staged = storage.staging_path("bundle");
        std::fs::create_dir_all(&staged).unwrap();
        std::fs::write(staged.join("1.png"), b"1").unwrap();
        std::fs::write(staged.join("2.png"), b"2").unwrap();

        let service = AssetService::new(setup_test_db().await, storage.clone());
        let asset = service
            .create(AssetCreate {
                name: "Sketches".to_string(),
                path: BinarySource::Staged("bundle".to_string()),
                asset_type: AssetType::Files,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(asset.path, "bundle");
        assert_eq!(asset.asset_type, "files");
        assert!(storage.static_path("bundle/2.png").exists());
    }
}
