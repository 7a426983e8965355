//! Runs whole exports and imports in fixed phase order: context, then
//! characters, then assets. Records are processed one at a time because
//! later records remap through ids registered by earlier ones.

use std::path::Path;

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use super::events::{ProgressReporter, TransferPhase, TransferSummary};
use super::exporter::{ExportOptions, Exporter};
use super::importer::{ImportOptions, Importer};
use super::kinds::EntityKind;
use super::records::Context;
use crate::errors::{TransferError, TransferResult};
use crate::services::{
    AssetGroupService, AssetService, CategoryCreate, CategoryService, CharacterGroupService,
    CharacterService, GroupCreate, RelationshipCreate, RelationshipService, StaticCategoryCreate,
    StaticCategoryService, StorageLayout, TagCreate, TagService,
};

#[derive(Clone, Debug)]
pub struct TransferSettings {
    pub storage: StorageLayout,
    pub export: ExportOptions,
    pub import: ImportOptions,
}

impl TransferSettings {
    pub fn new(storage: StorageLayout) -> Self {
        Self {
            storage,
            export: ExportOptions::default(),
            import: ImportOptions::default(),
        }
    }
}

#[derive(Clone)]
pub struct TransferService {
    db: DatabaseConnection,
    settings: TransferSettings,
}

impl TransferService {
    pub fn new(db: DatabaseConnection, settings: TransferSettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Export the whole store into `dir`.
    ///
    /// Per-record failures are reported and counted; database failures abort.
    pub async fn export(
        &self,
        dir: &Path,
        reporter: ProgressReporter,
    ) -> TransferResult<TransferSummary> {
        info!("Exporting to {:?}", dir);
        let result = self.run_export(dir, &reporter).await;
        finish(&reporter, result)
    }

    /// Import the export directory `dir` into the store.
    ///
    /// The context phase must complete before any character or asset is
    /// read; any failure inside it aborts the run.
    pub async fn import(
        &self,
        dir: &Path,
        reporter: ProgressReporter,
    ) -> TransferResult<TransferSummary> {
        info!("Importing from {:?}", dir);
        let result = self.run_import(dir, &reporter).await;
        finish(&reporter, result)
    }

    async fn run_export(
        &self,
        dir: &Path,
        reporter: &ProgressReporter,
    ) -> TransferResult<TransferSummary> {
        let storage = &self.settings.storage;
        let exporter = Exporter::new(dir, storage.static_root(), self.settings.export)?;
        exporter.clear_records()?;
        let mut summary = TransferSummary::default();

        reporter.phase_started(TransferPhase::Context);
        let categories = CategoryService::new(self.db.clone()).find_with_tags().await?;
        let asset_groups = AssetGroupService::new(self.db.clone()).find_all().await?;
        let relationships = RelationshipService::new(self.db.clone()).find_all().await?;
        let character_groups = CharacterGroupService::new(self.db.clone()).find_all().await?;
        let static_categories = StaticCategoryService::new(self.db.clone()).find_all().await?;
        exporter.output_context(
            &categories,
            &asset_groups,
            &relationships,
            &character_groups,
            &static_categories,
        )?;
        summary.categories = categories.len();
        summary.tags = categories.iter().map(|(_, tags)| tags.len()).sum();
        summary.asset_groups = asset_groups.len();
        summary.relationships = relationships.len();
        summary.character_groups = character_groups.len();
        summary.static_categories = static_categories.len();
        reporter.phase_finished(TransferPhase::Context, summary.context_total());

        reporter.phase_started(TransferPhase::Characters);
        let characters = CharacterService::new(self.db.clone(), storage.clone());
        let mut pages = characters.paginate(1);
        while let Some(page) = pages.fetch_and_next().await? {
            for character in page {
                reporter.record_started(TransferPhase::Characters, character.id);
                match exporter.output_character(&character) {
                    Ok(()) => {
                        summary.characters.succeeded += 1;
                        reporter.record_finished(TransferPhase::Characters, character.id, None);
                    }
                    Err(err) => {
                        summary.characters.failed += 1;
                        reporter.record_failed(TransferPhase::Characters, character.id, err);
                    }
                }
            }
        }
        reporter.phase_finished(TransferPhase::Characters, summary.characters.total());

        reporter.phase_started(TransferPhase::Assets);
        let assets = AssetService::new(self.db.clone(), storage.clone());
        let mut pages = assets.paginate(1);
        while let Some(page) = pages.fetch_and_next().await? {
            for asset in page {
                reporter.record_started(TransferPhase::Assets, asset.id);
                match exporter.output_asset(&asset) {
                    Ok(()) => {
                        summary.assets.succeeded += 1;
                        reporter.record_finished(TransferPhase::Assets, asset.id, None);
                    }
                    Err(err) => {
                        summary.assets.failed += 1;
                        reporter.record_failed(TransferPhase::Assets, asset.id, err);
                    }
                }
            }
        }
        reporter.phase_finished(TransferPhase::Assets, summary.assets.total());

        Ok(summary)
    }

    async fn run_import(
        &self,
        dir: &Path,
        reporter: &ProgressReporter,
    ) -> TransferResult<TransferSummary> {
        let storage = &self.settings.storage;
        let importer = Importer::new(
            dir,
            storage.staging_root(),
            self.settings.import,
            reporter.clone(),
        )?;
        if self.settings.import.import_assets {
            storage
                .ensure_dirs()
                .map_err(|e| TransferError::io(storage.static_root(), e))?;
        }
        let mut summary = TransferSummary::default();

        reporter.phase_started(TransferPhase::Context);
        let context = importer.input_context()?;
        self.import_context(&importer, context, &mut summary).await?;
        reporter.phase_finished(TransferPhase::Context, summary.context_total());

        reporter.phase_started(TransferPhase::Characters);
        let service = CharacterService::new(self.db.clone(), storage.clone());
        let mut records = importer.characters()?;
        for record in records.by_ref() {
            let avatar = record.body.avatar.clone();
            let fullbody = record.body.full_length_picture.clone();
            match service.create(record.body).await {
                Ok(created) => {
                    importer.set_id(EntityKind::Character, record.source_id, created.id);
                    summary.characters.succeeded += 1;
                    reporter.record_finished(
                        TransferPhase::Characters,
                        record.source_id,
                        Some(created.id),
                    );
                }
                Err(err) => {
                    importer.discard(&avatar);
                    importer.discard(&fullbody);
                    summary.characters.failed += 1;
                    reporter.record_failed(
                        TransferPhase::Characters,
                        record.source_id,
                        TransferError::Store(err),
                    );
                }
            }
        }
        summary.characters.failed += records.failed();
        reporter.phase_finished(TransferPhase::Characters, summary.characters.total());

        reporter.phase_started(TransferPhase::Assets);
        let service = AssetService::new(self.db.clone(), storage.clone());
        let mut records = importer.assets()?;
        for record in records.by_ref() {
            let path = record.body.path.clone();
            match service.create(record.body).await {
                Ok(created) => {
                    importer.set_id(EntityKind::Asset, record.source_id, created.id);
                    summary.assets.succeeded += 1;
                    reporter.record_finished(
                        TransferPhase::Assets,
                        record.source_id,
                        Some(created.id),
                    );
                }
                Err(err) => {
                    importer.discard(&path);
                    summary.assets.failed += 1;
                    reporter.record_failed(
                        TransferPhase::Assets,
                        record.source_id,
                        TransferError::Store(err),
                    );
                }
            }
        }
        summary.assets.failed += records.failed();
        reporter.phase_finished(TransferPhase::Assets, summary.assets.total());

        Ok(summary)
    }

    /// Create every context record and register its new id.
    async fn import_context(
        &self,
        importer: &Importer,
        context: Context,
        summary: &mut TransferSummary,
    ) -> TransferResult<()> {
        let categories = CategoryService::new(self.db.clone());
        for category in context.categories {
            let created = categories
                .create(CategoryCreate {
                    name: category.name,
                    category_type: category.category_type,
                    sort_order: category.order,
                    intro: category.intro,
                })
                .await?;
            importer.set_id(EntityKind::Category, category.id, created.id);
            summary.categories += 1;
        }

        let tags = TagService::new(self.db.clone());
        for tag in context.tags {
            let category_id = importer
                .get_id(EntityKind::Category, tag.category_id)
                .ok_or(TransferError::UnresolvedReference {
                    kind: EntityKind::Category,
                    id: tag.category_id,
                })?;
            let created = tags
                .create(TagCreate {
                    name: tag.name,
                    category_id,
                    sort_order: tag.order,
                })
                .await?;
            importer.set_id(EntityKind::Tag, tag.id, created.id);
            summary.tags += 1;
        }

        let asset_groups = AssetGroupService::new(self.db.clone());
        for group in context.asset_groups {
            let created = asset_groups
                .create(GroupCreate {
                    name: group.name,
                    star: group.star,
                    rating: group.rating,
                })
                .await?;
            importer.set_id(EntityKind::AssetGroup, group.id, created.id);
            summary.asset_groups += 1;
        }

        let character_groups = CharacterGroupService::new(self.db.clone());
        for group in context.character_groups {
            let created = character_groups
                .create(GroupCreate {
                    name: group.name,
                    star: group.star,
                    rating: group.rating,
                })
                .await?;
            importer.set_id(EntityKind::CharacterGroup, group.id, created.id);
            summary.character_groups += 1;
        }

        // Nothing references relationships by id
        let relationships = RelationshipService::new(self.db.clone());
        for relationship in context.relationships {
            relationships
                .create(RelationshipCreate {
                    name: relationship.name,
                    star: relationship.star,
                    rating: relationship.rating,
                    intro: relationship.intro,
                })
                .await?;
            summary.relationships += 1;
        }

        let static_categories = StaticCategoryService::new(self.db.clone());
        for static_category in context.static_categories {
            let created = static_categories
                .create(StaticCategoryCreate {
                    name: static_category.name,
                    sort_order: static_category.order,
                    intro: static_category.intro,
                })
                .await?;
            importer.set_id(EntityKind::StaticCategory, static_category.id, created.id);
            summary.static_categories += 1;
        }

        Ok(())
    }
}

fn finish(
    reporter: &ProgressReporter,
    result: TransferResult<TransferSummary>,
) -> TransferResult<TransferSummary> {
    match result {
        Ok(summary) => {
            reporter.run_finished(summary);
            Ok(summary)
        }
        Err(err) => {
            error!("{} aborted: {}", reporter.operation(), err);
            Err(err)
        }
    }
}

