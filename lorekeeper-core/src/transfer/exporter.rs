use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::records::{
    AssetRecord, CategoryRecord, CharacterRecord, ContextManifest, RelationshipRecord,
    StarNameRecord, StaticCategoryRecord, ASSETS_DIR, AVATAR_BASENAME, CHARACTERS_DIR,
    CHARACTER_FILE, CONTEXT_FILE, FULLBODY_BASENAME,
};
use crate::database::entities::assets::AssetType;
use crate::database::entities::{
    asset_groups, assets, categories, character_groups, characters, relationships,
    static_categories, tags,
};
use crate::errors::{TransferError, TransferResult};
use crate::utils::fs::{copy_recursive, dotted_extension};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Copy asset payloads next to their records
    pub export_assets: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_assets: true,
        }
    }
}

/// Writes an export directory. Ids are written exactly as stored.
pub struct Exporter {
    root: PathBuf,
    static_root: PathBuf,
    options: ExportOptions,
}

impl Exporter {
    /// Prepare `root` (and its phase subdirectories) for output.
    pub fn new(
        root: impl Into<PathBuf>,
        static_root: impl Into<PathBuf>,
        options: ExportOptions,
    ) -> TransferResult<Self> {
        let root = root.into();
        for dir in [
            root.clone(),
            root.join(CHARACTERS_DIR),
            root.join(ASSETS_DIR),
        ] {
            fs::create_dir_all(&dir).map_err(|e| TransferError::io(&dir, e))?;
        }

        Ok(Self {
            root,
            static_root: static_root.into(),
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Empty `characters/` and `assets/` so rows deleted since a previous
    /// export into the same directory do not survive. `context.json` is
    /// replaced by [`Exporter::output_context`] and left alone here.
    pub fn clear_records(&self) -> TransferResult<()> {
        for dir in [self.root.join(CHARACTERS_DIR), self.root.join(ASSETS_DIR)] {
            remove_if_present(&dir)?;
            fs::create_dir_all(&dir).map_err(|e| TransferError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Write `context.json`, replacing any previous manifest.
    pub fn output_context(
        &self,
        categories: &[(categories::Model, Vec<tags::Model>)],
        asset_groups: &[asset_groups::Model],
        relationships: &[relationships::Model],
        character_groups: &[character_groups::Model],
        static_categories: &[static_categories::Model],
    ) -> TransferResult<ContextManifest> {
        let manifest = ContextManifest {
            categories: categories
                .iter()
                .map(|(category, tags)| CategoryRecord::from_model(category, tags))
                .collect(),
            asset_groups: asset_groups.iter().map(StarNameRecord::from).collect(),
            character_groups: character_groups.iter().map(StarNameRecord::from).collect(),
            relationships: relationships.iter().map(RelationshipRecord::from).collect(),
            static_categories: static_categories
                .iter()
                .map(StaticCategoryRecord::from)
                .collect(),
        };

        write_json(&self.root.join(CONTEXT_FILE), &manifest)?;
        Ok(manifest)
    }

    /// Write `characters/<id>/` with the record and its renamed binaries.
    ///
    /// A missing source binary fails the character before anything is written.
    pub fn output_character(&self, character: &characters::Model) -> TransferResult<()> {
        let avatar = self.binary_source(&character.avatar)?;
        let fullbody = self.binary_source(&character.full_length_picture)?;
        let record = CharacterRecord::from_model(character)
            .map_err(|e| TransferError::json(format!("character {}", character.id), e))?;

        let dir = self
            .root
            .join(CHARACTERS_DIR)
            .join(character.id.to_string());
        // Binaries from an earlier export may carry other extensions
        remove_if_present(&dir)?;
        fs::create_dir_all(&dir).map_err(|e| TransferError::io(&dir, e))?;

        let written = write_character_dir(
            &dir,
            &record,
            [(avatar, AVATAR_BASENAME), (fullbody, FULLBODY_BASENAME)],
        );

        if written.is_err() {
            // No partial character directories
            let _ = fs::remove_dir_all(&dir);
        }
        written
    }

    /// Write `assets/<id>.json`, plus the payload under `assets/<id>/` when
    /// asset export is enabled.
    pub fn output_asset(&self, asset: &assets::Model) -> TransferResult<()> {
        let record = AssetRecord::from(asset);
        let assets_dir = self.root.join(ASSETS_DIR);

        if self.options.export_assets {
            if let Some(source) = self.binary_source(&asset.path)? {
                let payload_dir = assets_dir.join(asset.id.to_string());
                remove_if_present(&payload_dir)?;
                let target = match record.asset_type {
                    AssetType::File if source.is_file() => match source.file_name() {
                        Some(name) => payload_dir.join(name),
                        None => payload_dir.clone(),
                    },
                    _ => payload_dir.clone(),
                };
                let copied = copy_recursive(&source, &target).map_err(|e| {
                    let _ = fs::remove_dir_all(&payload_dir);
                    TransferError::io(&source, e)
                })?;
                debug!("Copied {} payload file(s) for asset {}", copied, asset.id);
            }
        }

        write_json(&assets_dir.join(format!("{}.json", asset.id)), &record)
    }

    fn binary_source(&self, relative: &str) -> TransferResult<Option<PathBuf>> {
        if relative.is_empty() {
            return Ok(None);
        }
        let path = self.static_root.join(relative);
        if path.exists() {
            Ok(Some(path))
        } else {
            Err(TransferError::MissingBinary(path))
        }
    }
}

fn write_character_dir(
    dir: &Path,
    record: &CharacterRecord,
    binaries: [(Option<PathBuf>, &str); 2],
) -> TransferResult<()> {
    write_json(&dir.join(CHARACTER_FILE), record)?;
    for (source, basename) in binaries {
        if let Some(source) = source {
            let target = dir.join(format!("{}{}", basename, dotted_extension(&source)));
            fs::copy(&source, &target).map_err(|e| TransferError::io(&source, e))?;
        }
    }
    Ok(())
}

fn remove_if_present(dir: &Path) -> TransferResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| TransferError::io(dir, e))?;
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> TransferResult<()> {
    let body = serde_json::to_string_pretty(value).map_err(|e| TransferError::json(path, e))?;
    fs::write(path, body).map_err(|e| TransferError::io(path, e))
}
