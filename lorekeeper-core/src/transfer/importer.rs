//! Reads an export directory back into creation bodies for the Entity Store.
//!
//! The importer never creates rows itself. It remaps every reference through
//! the run's [`IdRemapTable`], which the orchestrator fills as rows are
//! created, and stages binaries so the store can adopt them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::{ProgressReporter, TransferPhase};
use super::id_list::{join_id_list, parse_id_list};
use super::id_remap::IdRemapTable;
use super::kinds::EntityKind;
use super::records::{
    AssetRecord, CharacterRecord, Context, ContextManifest, ASSETS_DIR, AVATAR_BASENAME,
    CHARACTERS_DIR, CHARACTER_FILE, CONTEXT_FILE, FULLBODY_BASENAME,
};
use crate::database::entities::assets::AssetType;
use crate::errors::{TransferError, TransferResult};
use crate::services::{AssetCreate, BinarySource, CharacterCreate};
use crate::utils::fs::{copy_recursive, dotted_extension};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// Copy binaries into storage; otherwise recorded paths pass through
    pub import_assets: bool,
    /// Fail a record whose references are not in the remap table
    pub strict_remap: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_assets: true,
            strict_remap: false,
        }
    }
}

/// A character ready for `CharacterService::create`, with its exported id.
#[derive(Clone, Debug)]
pub struct ImportedCharacter {
    pub source_id: i32,
    pub body: CharacterCreate,
}

/// An asset ready for `AssetService::create`, with its exported id.
#[derive(Clone, Debug)]
pub struct ImportedAsset {
    pub source_id: i32,
    pub body: AssetCreate,
}

pub struct Importer {
    root: PathBuf,
    staging_root: PathBuf,
    options: ImportOptions,
    ids: IdRemapTable,
    staged: AtomicUsize,
    reporter: ProgressReporter,
}

impl Importer {
    pub fn new(
        root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
        options: ImportOptions,
        reporter: ProgressReporter,
    ) -> TransferResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TransferError::MissingDirectory(root));
        }

        let staging_root = staging_root.into();
        if options.import_assets {
            fs::create_dir_all(&staging_root).map_err(|e| TransferError::io(&staging_root, e))?;
        }

        Ok(Self {
            root,
            staging_root,
            options,
            ids: IdRemapTable::new(),
            staged: AtomicUsize::new(0),
            reporter,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> ImportOptions {
        self.options
    }

    /// Number of binaries staged so far in this run
    pub fn staged_count(&self) -> usize {
        self.staged.load(Ordering::Relaxed)
    }

    pub fn input_context(&self) -> TransferResult<Context> {
        let path = self.root.join(CONTEXT_FILE);
        if !path.is_file() {
            return Err(TransferError::MissingManifest(path));
        }
        let manifest: ContextManifest = read_json(&path)?;
        Ok(Context::from(manifest))
    }

    /// Characters in ascending id order. Unreadable records are reported and
    /// skipped.
    pub fn characters(&self) -> TransferResult<Records<'_, ImportedCharacter>> {
        let dir = self.phase_dir(CHARACTERS_DIR)?;
        let ids = list_ids(&dir, |path| {
            if !path.is_dir() {
                return None;
            }
            path.file_name()?.to_str()?.parse().ok()
        })?;
        Ok(Records::new(
            self,
            TransferPhase::Characters,
            ids,
            Importer::input_character,
        ))
    }

    /// Assets in ascending id order. Unreadable records are reported and
    /// skipped.
    pub fn assets(&self) -> TransferResult<Records<'_, ImportedAsset>> {
        let dir = self.phase_dir(ASSETS_DIR)?;
        let ids = list_ids(&dir, |path| {
            if !path.is_file() || path.extension()? != "json" {
                return None;
            }
            path.file_stem()?.to_str()?.parse().ok()
        })?;
        Ok(Records::new(
            self,
            TransferPhase::Assets,
            ids,
            Importer::input_asset,
        ))
    }

    pub fn input_character(&self, id: i32) -> TransferResult<ImportedCharacter> {
        let dir = self.root.join(CHARACTERS_DIR).join(id.to_string());
        let record: CharacterRecord = read_json(&dir.join(CHARACTER_FILE))?;

        let tag_ids = self.convert_ids(EntityKind::Tag, &parse_id_list(&record.tag_ids)?)?;
        let group_ids =
            self.convert_ids(EntityKind::CharacterGroup, &parse_id_list(&record.group_ids)?)?;
        let static_categories =
            self.convert_id_map(EntityKind::StaticCategory, record.static_categories)?;

        let avatar = self.character_binary(&dir, AVATAR_BASENAME, &record.avatar)?;
        let full_length_picture =
            self.character_binary(&dir, FULLBODY_BASENAME, &record.full_length_picture)?;

        Ok(ImportedCharacter {
            source_id: record.id,
            body: CharacterCreate {
                name: record.name,
                star: record.star,
                rating: record.rating,
                intro: record.intro,
                remark: record.remark,
                avatar,
                full_length_picture,
                tag_ids,
                group_ids,
                static_categories,
            },
        })
    }

    pub fn input_asset(&self, id: i32) -> TransferResult<ImportedAsset> {
        let assets_dir = self.root.join(ASSETS_DIR);
        let record: AssetRecord = read_json(&assets_dir.join(format!("{}.json", id)))?;

        let tag_ids = self.convert_ids(EntityKind::Tag, &parse_id_list(&record.tag_ids)?)?;
        let group_ids =
            self.convert_ids(EntityKind::AssetGroup, &parse_id_list(&record.group_ids)?)?;
        let character_ids =
            self.convert_ids(EntityKind::Character, &parse_id_list(&record.character_ids)?)?;
        let asset_set_ids =
            self.convert_ids(EntityKind::Asset, &parse_id_list(&record.asset_set_ids)?)?;

        let path = if !self.options.import_assets || record.path.is_empty() {
            BinarySource::stored(&record.path)
        } else {
            let payload_dir = assets_dir.join(id.to_string());
            if !payload_dir.is_dir() {
                return Err(TransferError::MissingBinary(payload_dir));
            }
            match record.asset_type {
                AssetType::File => {
                    let file = first_file(&payload_dir)?
                        .ok_or_else(|| TransferError::MissingBinary(payload_dir.clone()))?;
                    self.stage(&file)?
                }
                AssetType::Files | AssetType::Folder => self.stage(&payload_dir)?,
            }
        };

        Ok(ImportedAsset {
            source_id: record.id,
            body: AssetCreate {
                name: record.name,
                star: record.star,
                rating: record.rating,
                intro: record.intro,
                remark: record.remark,
                path,
                asset_type: record.asset_type,
                tag_ids,
                group_ids,
                character_ids,
                asset_set_ids,
            },
        })
    }

    /// Register the id a created row received; later remaps will see it.
    pub fn set_id(&self, kind: EntityKind, old_id: i32, new_id: i32) -> bool {
        self.ids.set_id(kind, old_id, new_id)
    }

    pub fn get_id(&self, kind: EntityKind, old_id: i32) -> Option<i32> {
        self.ids.get_id(kind, old_id)
    }

    /// Remap and re-join an id list. Misses are dropped unless strict.
    pub fn convert_ids(&self, kind: EntityKind, ids: &[i32]) -> TransferResult<String> {
        let mut converted = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(new_id) = self.remap(kind, id)? {
                converted.push(new_id);
            }
        }
        Ok(join_id_list(&converted))
    }

    pub fn convert_id_map<V>(
        &self,
        kind: EntityKind,
        map: BTreeMap<i32, V>,
    ) -> TransferResult<BTreeMap<i32, V>> {
        let mut converted = BTreeMap::new();
        for (id, value) in map {
            if let Some(new_id) = self.remap(kind, id)? {
                converted.insert(new_id, value);
            }
        }
        Ok(converted)
    }

    /// Remove a staged binary whose record was rejected by the store.
    pub fn discard(&self, source: &BinarySource) {
        if let BinarySource::Staged(name) = source {
            let path = self.staging_root.join(name);
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = removed {
                debug!("Could not discard staged binary {:?}: {}", path, e);
            }
        }
    }

    fn remap(&self, kind: EntityKind, id: i32) -> TransferResult<Option<i32>> {
        match self.ids.get_id(kind, id) {
            Some(new_id) => Ok(Some(new_id)),
            None if self.options.strict_remap => {
                Err(TransferError::UnresolvedReference { kind, id })
            }
            None => {
                warn!("No imported {} for exported id {}; dropping reference", kind, id);
                Ok(None)
            }
        }
    }

    fn phase_dir(&self, name: &str) -> TransferResult<PathBuf> {
        let dir = self.root.join(name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(TransferError::MissingDirectory(dir))
        }
    }

    /// `avatar.*` / `fullbody.*` next to the record; absence yields no binary.
    fn character_binary(
        &self,
        dir: &Path,
        basename: &str,
        recorded: &str,
    ) -> TransferResult<BinarySource> {
        if !self.options.import_assets {
            return Ok(BinarySource::stored(recorded));
        }
        if recorded.is_empty() {
            return Ok(BinarySource::None);
        }

        match find_by_stem(dir, basename)? {
            Some(file) => self.stage(&file),
            None => {
                warn!("{} missing in {:?}; importing without it", basename, dir);
                Ok(BinarySource::None)
            }
        }
    }

    /// Copy a file or directory into staging under a fresh name.
    fn stage(&self, source: &Path) -> TransferResult<BinarySource> {
        let name = if source.is_dir() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}{}", Uuid::new_v4(), dotted_extension(source))
        };
        let target = self.staging_root.join(&name);
        copy_recursive(source, &target).map_err(|e| TransferError::io(source, e))?;
        self.staged.fetch_add(1, Ordering::Relaxed);
        debug!("Staged {:?} as {}", source, name);
        Ok(BinarySource::Staged(name))
    }
}

/// Lazy, finite, single-pass sequence of imported records.
pub struct Records<'a, T> {
    importer: &'a Importer,
    phase: TransferPhase,
    ids: std::vec::IntoIter<i32>,
    read: fn(&Importer, i32) -> TransferResult<T>,
    failed: usize,
}

impl<'a, T> Records<'a, T> {
    fn new(
        importer: &'a Importer,
        phase: TransferPhase,
        ids: Vec<i32>,
        read: fn(&Importer, i32) -> TransferResult<T>,
    ) -> Self {
        Self {
            importer,
            phase,
            ids: ids.into_iter(),
            read,
            failed: 0,
        }
    }

    /// Records skipped so far because they could not be read
    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl<T> Iterator for Records<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        for id in self.ids.by_ref() {
            self.importer.reporter.record_started(self.phase, id);
            match (self.read)(self.importer, id) {
                Ok(record) => return Some(record),
                Err(err) => {
                    self.failed += 1;
                    self.importer.reporter.record_failed(self.phase, id, &err);
                }
            }
        }
        None
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> TransferResult<T> {
    if !path.is_file() {
        return Err(TransferError::MissingFile(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|e| TransferError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| TransferError::json(path, e))
}

fn list_ids(dir: &Path, id_of: impl Fn(&Path) -> Option<i32>) -> TransferResult<Vec<i32>> {
    let entries = fs::read_dir(dir).map_err(|e| TransferError::io(dir, e))?;
    let mut ids = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TransferError::io(dir, e))?.path();
        match id_of(&path) {
            Some(id) => ids.push(id),
            None => debug!("Ignoring {:?}", path),
        }
    }
    ids.sort_unstable();
    Ok(ids)
}

fn find_by_stem(dir: &Path, stem: &str) -> TransferResult<Option<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TransferError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| TransferError::io(dir, e))?.path();
        if path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(stem) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn first_file(dir: &Path) -> TransferResult<Option<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TransferError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TransferError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}
