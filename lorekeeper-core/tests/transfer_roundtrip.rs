use std::fs;
use std::path::Path;

use anyhow::Result;
use lorekeeper::database::entities::{
    asset_groups, assets, categories, character_groups, characters, relationships, tags,
};
use lorekeeper::database::migrations::Migrator;
use lorekeeper::services::{
    AssetGroupService, AssetService, CategoryService, CharacterGroupService, CharacterService,
    RelationshipService, StorageLayout, TagService,
};
use lorekeeper::transfer::{
    ImportOptions, ProgressReporter, TransferEvent, TransferOperation, TransferPhase,
    TransferService, TransferSettings,
};
use lorekeeper_test_utils::{write_bytes, write_json, TempDir, TestDb};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

async fn migrated_db() -> Result<DatabaseConnection> {
    let db = TestDb::new_in_memory().connect().await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

fn settings(root: &Path, name: &str) -> TransferSettings {
    let storage = StorageLayout::new(
        root.join(name).join("static"),
        root.join(name).join("staging"),
    );
    TransferSettings::new(storage)
}

async fn drain(mut rx: UnboundedReceiver<TransferEvent>) -> Vec<TransferEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn messages(events: &[TransferEvent]) -> Vec<String> {
    events.iter().map(TransferEvent::message).collect()
}

fn character(id: i32, name: &str, tag_ids: &str, avatar: &str) -> characters::ActiveModel {
    characters::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        star: Set(false),
        rating: Set(0),
        intro: Set(String::new()),
        remark: Set(String::new()),
        avatar: Set(avatar.to_string()),
        full_length_picture: Set(String::new()),
        tag_ids: Set(tag_ids.to_string()),
        group_ids: Set(String::new()),
        static_categories: Set("{}".to_string()),
    }
}

async fn seed_species(db: &DatabaseConnection) -> Result<()> {
    categories::ActiveModel {
        id: Set(1),
        name: Set("species".to_string()),
        category_type: Set(1),
        sort_order: Set(0),
        intro: Set(String::new()),
    }
    .insert(db)
    .await?;
    tags::ActiveModel {
        id: Set(10),
        name: Set("elf".to_string()),
        category_id: Set(1),
        sort_order: Set(0),
    }
    .insert(db)
    .await?;
    Ok(())
}

#[tokio::test]
async fn export_then_import_rewires_tag_references() -> Result<()> {
    let tmp = TempDir::new()?;
    let out = tmp.child("backup");

    let source = migrated_db().await?;
    seed_species(&source).await?;
    asset_groups::ActiveModel {
        id: Set(20),
        name: Set("Maps".to_string()),
        star: Set(true),
        rating: Set(2),
    }
    .insert(&source)
    .await?;
    character_groups::ActiveModel {
        id: Set(40),
        name: Set("Party".to_string()),
        star: Set(false),
        rating: Set(4),
    }
    .insert(&source)
    .await?;
    relationships::ActiveModel {
        id: Set(50),
        name: Set("Rivals".to_string()),
        star: Set(true),
        rating: Set(3),
        intro: Set("Old grudge".to_string()),
    }
    .insert(&source)
    .await?;
    let mut aria = character(100, "Aria", "10", "");
    aria.group_ids = Set("40".to_string());
    aria.insert(&source).await?;
    assets::ActiveModel {
        id: Set(60),
        name: Set("Harbour map".to_string()),
        star: Set(false),
        rating: Set(1),
        intro: Set(String::new()),
        remark: Set(String::new()),
        path: Set(String::new()),
        asset_type: Set("file".to_string()),
        tag_ids: Set("10".to_string()),
        group_ids: Set("20".to_string()),
        character_ids: Set("100".to_string()),
        asset_set_ids: Set(String::new()),
    }
    .insert(&source)
    .await?;

    let exporter = TransferService::new(source.clone(), settings(tmp.path(), "source"));
    let summary = exporter
        .export(&out, ProgressReporter::silent(TransferOperation::Export))
        .await?;
    assert_eq!(summary.characters.succeeded, 1);
    assert_eq!(summary.assets.succeeded, 1);

    let manifest: Value = serde_json::from_str(&fs::read_to_string(out.join("context.json"))?)?;
    assert_eq!(
        manifest["categories"],
        json!([{
            "id": 1, "name": "species", "type": 1, "order": 0, "intro": "",
            "tags": [{"id": 10, "name": "elf", "categoryId": 1, "order": 0}]
        }])
    );
    assert_eq!(
        manifest["assetGroups"],
        json!([{"id": 20, "name": "Maps", "star": true, "rating": 2}])
    );
    assert_eq!(manifest["characterGroups"][0]["id"], 40);

    let char_dir = out.join("characters/100");
    let record: Value = serde_json::from_str(&fs::read_to_string(char_dir.join("character.json"))?)?;
    assert_eq!(record["tagIds"], "10");
    let entries = fs::read_dir(&char_dir)?.collect::<std::io::Result<Vec<_>>>()?;
    assert_eq!(entries.len(), 1, "only character.json is written without an avatar");

    let target = migrated_db().await?;
    let importer = TransferService::new(target.clone(), settings(tmp.path(), "target"));
    let summary = importer
        .import(&out, ProgressReporter::silent(TransferOperation::Import))
        .await?;
    assert_eq!(summary.categories, 1);
    assert_eq!(summary.tags, 1);
    assert_eq!(summary.characters.succeeded, 1);
    assert_eq!(summary.assets.succeeded, 1);

    let categories = CategoryService::new(target.clone()).find_all().await?;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "species");
    assert_eq!(categories[0].category_type, 1);

    let tags = TagService::new(target.clone()).find_all().await?;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].category_id, categories[0].id);

    let storage = importer.settings().storage.clone();
    let characters = CharacterService::new(target.clone(), storage.clone()).find_all().await?;
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0].name, "Aria");
    assert_eq!(characters[0].tag_ids, tags[0].id.to_string());
    assert_ne!(characters[0].tag_ids, "10");

    let asset_groups = AssetGroupService::new(target.clone()).find_all().await?;
    assert_eq!(asset_groups.len(), 1);
    assert_eq!(
        (asset_groups[0].name.as_str(), asset_groups[0].star, asset_groups[0].rating),
        ("Maps", true, 2)
    );
    let character_groups = CharacterGroupService::new(target.clone()).find_all().await?;
    assert_eq!(character_groups.len(), 1);
    assert_eq!(
        (
            character_groups[0].name.as_str(),
            character_groups[0].star,
            character_groups[0].rating
        ),
        ("Party", false, 4)
    );
    let relationships = RelationshipService::new(target.clone()).find_all().await?;
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].name, "Rivals");
    assert!(relationships[0].star);
    assert_eq!(relationships[0].rating, 3);
    assert_eq!(relationships[0].intro, "Old grudge");

    assert_eq!(characters[0].group_ids, character_groups[0].id.to_string());
    assert_ne!(characters[0].group_ids, "40");

    let assets = AssetService::new(target.clone(), storage).find_all().await?;
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].name, "Harbour map");
    assert_eq!(assets[0].tag_ids, tags[0].id.to_string());
    assert_eq!(assets[0].group_ids, asset_groups[0].id.to_string());
    assert_ne!(assets[0].group_ids, "20");
    assert_eq!(assets[0].character_ids, characters[0].id.to_string());
    assert_ne!(assets[0].character_ids, "100");
    Ok(())
}

#[tokio::test]
async fn re_export_drops_rows_deleted_since_the_last_run() -> Result<()> {
    let tmp = TempDir::new()?;
    let out = tmp.child("backup");

    let source = migrated_db().await?;
    character(100, "Aria", "", "").insert(&source).await?;
    character(101, "Bran", "", "").insert(&source).await?;
    let exporter = TransferService::new(source.clone(), settings(tmp.path(), "source"));
    exporter
        .export(&out, ProgressReporter::silent(TransferOperation::Export))
        .await?;
    assert!(out.join("characters/101").exists());

    characters::Entity::delete_by_id(101).exec(&source).await?;
    exporter
        .export(&out, ProgressReporter::silent(TransferOperation::Export))
        .await?;
    let on_disk: Vec<_> = fs::read_dir(out.join("characters"))?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<String>>>()?;
    assert_eq!(on_disk, vec!["100".to_string()]);
    assert!(out.join("context.json").exists());

    let target = migrated_db().await?;
    let target_settings = settings(tmp.path(), "target");
    let storage = target_settings.storage.clone();
    let summary = TransferService::new(target.clone(), target_settings)
        .import(&out, ProgressReporter::silent(TransferOperation::Import))
        .await?;
    assert_eq!(summary.characters.succeeded, 1);

    let characters = CharacterService::new(target, storage).find_all().await?;
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0].name, "Aria");
    Ok(())
}

#[tokio::test]
async fn binaries_travel_with_their_records() -> Result<()> {
    let tmp = TempDir::new()?;
    let out = tmp.child("backup");
    let source_settings = settings(tmp.path(), "source");
    let static_root = source_settings.storage.static_root().to_path_buf();
    write_bytes(&static_root, "a1b2.png", b"portrait")?;
    write_bytes(&static_root, "sheets/one.txt", b"one")?;
    write_bytes(&static_root, "sheets/two.txt", b"two")?;

    let source = migrated_db().await?;
    character(1, "Aria", "", "a1b2.png").insert(&source).await?;
    assets::ActiveModel {
        id: Set(5),
        name: Set("Sheets".to_string()),
        star: Set(true),
        rating: Set(4),
        intro: Set(String::new()),
        remark: Set(String::new()),
        path: Set("sheets".to_string()),
        asset_type: Set("files".to_string()),
        tag_ids: Set(String::new()),
        group_ids: Set(String::new()),
        character_ids: Set("1".to_string()),
        asset_set_ids: Set(String::new()),
    }
    .insert(&source)
    .await?;

    TransferService::new(source, source_settings)
        .export(&out, ProgressReporter::silent(TransferOperation::Export))
        .await?;
    assert_eq!(fs::read(out.join("characters/1/avatar.png"))?, b"portrait");
    assert_eq!(fs::read(out.join("assets/5/two.txt"))?, b"two");

    let target = migrated_db().await?;
    let target_settings = settings(tmp.path(), "target");
    let storage = target_settings.storage.clone();
    TransferService::new(target.clone(), target_settings)
        .import(&out, ProgressReporter::silent(TransferOperation::Import))
        .await?;

    let characters = CharacterService::new(target.clone(), storage.clone())
        .find_all()
        .await?;
    let avatar = &characters[0].avatar;
    assert!(avatar.ends_with(".png") && avatar != "a1b2.png");
    assert_eq!(fs::read(storage.static_path(avatar))?, b"portrait");

    let assets = AssetService::new(target, storage.clone()).find_all().await?;
    assert_eq!(assets[0].asset_type, "files");
    assert_eq!(assets[0].character_ids, characters[0].id.to_string());
    assert_eq!(
        fs::read(storage.static_path(&assets[0].path).join("one.txt"))?,
        b"one"
    );
    Ok(())
}

#[tokio::test]
async fn context_finishes_before_any_record_starts() -> Result<()> {
    let tmp = TempDir::new()?;
    let out = tmp.child("backup");
    let source = migrated_db().await?;
    seed_species(&source).await?;
    character(100, "Aria", "10", "").insert(&source).await?;
    character(101, "Bran", "", "").insert(&source).await?;

    let (reporter, rx) = ProgressReporter::channel(TransferOperation::Export);
    TransferService::new(source, settings(tmp.path(), "source"))
        .export(&out, reporter)
        .await?;
    let exported = messages(&drain(rx).await);

    let (reporter, rx) = ProgressReporter::channel(TransferOperation::Import);
    TransferService::new(migrated_db().await?, settings(tmp.path(), "target"))
        .import(&out, reporter)
        .await?;
    let imported = messages(&drain(rx).await);

    for run in [&exported, &imported] {
        let context_done = run.iter().position(|m| m == "finished context").unwrap();
        let first_record = run
            .iter()
            .position(|m| m.starts_with("start character "))
            .unwrap();
        assert!(context_done < first_record, "{:?}", run);
        assert_eq!(run.first().map(String::as_str), Some("start context"));
        assert_eq!(run.last().map(String::as_str), Some("finished"));
    }
    assert!(exported.contains(&"start character 100".to_string()));
    assert!(exported.contains(&"finished character 101".to_string()));
    Ok(())
}

#[tokio::test]
async fn one_corrupt_asset_does_not_stop_the_phase() -> Result<()> {
    let tmp = TempDir::new()?;
    let dir = tmp.child("hand-made");
    write_json(&dir, "context.json", &json!({"categories": []}))?;
    fs::create_dir_all(dir.join("characters"))?;
    for id in 1..=3 {
        write_json(
            &dir,
            &format!("assets/{}.json", id),
            &json!({"id": id, "name": format!("asset {}", id), "assetType": "file"}),
        )?;
    }
    write_bytes(&dir, "assets/2.json", b"{\"id\": 2, \"name\":")?;

    let db = migrated_db().await?;
    let (reporter, rx) = ProgressReporter::channel(TransferOperation::Import);
    let summary = TransferService::new(db.clone(), settings(tmp.path(), "target"))
        .import(&dir, reporter)
        .await?;
    let events = drain(rx).await;

    assert_eq!(summary.assets.succeeded, 2);
    assert_eq!(summary.assets.failed, 1);
    let failures: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        TransferEvent::RecordFailed { phase: TransferPhase::Assets, id: 2, .. }
    ));
    assert!(events.last().is_some_and(TransferEvent::is_run_finished));

    let storage = StorageLayout::new(tmp.child("static"), tmp.child("staging"));
    assert_eq!(AssetService::new(db, storage).find_all().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn rejected_records_are_reported_and_skipped() -> Result<()> {
    let tmp = TempDir::new()?;
    let dir = tmp.child("hand-made");
    write_json(&dir, "context.json", &json!({}))?;
    write_json(&dir, "characters/1/character.json", &json!({"id": 1, "name": "   "}))?;
    write_json(&dir, "characters/2/character.json", &json!({"id": 2, "name": "Cora"}))?;
    fs::create_dir_all(dir.join("assets"))?;

    let (reporter, rx) = ProgressReporter::channel(TransferOperation::Import);
    let summary = TransferService::new(migrated_db().await?, settings(tmp.path(), "target"))
        .import(&dir, reporter)
        .await?;
    let events = drain(rx).await;

    assert_eq!(summary.characters.succeeded, 1);
    assert_eq!(summary.characters.failed, 1);
    let error = events.iter().find(|e| e.is_error()).unwrap();
    assert_eq!(error.operation().error_event(), "import_error");
    assert!(error.message().contains("name cannot be empty"), "{}", error.message());
    Ok(())
}

#[tokio::test]
async fn unresolved_references_follow_the_remap_policy() -> Result<()> {
    let tmp = TempDir::new()?;
    let dir = tmp.child("hand-made");
    write_json(&dir, "context.json", &json!({}))?;
    write_json(
        &dir,
        "characters/7/character.json",
        &json!({"id": 7, "name": "Orphan", "tagIds": "99"}),
    )?;
    fs::create_dir_all(dir.join("assets"))?;

    let lenient = migrated_db().await?;
    let summary = TransferService::new(lenient.clone(), settings(tmp.path(), "lenient"))
        .import(&dir, ProgressReporter::silent(TransferOperation::Import))
        .await?;
    assert_eq!(summary.characters.succeeded, 1);
    let storage = StorageLayout::new(tmp.child("s"), tmp.child("t"));
    let created = CharacterService::new(lenient, storage).find_all().await?;
    assert_eq!(created[0].tag_ids, "");

    let mut strict_settings = settings(tmp.path(), "strict");
    strict_settings.import = ImportOptions {
        import_assets: true,
        strict_remap: true,
    };
    let summary = TransferService::new(migrated_db().await?, strict_settings)
        .import(&dir, ProgressReporter::silent(TransferOperation::Import))
        .await?;
    assert_eq!(summary.characters.succeeded, 0);
    assert_eq!(summary.characters.failed, 1);
    Ok(())
}

#[tokio::test]
async fn missing_structure_aborts_the_run() -> Result<()> {
    let tmp = TempDir::new()?;
    let db = migrated_db().await?;
    let service = TransferService::new(db, settings(tmp.path(), "target"));

    let (reporter, rx) = ProgressReporter::channel(TransferOperation::Import);
    let err = service
        .import(&tmp.child("does-not-exist"), reporter)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(!drain(rx).await.iter().any(TransferEvent::is_run_finished));

    let dir = tmp.child("no-manifest");
    fs::create_dir_all(dir.join("characters"))?;
    let err = service
        .import(&dir, ProgressReporter::silent(TransferOperation::Import))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_MANIFEST");
    assert!(err.is_fatal());
    Ok(())
}
