use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub star: bool,
    pub rating: i32,
    #[sea_orm(column_type = "Text", default_value = "")]
    pub intro: String,
    #[sea_orm(column_type = "Text", default_value = "")]
    pub remark: String,
    pub path: String,       // relative to the static root
    pub asset_type: String, // file | files | folder
    pub tag_ids: String,
    pub group_ids: String,
    pub character_ids: String,
    pub asset_set_ids: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// How an asset's binary payload is laid out on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// A single file
    #[default]
    File,
    /// A directory holding several files
    Files,
    /// A directory kept as-is
    Folder,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::File => "file",
            AssetType::Files => "files",
            AssetType::Folder => "folder",
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "file" => Ok(AssetType::File),
            "files" => Ok(AssetType::Files),
            "folder" => Ok(AssetType::Folder),
            other => Err(format!("Unknown asset type '{}'", other)),
        }
    }
}
