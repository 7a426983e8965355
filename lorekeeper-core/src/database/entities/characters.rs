use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
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
    pub avatar: String, // filename under the static root, empty when unset
    pub full_length_picture: String,
    pub tag_ids: String,   // comma-joined tag ids
    pub group_ids: String, // comma-joined character group ids
    #[sea_orm(column_type = "Text", default_value = "{}")]
    pub static_categories: String, // JSON object: static category id -> value
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
