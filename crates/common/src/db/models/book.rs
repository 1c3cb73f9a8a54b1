//! Book entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub title_arabic: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub title_french: Option<String>,

    pub scholar_id: i64,

    /// Identifier of the book inside the source archive it was scraped from
    pub source_archive_id: Option<i64>,

    pub volume_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scholar::Entity",
        from = "Column::ScholarId",
        to = "super::scholar::Column::Id"
    )]
    Scholar,

    #[sea_orm(has_many = "super::passage::Entity")]
    Passages,
}

impl Related<super::scholar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scholar.def()
    }
}

impl Related<super::passage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
