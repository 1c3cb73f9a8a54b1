//! Passage entity
//!
//! `text_arabic` is verbatim source text. Nothing downstream of ingestion may
//! alter it; every citation carries it byte-for-byte.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub book_id: i64,

    pub scholar_id: i64,

    pub volume: Option<i32>,

    pub page_number: Option<i32>,

    /// Verbatim Arabic source text
    #[sea_orm(column_type = "Text")]
    pub text_arabic: String,

    /// French translation/summary, used by the French full-text match path
    #[sea_orm(column_type = "Text", nullable)]
    pub text_french: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub chapter_hint: Option<String>,

    /// School of jurisprudence (denormalized from the scholar for filtering)
    #[sea_orm(column_type = "Text")]
    pub tradition: String,

    /// Topic tag from the fixed taxonomy
    #[sea_orm(column_type = "Text")]
    pub domain: String,

    /// Stable external identifier; re-ingestion overwrites by matching it
    #[sea_orm(column_type = "Text")]
    pub source_ref: String,

    /// Content hash used by ingestion to detect no-op re-imports
    #[sea_orm(column_type = "Text")]
    pub content_hash: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id"
    )]
    Book,

    #[sea_orm(
        belongs_to = "super::scholar::Entity",
        from = "Column::ScholarId",
        to = "super::scholar::Column::Id"
    )]
    Scholar,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::scholar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scholar.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
