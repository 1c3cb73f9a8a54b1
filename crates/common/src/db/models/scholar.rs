//! Scholar entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scholars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub name_arabic: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub name_french: Option<String>,

    /// School of jurisprudence (hanafi, maliki, shafii, hanbali, salafi)
    #[sea_orm(column_type = "Text")]
    pub tradition: String,

    /// classical | contemporary
    #[sea_orm(column_type = "Text")]
    pub era: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book::Entity")]
    Books,

    #[sea_orm(has_many = "super::passage::Entity")]
    Passages,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Books.def()
    }
}

impl Related<super::passage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
