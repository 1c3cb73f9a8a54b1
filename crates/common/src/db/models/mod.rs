//! SeaORM entity models
//!
//! Read-only projections of the tables the ingestion pipeline populates.

mod book;
mod passage;
mod scholar;

pub use book::{
    Entity as BookEntity,
    Model as Book,
    Column as BookColumn,
};

pub use passage::{
    Entity as PassageEntity,
    Model as Passage,
    Column as PassageColumn,
};

pub use scholar::{
    Entity as ScholarEntity,
    Model as Scholar,
    Column as ScholarColumn,
};
