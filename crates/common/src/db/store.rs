//! Passage store - the queryable repository of source passages
//!
//! The retriever only ever talks to the `PassageStore` trait, so tests can
//! substitute an in-memory double and the engine never owns a global client.
//! `PgPassageStore` is the Postgres implementation over the SeaORM pool.
//!
//! Every query is built with positional placeholders; no value reaches the
//! SQL text by interpolation. Enum-backed filters render from the fixed
//! server-side taxonomy only.

use crate::db::DbPool;
use crate::engine::taxonomy::{Domain, Tradition};
use crate::errors::Result;
use async_trait::async_trait;
use sea_orm::{DbBackend, Statement, Value};
use serde::{Deserialize, Serialize};

/// Passages shorter than this are too thin to stand as an independent opinion
const MIN_PASSAGE_CHARS: usize = 100;

/// Language-dependent match strategy.
///
/// Arabic goes through case-insensitive substring matching because the
/// Postgres tsvector tokenizer does not handle Arabic Unicode; French goes
/// through stemmed full-text search over the translated field. The asymmetry
/// is deliberate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Per-keyword ILIKE over the Arabic text and the chapter hint
    ArabicSubstring { keywords: Vec<String> },

    /// Prefix-stemmed tsquery disjunction over the French field
    FrenchFullText { keywords: Vec<String> },
}

impl MatchStrategy {
    pub fn keywords(&self) -> &[String] {
        match self {
            MatchStrategy::ArabicSubstring { keywords } => keywords,
            MatchStrategy::FrenchFullText { keywords } => keywords,
        }
    }
}

/// Hard filters; non-matching passages are excluded entirely, never just
/// ranked lower
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub tradition: Option<Tradition>,
    pub domain: Option<Domain>,
}

/// Flat projection of a passage joined with its scholar and book metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRow {
    pub passage_id: i64,
    pub text_arabic: String,
    pub text_french: Option<String>,
    pub chapter_hint: Option<String>,
    pub volume: Option<i32>,
    pub page_number: Option<i32>,
    pub tradition: String,
    pub domain: String,
    pub source_ref: String,
    pub scholar_name_arabic: String,
    pub scholar_name_french: Option<String>,
    pub scholar_era: String,
    pub book_title_arabic: String,
    pub book_title_french: Option<String>,
}

/// Queryable repository of passages
#[async_trait]
pub trait PassageStore: Send + Sync {
    /// Fetch passages matching the strategy and filters, ordered by passage
    /// id ascending, at most `limit` rows
    async fn search(
        &self,
        strategy: &MatchStrategy,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<PassageRow>>;
}

/// Postgres-backed passage store
#[derive(Clone)]
pub struct PgPassageStore {
    pool: DbPool,
}

impl PgPassageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PassageStore for PgPassageStore {
    async fn search(
        &self,
        strategy: &MatchStrategy,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<PassageRow>> {
        use sea_orm::ConnectionTrait;

        let (sql, values) = build_search_sql(strategy, filters, limit);
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, &sql, values);

        let rows = self
            .pool
            .read()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(PassageRow {
                    passage_id: row.try_get_by_index::<i64>(0).ok()?,
                    text_arabic: row.try_get_by_index::<String>(1).ok()?,
                    text_french: row.try_get_by_index::<Option<String>>(2).ok()?,
                    chapter_hint: row.try_get_by_index::<Option<String>>(3).ok()?,
                    volume: row.try_get_by_index::<Option<i32>>(4).ok()?,
                    page_number: row.try_get_by_index::<Option<i32>>(5).ok()?,
                    tradition: row.try_get_by_index::<String>(6).ok()?,
                    domain: row.try_get_by_index::<String>(7).ok()?,
                    source_ref: row.try_get_by_index::<String>(8).ok()?,
                    scholar_name_arabic: row.try_get_by_index::<String>(9).ok()?,
                    scholar_name_french: row.try_get_by_index::<Option<String>>(10).ok()?,
                    scholar_era: row.try_get_by_index::<String>(11).ok()?,
                    book_title_arabic: row.try_get_by_index::<String>(12).ok()?,
                    book_title_french: row.try_get_by_index::<Option<String>>(13).ok()?,
                })
            })
            .collect();

        Ok(rows)
    }
}

/// Build the search statement with positional placeholders.
///
/// Factored out of the store so the SQL shape is testable without a database.
fn build_search_sql(
    strategy: &MatchStrategy,
    filters: &SearchFilters,
    limit: usize,
) -> (String, Vec<Value>) {
    let mut values: Vec<Value> = Vec::new();

    let match_clause = match strategy {
        MatchStrategy::ArabicSubstring { keywords } => {
            let conditions: Vec<String> = keywords
                .iter()
                .map(|kw| {
                    values.push(format!("%{}%", kw).into());
                    let p = values.len();
                    format!(
                        "(p.text_arabic ILIKE ${p} OR COALESCE(p.chapter_hint,'') ILIKE ${p})"
                    )
                })
                .collect();
            format!("({})", conditions.join(" OR "))
        }
        MatchStrategy::FrenchFullText { keywords } => {
            let ts_query = keywords
                .iter()
                .map(|kw| format!("{}:*", kw))
                .collect::<Vec<_>>()
                .join(" | ");
            values.push(ts_query.into());
            format!(
                "to_tsvector('french', COALESCE(p.text_french,'') || ' ' || COALESCE(p.chapter_hint,'')) \
                 @@ to_tsquery('french', ${})",
                values.len()
            )
        }
    };

    let mut where_clauses = vec![match_clause];

    if let Some(tradition) = filters.tradition {
        values.push(tradition.as_str().into());
        where_clauses.push(format!("p.tradition = ${}", values.len()));
    }

    if let Some(domain) = filters.domain {
        values.push(domain.as_str().into());
        where_clauses.push(format!("p.domain = ${}", values.len()));
    }

    where_clauses.push(format!("length(p.text_arabic) > {}", MIN_PASSAGE_CHARS));

    values.push((limit as i64).into());
    let limit_param = values.len();

    let sql = format!(
        r#"
        SELECT
            p.id,
            p.text_arabic,
            p.text_french,
            p.chapter_hint,
            p.volume,
            p.page_number,
            p.tradition,
            p.domain,
            p.source_ref,
            s.name_arabic  AS scholar_name_arabic,
            s.name_french  AS scholar_name_french,
            s.era          AS scholar_era,
            b.title_arabic AS book_title_arabic,
            b.title_french AS book_title_french
        FROM passages p
        JOIN scholars s ON p.scholar_id = s.id
        JOIN books    b ON p.book_id    = b.id
        WHERE {}
        ORDER BY p.id ASC
        LIMIT ${}
        "#,
        where_clauses.join("\n          AND "),
        limit_param
    );

    (sql, values)
}
