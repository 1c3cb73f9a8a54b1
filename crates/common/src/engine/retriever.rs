//! Retriever - language-aware matching, canonical-author ranking, and
//! near-duplicate collapsing
//!
//! Ranking happens here in plain Rust rather than inside the SQL so the
//! ordering rules stay declarative and testable against an in-memory store.
//! A data-access fault degrades to an empty result set; citing nothing is
//! safer than citing wrongly.

use crate::db::{MatchStrategy, PassageRow, PassageStore, SearchFilters};
use crate::engine::normalizer::{self, Lang};
use crate::engine::taxonomy::{Domain, Tradition};
use crate::metrics;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Additive score boost for passages by a canonical author of the requested
/// school
pub const CANONICAL_BOOST: f64 = 0.3;

/// Extra rows fetched beyond the requested limit so deduplication cannot
/// starve the final result count
pub const OVERFETCH_MARGIN: usize = 4;

/// Request-scoped retrieval parameters
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub question: String,
    pub tradition: Option<Tradition>,
    pub domain: Option<Domain>,
    pub limit: usize,
    pub language: Option<Lang>,
}

/// A passage with its relevance score and the keywords that matched it
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub row: PassageRow,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub canonical: bool,
}

/// Retrieval pipeline over an injected passage store
pub struct Retriever {
    store: Arc<dyn PassageStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn PassageStore>) -> Self {
        Self { store }
    }

    /// Retrieve ranked candidates for a query.
    ///
    /// Returns an empty list when no keywords survive normalization and when
    /// the store faults; neither case is an error for the caller.
    pub async fn retrieve(&self, query: &RetrievalQuery) -> Vec<RankedCandidate> {
        let normalized = normalizer::normalize(&query.question);
        if normalized.keywords.is_empty() {
            return Vec::new();
        }

        // The match strategy follows the script of the extracted keywords,
        // not the request-level language hint: tsvector cannot tokenize
        // Arabic, and French stemming does nothing useful for Arabic words.
        let strategy = if normalizer::is_arabic(&normalized.keywords.join("")) {
            MatchStrategy::ArabicSubstring { keywords: normalized.keywords.clone() }
        } else {
            MatchStrategy::FrenchFullText {
                keywords: normalized.keywords.iter().map(|k| k.to_lowercase()).collect(),
            }
        };

        let filters = SearchFilters {
            tradition: query.tradition,
            domain: query.domain,
        };

        let fetch_limit = query.limit + OVERFETCH_MARGIN;
        let start = Instant::now();

        let rows = match self.store.search(&strategy, &filters, fetch_limit).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Passage store fault, degrading to empty result set");
                metrics::record_retrieval_fault();
                return Vec::new();
            }
        };

        metrics::record_retrieval(start.elapsed().as_secs_f64());

        let mut candidates: Vec<RankedCandidate> = rows
            .into_iter()
            .map(|row| rank_candidate(row, &normalized.keywords, query.tradition))
            .collect();

        // Canonical authors form a strict partition ahead of everyone else;
        // passage id ascending keeps ordering deterministic within each side.
        candidates.sort_by_key(|c| (!c.canonical, c.row.passage_id));
        candidates
    }
}

fn rank_candidate(
    row: PassageRow,
    keywords: &[String],
    tradition: Option<Tradition>,
) -> RankedCandidate {
    let haystack = format!(
        "{} {} {}",
        row.text_arabic,
        row.chapter_hint.as_deref().unwrap_or(""),
        row.text_french.as_deref().unwrap_or(""),
    )
    .to_lowercase();

    let matched_keywords = keywords
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .cloned()
        .collect();

    let canonical = tradition
        .map(|t| {
            t.canonical_scholars()
                .iter()
                .any(|name| row.scholar_name_arabic.contains(name))
        })
        .unwrap_or(false);

    let score = if canonical { 1.0 + CANONICAL_BOOST } else { 1.0 };

    RankedCandidate {
        row,
        score,
        matched_keywords,
        canonical,
    }
}

/// Collapse near-duplicate passages sharing (book title, volume, page).
///
/// First occurrence in ranked order wins; stable and idempotent.
pub fn dedupe(candidates: Vec<RankedCandidate>) -> Vec<RankedCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            seen.insert((
                c.row.book_title_arabic.clone(),
                c.row.volume,
                c.row.page_number,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStore {
        rows: Vec<PassageRow>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeStore {
        fn with_rows(rows: Vec<PassageRow>) -> Self {
            Self { rows, calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { rows: Vec::new(), calls: AtomicUsize::new(0), fail: true }
        }
    }

    #[async_trait]
    impl PassageStore for FakeStore {
        async fn search(
            &self,
            _strategy: &MatchStrategy,
            _filters: &SearchFilters,
            limit: usize,
        ) -> Result<Vec<PassageRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::DatabaseConnection {
                    message: "store unavailable".into(),
                });
            }
            Ok(self.rows.iter().take(limit).cloned().collect())
        }
    }

    fn row(id: i64, scholar: &str, book: &str, volume: Option<i32>, page: Option<i32>) -> PassageRow {
        PassageRow {
            passage_id: id,
            text_arabic: format!("نص الفتوى رقم {} في صلاة الجماعة وأحكامها المفصلة", id),
            chapter_hint: Some("باب صلاة الجماعة".to_string()),
            volume,
            page_number: page,
            tradition: "maliki".to_string(),
            domain: "priere-salat".to_string(),
            source_ref: format!("shamela:{}", id),
            scholar_name_arabic: scholar.to_string(),
            scholar_name_french: None,
            scholar_era: "classical".to_string(),
            book_title_arabic: book.to_string(),
            book_title_french: None,
            text_french: None,
        }
    }

    fn query(question: &str, tradition: Option<Tradition>) -> RetrievalQuery {
        RetrievalQuery {
            question: question.to_string(),
            tradition,
            domain: None,
            limit: 6,
            language: None,
        }
    }

    #[tokio::test]
    async fn test_zero_keywords_skips_the_store() {
        let store = Arc::new(FakeStore::with_rows(vec![row(1, "الخرشي", "شرح مختصر خليل", None, None)]));
        let retriever = Retriever::new(store.clone());

        let result = retriever.retrieve(&query("ما هل في", Some(Tradition::Maliki))).await;

        assert!(result.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_fault_degrades_to_empty() {
        let store = Arc::new(FakeStore::failing());
        let retriever = Retriever::new(store.clone());

        let result = retriever.retrieve(&query("ما حكم صلاة الجماعة؟", None)).await;

        assert!(result.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_canonical_partition_sorts_strictly_first() {
        // Canonical scholar with a *higher* passage id still sorts first
        let store = Arc::new(FakeStore::with_rows(vec![
            row(3, "ابن رشد", "بداية المجتهد", Some(1), Some(10)),
            row(7, "الدردير", "الشرح الكبير", Some(2), Some(44)),
            row(9, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(12, "القرافي", "الذخيرة", Some(3), Some(80)),
        ]));
        let retriever = Retriever::new(store);

        let result = retriever
            .retrieve(&query("ما حكم صلاة الجماعة؟", Some(Tradition::Maliki)))
            .await;

        let ids: Vec<i64> = result.iter().map(|c| c.row.passage_id).collect();
        assert_eq!(ids, vec![7, 9, 3, 12]);
        assert!(result[0].canonical && result[1].canonical);
        assert!(!result[2].canonical && !result[3].canonical);
        assert!((result[0].score - (1.0 + CANONICAL_BOOST)).abs() < f64::EPSILON);
        assert!((result[2].score - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_no_tradition_filter_means_no_partition() {
        let store = Arc::new(FakeStore::with_rows(vec![
            row(5, "الخرشي", "شرح مختصر خليل", None, None),
            row(2, "ابن رشد", "بداية المجتهد", None, None),
        ]));
        let retriever = Retriever::new(store);

        let result = retriever.retrieve(&query("ما حكم صلاة الجماعة؟", None)).await;

        let ids: Vec<i64> = result.iter().map(|c| c.row.passage_id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert!(result.iter().all(|c| !c.canonical));
    }

    #[tokio::test]
    async fn test_matched_keywords_recorded() {
        let store = Arc::new(FakeStore::with_rows(vec![row(1, "الخرشي", "شرح مختصر خليل", None, None)]));
        let retriever = Retriever::new(store);

        let result = retriever.retrieve(&query("ما حكم صلاة الجماعة؟", None)).await;

        assert!(result[0].matched_keywords.contains(&"صلاة".to_string()));
    }

    #[test]
    fn test_dedupe_is_order_preserving_and_idempotent() {
        let candidates = vec![
            rank_candidate(row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)), &[], None),
            rank_candidate(row(2, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)), &[], None),
            rank_candidate(row(3, "الدردير", "الشرح الكبير", Some(1), Some(12)), &[], None),
        ];

        let once = dedupe(candidates);
        let ids: Vec<i64> = once.iter().map(|c| c.row.passage_id).collect();
        assert_eq!(ids, vec![1, 3]);

        let twice = dedupe(once.clone());
        let ids_twice: Vec<i64> = twice.iter().map(|c| c.row.passage_id).collect();
        assert_eq!(ids, ids_twice);
    }

    #[test]
    fn test_dedupe_keeps_distinct_volumes() {
        let candidates = vec![
            rank_candidate(row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)), &[], None),
            rank_candidate(row(2, "الخرشي", "شرح مختصر خليل", Some(2), Some(12)), &[], None),
        ];

        assert_eq!(dedupe(candidates).len(), 2);
    }
}
