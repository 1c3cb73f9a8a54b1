//! Citation assembly - immutable, fully-attributed projections of passages
//!
//! The Arabic text is copied verbatim; no truncation or normalization ever
//! happens here. Volume and page stay `Option` so absence is explicit rather
//! than an empty string the display layer would have to guess about.

use crate::db::PassageRow;
use crate::engine::retriever::RankedCandidate;
use crate::engine::taxonomy::Tradition;
use serde::{Deserialize, Serialize};

/// A read-only, fully-attributed citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub passage_id: i64,

    /// Verbatim Arabic source text, byte-identical to the stored passage
    pub text_arabic: String,

    pub chapter_hint: Option<String>,

    /// Composed scholar attribution, e.g. "البهوتي — al-Buhuti"
    pub scholar: String,

    /// Composed book attribution, e.g. "كشاف القناع (Kashshaf al-Qina')"
    pub book: String,

    pub volume: Option<i32>,

    pub page: Option<i32>,

    /// Display label of the school
    pub tradition: String,

    pub era: String,

    /// Stable external identifier of the source passage
    pub source_ref: String,
}

impl Citation {
    /// Project a ranked candidate into a citation
    pub fn from_candidate(candidate: &RankedCandidate) -> Self {
        let row = &candidate.row;

        Self {
            passage_id: row.passage_id,
            text_arabic: row.text_arabic.clone(),
            chapter_hint: row.chapter_hint.clone(),
            scholar: scholar_attribution(row),
            book: book_attribution(row),
            volume: row.volume,
            page: row.page_number,
            tradition: Tradition::label_for(&row.tradition),
            era: row.scholar_era.clone(),
            source_ref: row.source_ref.clone(),
        }
    }
}

fn scholar_attribution(row: &PassageRow) -> String {
    match &row.scholar_name_french {
        Some(fr) => format!("{} — {}", row.scholar_name_arabic, fr),
        None => row.scholar_name_arabic.clone(),
    }
}

fn book_attribution(row: &PassageRow) -> String {
    match &row.book_title_french {
        Some(fr) => format!("{} ({})", row.book_title_arabic, fr),
        None => row.book_title_arabic.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(row: PassageRow) -> RankedCandidate {
        RankedCandidate {
            row,
            score: 1.0,
            matched_keywords: Vec::new(),
            canonical: false,
        }
    }

    fn base_row() -> PassageRow {
        PassageRow {
            passage_id: 42,
            text_arabic: "قال المصنف رحمه الله: وتجب صلاة الجماعة على الرجال".to_string(),
            text_french: None,
            chapter_hint: Some("باب صلاة الجماعة".to_string()),
            volume: Some(2),
            page_number: Some(133),
            tradition: "hanbali".to_string(),
            domain: "priere-salat".to_string(),
            source_ref: "shamela:21620:2:133".to_string(),
            scholar_name_arabic: "البهوتي".to_string(),
            scholar_name_french: Some("al-Buhuti".to_string()),
            scholar_era: "classical".to_string(),
            book_title_arabic: "كشاف القناع".to_string(),
            book_title_french: None,
        }
    }

    #[test]
    fn test_arabic_text_is_byte_identical() {
        let row = base_row();
        let source_bytes = row.text_arabic.as_bytes().to_vec();

        let citation = Citation::from_candidate(&candidate(row));

        assert_eq!(citation.text_arabic.as_bytes(), source_bytes.as_slice());
    }

    #[test]
    fn test_scholar_and_book_attribution() {
        let citation = Citation::from_candidate(&candidate(base_row()));

        assert_eq!(citation.scholar, "البهوتي — al-Buhuti");
        assert_eq!(citation.book, "كشاف القناع");
        assert_eq!(citation.tradition, "Hanbali classique (إمام أحمد بن حنبل)");
    }

    #[test]
    fn test_missing_volume_and_page_stay_absent() {
        let mut row = base_row();
        row.volume = None;
        row.page_number = None;

        let citation = Citation::from_candidate(&candidate(row));

        assert_eq!(citation.volume, None);
        assert_eq!(citation.page, None);

        let json = serde_json::to_value(&citation).unwrap();
        assert!(json["volume"].is_null());
        assert!(json["page"].is_null());
    }

    #[test]
    fn test_unknown_tradition_label_falls_back_to_raw() {
        let mut row = base_row();
        row.tradition = "ibadi".to_string();

        let citation = Citation::from_candidate(&candidate(row));

        assert_eq!(citation.tradition, "ibadi");
    }
}
