//! Query normalizer - language detection and keyword extraction
//!
//! Pure and deterministic; the natural unit-test surface of the engine. A
//! question that normalizes to zero keywords must short-circuit retrieval
//! so no unconstrained query ever reaches the store.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum keywords retained per question
pub const MAX_KEYWORDS: usize = 6;

/// Tokens shorter than this (in characters) are dropped
const MIN_TOKEN_CHARS: usize = 3;

/// Question language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ar,
    Fr,
}

impl Lang {
    /// Lenient parse of the request-level language hint
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ar" => Some(Lang::Ar),
            "fr" => Some(Lang::Fr),
            _ => None,
        }
    }
}

/// Normalized question: detected language plus a bounded keyword set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub language: Lang,
    pub keywords: Vec<String>,
}

const ARABIC_STOPWORDS: &[&str] = &[
    "هل", "ما", "من", "في", "على", "إلى", "عن", "مع",
    "هذا", "هذه", "ذلك", "تلك", "أن", "إن", "كان", "كانت", "يكون", "التي", "الذي",
    "وما", "فما", "وهل", "أم", "أو", "لا", "ليس", "كيف", "متى", "أين", "لماذا",
];

const FRENCH_STOPWORDS: &[&str] = &[
    "le", "la", "les", "de", "du", "des", "un", "une",
    "est", "sont", "avec", "dans", "sur", "pour", "par", "en", "et", "ou", "ni",
    "que", "qui", "quoi", "comment", "quand", "où", "pourquoi", "si", "ce", "cet",
];

/// True if the text contains any Arabic-script code point
pub fn is_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

fn is_kept_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
        || c.is_ascii_alphabetic()
        || ('À'..='ÿ').contains(&c)
        || c.is_whitespace()
}

fn is_stopword(token: &str) -> bool {
    ARABIC_STOPWORDS.contains(&token)
        || FRENCH_STOPWORDS.contains(&token.to_lowercase().as_str())
}

/// Normalize a raw question into a language tag and a bounded keyword set
pub fn normalize(raw_question: &str) -> NormalizedQuery {
    let language = if is_arabic(raw_question) { Lang::Ar } else { Lang::Fr };

    let cleaned: String = raw_question
        .chars()
        .map(|c| if is_kept_char(c) { c } else { ' ' })
        .collect();

    let mut seen = HashSet::new();
    let keywords = cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !is_stopword(token))
        .filter(|token| seen.insert(token.to_string()))
        .take(MAX_KEYWORDS)
        .map(|token| token.to_string())
        .collect();

    NormalizedQuery { language, keywords }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic_detection() {
        assert!(is_arabic("ما حكم صلاة الجماعة؟"));
        assert!(is_arabic("quel est le hukm de الصلاة"));
        assert!(!is_arabic("la priere en groupe"));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let question = "Quel est le statut de la priere en groupe selon les savants ?";
        let a = normalize(question);
        let b = normalize(question);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stopwords_and_short_tokens_dropped() {
        let result = normalize("la priere du vendredi est en groupe");
        assert!(!result.keywords.contains(&"la".to_string()));
        assert!(!result.keywords.contains(&"est".to_string()));
        assert!(!result.keywords.contains(&"en".to_string()));
        assert!(result.keywords.contains(&"priere".to_string()));
        assert!(result.keywords.contains(&"vendredi".to_string()));
    }

    #[test]
    fn test_arabic_stopwords_dropped() {
        let result = normalize("ما حكم صلاة الجماعة في المسجد");
        assert!(!result.keywords.contains(&"في".to_string()));
        assert!(result.keywords.contains(&"صلاة".to_string()));
        assert!(result.keywords.contains(&"الجماعة".to_string()));
        assert_eq!(result.language, Lang::Ar);
    }

    #[test]
    fn test_stopword_only_question_yields_no_keywords() {
        let result = normalize("ما هل في");
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_punctuation_stripped() {
        let result = normalize("priere? (vendredi)!");
        assert_eq!(result.keywords, vec!["priere", "vendredi"]);
    }

    #[test]
    fn test_deduplication_preserves_first_seen_order() {
        let result = normalize("zakat commerce zakat commerce fitr");
        assert_eq!(result.keywords, vec!["zakat", "commerce", "fitr"]);
    }

    #[test]
    fn test_keyword_cap() {
        let result = normalize("alpha bravo charlie delta echo foxtrot golf hotel");
        assert_eq!(result.keywords.len(), MAX_KEYWORDS);
        assert_eq!(result.keywords[0], "alpha");
    }

    #[test]
    fn test_accented_tokens_kept() {
        let result = normalize("héritage à répartir équitablement");
        assert!(result.keywords.contains(&"héritage".to_string()));
        assert!(result.keywords.contains(&"répartir".to_string()));
    }
}
