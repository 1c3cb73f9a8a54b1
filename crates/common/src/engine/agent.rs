//! Citation agent - orchestrates normalization, retrieval, citation assembly
//! and grounded synthesis into the final answer
//!
//! Hard rules enforced here rather than trusted to the generation step:
//! - the disclaimer is a compile-time constant appended to every response
//! - client-visible citations always come from the citation assembler, never
//!   parsed back out of generated text
//! - the Arabic text inside citations is never truncated; only the grounding
//!   payload handed to the generation call is bounded, with an explicit
//!   ellipsis marker
//! - a synthesis failure or timeout degrades to a fixed fallback sentence
//!   while the citation list is still returned in full

use crate::engine::citations::Citation;
use crate::engine::normalizer::Lang;
use crate::engine::retriever::{dedupe, RetrievalQuery, Retriever};
use crate::engine::synthesis::SynthesisGateway;
use crate::engine::taxonomy::{Domain, Tradition};
use crate::db::PassageStore;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Unconditional disclaimer; present on every response, no exceptions
pub const DISCLAIMER: &str = "Cette réponse est extraite de livres de référence islamique à titre informatif uniquement. Elle n'est PAS une fatwa. Pour votre situation personnelle, consultez un savant qualifié (عالم مؤهل).";

/// Fixed fallback synthesis text when the generation service fails or times
/// out
pub const SYNTHESIS_UNAVAILABLE: &str =
    "Service temporairement indisponible. Voici les sources brutes ci-dessous.";

/// Maximum Arabic characters per passage inside the grounding payload.
/// Bounds the request size only; the cited value is never touched.
const GROUNDING_TEXT_MAX_CHARS: usize = 600;

/// Validated ask parameters, produced by the HTTP boundary
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: String,
    pub tradition: Option<Tradition>,
    pub domain: Option<Domain>,
    pub language: Option<Lang>,
    pub max_sources: usize,
}

/// Final structured answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub question: String,
    pub tradition: Option<String>,
    pub synthesis_text: String,
    /// Reserved: Arabic synthesis is not produced yet
    pub synthesis_arabic: Option<String>,
    pub citations: Vec<Citation>,
    pub citations_count: usize,
    pub disclaimer: String,
    pub no_results_found: bool,
    pub processing_time_ms: u64,
}

/// The orchestrator over injected store and gateway capabilities
pub struct CitationAgent {
    retriever: Retriever,
    gateway: Arc<dyn SynthesisGateway>,
    synthesis_timeout: Duration,
}

impl CitationAgent {
    pub fn new(
        store: Arc<dyn PassageStore>,
        gateway: Arc<dyn SynthesisGateway>,
        synthesis_timeout: Duration,
    ) -> Self {
        Self {
            retriever: Retriever::new(store),
            gateway,
            synthesis_timeout,
        }
    }

    /// Answer a question. Infallible by design: the worst case is a complete
    /// response with `no_results_found` or a degraded synthesis text.
    pub async fn ask(&self, request: AskRequest) -> AgentResponse {
        let start = Instant::now();

        let query = RetrievalQuery {
            question: request.question.clone(),
            tradition: request.tradition,
            domain: request.domain,
            limit: request.max_sources,
            language: request.language,
        };

        let candidates = self.retriever.retrieve(&query).await;
        let mut candidates = dedupe(candidates);
        candidates.truncate(request.max_sources);

        if candidates.is_empty() {
            let response = self.no_result_response(&request, start);
            metrics::record_ask(start.elapsed().as_secs_f64(), 0, true);
            return response;
        }

        let citations: Vec<Citation> = candidates.iter().map(Citation::from_candidate).collect();

        let system_prompt = build_system_prompt(request.tradition);
        let user_prompt = build_user_prompt(&request.question, &citations);

        let synthesis_start = Instant::now();
        let synthesis_text = match tokio::time::timeout(
            self.synthesis_timeout,
            self.gateway.complete(&system_prompt, &user_prompt),
        )
        .await
        {
            Ok(Ok(text)) => {
                metrics::record_synthesis(synthesis_start.elapsed().as_secs_f64(), true);
                text
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Synthesis gateway failed, returning raw sources");
                metrics::record_synthesis(synthesis_start.elapsed().as_secs_f64(), false);
                SYNTHESIS_UNAVAILABLE.to_string()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.synthesis_timeout.as_millis() as u64,
                    "Synthesis call timed out, returning raw sources"
                );
                metrics::record_synthesis(synthesis_start.elapsed().as_secs_f64(), false);
                SYNTHESIS_UNAVAILABLE.to_string()
            }
        };

        let citations_count = citations.len();
        metrics::record_ask(start.elapsed().as_secs_f64(), citations_count, false);

        AgentResponse {
            question: request.question,
            tradition: request.tradition.map(|t| t.as_str().to_string()),
            synthesis_text,
            synthesis_arabic: None,
            citations,
            citations_count,
            disclaimer: DISCLAIMER.to_string(),
            no_results_found: false,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn no_result_response(&self, request: &AskRequest, start: Instant) -> AgentResponse {
        let scope = request
            .tradition
            .map(|t| format!(" en madhab {}", t.label()))
            .unwrap_or_default();

        AgentResponse {
            question: request.question.clone(),
            tradition: request.tradition.map(|t| t.as_str().to_string()),
            synthesis_text: format!(
                "Aucun passage pertinent trouvé dans la base de données pour cette question{}. \
                 Essayez avec des mots-clés différents ou sans filtre de madhab.",
                scope
            ),
            synthesis_arabic: None,
            citations: Vec::new(),
            citations_count: 0,
            disclaimer: DISCLAIMER.to_string(),
            no_results_found: true,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// System contract for the generation step.
///
/// The rules are re-asserted programmatically by the agent; this prompt is a
/// first line of defense, not the enforcement mechanism.
fn build_system_prompt(tradition: Option<Tradition>) -> String {
    let scope = tradition
        .map(|t| format!(" spécialisé dans le madhab {}", t.label()))
        .unwrap_or_default();

    format!(
        "Tu es un assistant de recherche en droit islamique classique (fiqh).\n\
         Tu aides à retrouver et expliquer ce que les savants islamiques ont dit dans leurs livres.\n\
         \n\
         ## RÈGLES ABSOLUES — NE JAMAIS VIOLER\n\
         \n\
         1. **Tu ne donnes JAMAIS de fatwa.** Tu n'as aucune autorité religieuse.\n\
         2. **Tu cites UNIQUEMENT les passages fournis.** Tu n'inventes aucun avis religieux.\n\
         3. **Si les sources ne répondent pas à la question**, dis-le clairement : \
         \"Les sources disponibles ne traitent pas directement de cette question.\"\n\
         4. **Tu reproduis EXACTEMENT** tout texte arabe cité — aucune modification.\n\
         5. **Tu termines TOUJOURS** par le disclaimer complet.\n\
         6. **Tu ne présentes JAMAIS** ta synthèse comme une fatwa ou un avis islamique officiel.\n\
         \n\
         ## RÔLE\n\
         \n\
         Tu es un outil de recherche bibliographique islamique{}.\n\
         Tu lis les passages extraits de livres de fiqh classiques et tu en fais une synthèse \
         honnête en précisant toujours l'auteur et la source.\n\
         \n\
         ## FORMAT DE RÉPONSE OBLIGATOIRE\n\
         \n\
         Réponds en français (ou dans la langue de la question).\n\
         Termine par :\n\
         \n\
         **⚠️ Avertissement important**\n\
         {}",
        scope, DISCLAIMER
    )
}

fn build_user_prompt(question: &str, citations: &[Citation]) -> String {
    format!(
        "Question : {}\n\n\
         Voici les passages extraits de la base de données de référence islamique :\n\n\
         {}\n\n\
         En te basant UNIQUEMENT sur ces passages (ne rien inventer), réponds à la question \
         en respectant le format demandé.",
        question,
        grounding_context(citations)
    )
}

/// Format citations into the numbered grounding payload for the generation
/// call. Arabic text is bounded here, and only here, with an explicit marker.
fn grounding_context(citations: &[Citation]) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let reference = [
                Some(format!("Savant: {}", c.scholar)),
                Some(format!("Livre: {}", c.book)),
                c.volume.map(|v| format!("Volume: {}", v)),
                c.page.map(|p| format!("Page: {}", p)),
                Some(format!("Madhab: {}", c.tradition)),
                c.chapter_hint.as_ref().map(|h| format!("Chapitre: {}", h)),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" | ");

            format!(
                "[SOURCE {}] {}\n« {} »",
                i + 1,
                reference,
                bounded_view(&c.text_arabic)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Non-destructive truncated view of the Arabic text for the grounding
/// payload
fn bounded_view(text: &str) -> String {
    if text.chars().count() <= GROUNDING_TEXT_MAX_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(GROUNDING_TEXT_MAX_CHARS).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MatchStrategy, PassageRow, SearchFilters};
    use crate::engine::synthesis::GatewayError;
    use crate::errors::Result;
    use async_trait::async_trait;

    struct FakeStore {
        rows: Vec<PassageRow>,
    }

    #[async_trait]
    impl PassageStore for FakeStore {
        async fn search(
            &self,
            _strategy: &MatchStrategy,
            _filters: &SearchFilters,
            limit: usize,
        ) -> Result<Vec<PassageRow>> {
            Ok(self.rows.iter().take(limit).cloned().collect())
        }
    }

    enum FakeGateway {
        /// Echoes a synthesis naming the scholars it was grounded on
        Grounded,
        Failing,
        Hanging,
    }

    #[async_trait]
    impl SynthesisGateway for FakeGateway {
        async fn complete(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> std::result::Result<String, GatewayError> {
            match self {
                FakeGateway::Grounded => {
                    // Pull scholar names back out of the grounding payload so
                    // tests can check the output never names anyone else
                    let scholars: Vec<&str> = user_prompt
                        .lines()
                        .filter(|l| l.starts_with("[SOURCE"))
                        .filter_map(|l| l.split("Savant: ").nth(1))
                        .filter_map(|rest| rest.split(" |").next())
                        .collect();
                    Ok(format!("Selon {} :", scholars.join(" et ")))
                }
                FakeGateway::Failing => Err(GatewayError::Timeout { timeout_ms: 20_000 }),
                FakeGateway::Hanging => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
            }
        }
    }

    fn row(id: i64, scholar: &str, book: &str, volume: Option<i32>, page: Option<i32>) -> PassageRow {
        PassageRow {
            passage_id: id,
            text_arabic: format!("وقال في المسألة رقم {}: صلاة الجماعة واجبة على الرجال دون النساء", id),
            text_french: None,
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
        }
    }

    fn agent(rows: Vec<PassageRow>, gateway: FakeGateway) -> CitationAgent {
        CitationAgent::new(
            Arc::new(FakeStore { rows }),
            Arc::new(gateway),
            Duration::from_millis(200),
        )
    }

    fn ask_request(question: &str, tradition: Option<Tradition>) -> AskRequest {
        AskRequest {
            question: question.to_string(),
            tradition,
            domain: None,
            language: None,
            max_sources: 6,
        }
    }

    #[tokio::test]
    async fn test_stopword_only_question_yields_no_result_response() {
        let agent = agent(vec![row(1, "الخرشي", "شرح مختصر خليل", None, None)], FakeGateway::Grounded);

        let response = agent.ask(ask_request("ما هل في", None)).await;

        assert!(response.no_results_found);
        assert!(response.citations.is_empty());
        assert_eq!(response.citations_count, 0);
        assert_eq!(response.disclaimer, DISCLAIMER);
        assert!(response.synthesis_text.contains("Aucun passage pertinent"));
    }

    #[tokio::test]
    async fn test_no_result_sentence_names_the_requested_school() {
        let agent = agent(Vec::new(), FakeGateway::Grounded);

        let response = agent
            .ask(ask_request("ما حكم صلاة الجماعة؟", Some(Tradition::Maliki)))
            .await;

        assert!(response.no_results_found);
        assert!(response.synthesis_text.contains(Tradition::Maliki.label()));
    }

    #[tokio::test]
    async fn test_canonical_author_cited_first() {
        let rows = vec![
            row(3, "ابن رشد", "بداية المجتهد", Some(1), Some(10)),
            row(9, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(11, "القرافي", "الذخيرة", Some(3), Some(80)),
            row(14, "الدسوقي", "حاشية الدسوقي", Some(2), Some(5)),
        ];
        let agent = agent(rows, FakeGateway::Grounded);

        let response = agent
            .ask(ask_request("ما حكم صلاة الجماعة؟", Some(Tradition::Maliki)))
            .await;

        assert!(!response.no_results_found);
        assert_eq!(response.citations.len(), 4);
        assert!(response.citations[0].scholar.contains("الخرشي"));
        assert!(response.citations[1].scholar.contains("الدسوقي"));
    }

    #[tokio::test]
    async fn test_gateway_failure_degrades_to_fallback_with_full_citations() {
        let rows = vec![
            row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(2, "الدردير", "الشرح الكبير", Some(2), Some(44)),
        ];
        let agent = agent(rows, FakeGateway::Failing);

        let response = agent.ask(ask_request("ما حكم صلاة الجماعة؟", None)).await;

        assert!(!response.no_results_found);
        assert_eq!(response.synthesis_text, SYNTHESIS_UNAVAILABLE);
        assert_eq!(response.citations.len(), 2);
        assert_eq!(response.disclaimer, DISCLAIMER);
    }

    #[tokio::test]
    async fn test_gateway_timeout_treated_as_failure() {
        let rows = vec![row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12))];
        let agent = agent(rows, FakeGateway::Hanging);

        let response = agent.ask(ask_request("ما حكم صلاة الجماعة؟", None)).await;

        assert_eq!(response.synthesis_text, SYNTHESIS_UNAVAILABLE);
        assert_eq!(response.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_book_volume_page_collapsed_in_citations() {
        let rows = vec![
            row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(2, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(3, "الدردير", "الشرح الكبير", Some(2), Some(44)),
        ];
        let agent = agent(rows, FakeGateway::Grounded);

        let response = agent.ask(ask_request("ما حكم صلاة الجماعة؟", None)).await;

        assert_eq!(response.citations.len(), 2);
        assert_eq!(response.citations[0].passage_id, 1);
        assert_eq!(response.citations[1].passage_id, 3);
    }

    #[tokio::test]
    async fn test_max_sources_respected_after_dedup() {
        let rows: Vec<PassageRow> = (1..=10)
            .map(|i| row(i, "الخرشي", "شرح مختصر خليل", Some(i as i32), Some(1)))
            .collect();
        let agent = agent(rows, FakeGateway::Grounded);

        let mut request = ask_request("ما حكم صلاة الجماعة؟", None);
        request.max_sources = 3;

        let response = agent.ask(request).await;

        assert_eq!(response.citations.len(), 3);
    }

    #[tokio::test]
    async fn test_cited_arabic_is_byte_identical_to_source() {
        let source = row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12));
        let source_bytes = source.text_arabic.as_bytes().to_vec();
        let agent = agent(vec![source], FakeGateway::Grounded);

        let response = agent.ask(ask_request("ما حكم صلاة الجماعة؟", None)).await;

        assert_eq!(
            response.citations[0].text_arabic.as_bytes(),
            source_bytes.as_slice()
        );
    }

    #[tokio::test]
    async fn test_synthesis_only_names_assembled_scholars() {
        // Grounding contract: any scholar the synthesis names must exist in
        // the citation list the client sees
        let rows = vec![
            row(1, "الخرشي", "شرح مختصر خليل", Some(1), Some(12)),
            row(2, "الدردير", "الشرح الكبير", Some(2), Some(44)),
        ];
        let agent = agent(rows, FakeGateway::Grounded);

        let response = agent.ask(ask_request("ما حكم صلاة الجماعة؟", None)).await;

        let named: Vec<&str> = response
            .synthesis_text
            .trim_start_matches("Selon ")
            .trim_end_matches(" :")
            .split(" et ")
            .collect();

        for name in named {
            assert!(
                response.citations.iter().any(|c| c.scholar == name),
                "synthesis names {} which is not in the citation list",
                name
            );
        }
    }

    #[test]
    fn test_grounding_view_is_bounded_with_marker() {
        let long_text = "كلمة ".repeat(300);
        assert!(long_text.chars().count() > GROUNDING_TEXT_MAX_CHARS);

        let view = bounded_view(&long_text);

        assert!(view.ends_with('…'));
        assert_eq!(view.chars().count(), GROUNDING_TEXT_MAX_CHARS + 1);

        let short = "نص قصير";
        assert_eq!(bounded_view(short), short);
    }

    #[test]
    fn test_system_prompt_carries_the_contract() {
        let prompt = build_system_prompt(Some(Tradition::Hanbali));

        assert!(prompt.contains("JAMAIS de fatwa"));
        assert!(prompt.contains("UNIQUEMENT les passages fournis"));
        assert!(prompt.contains("ne traitent pas directement"));
        assert!(prompt.contains("reproduis EXACTEMENT"));
        assert!(prompt.contains(DISCLAIMER));
        assert!(prompt.contains(Tradition::Hanbali.label()));
    }
}
