//! Citation Engine Core Components
//!
//! The engine answers free-text questions about classical legal opinions by
//! retrieving verbatim source passages and producing a response provably
//! grounded in them:
//! - Query normalization (language detection, bounded keywords)
//! - Language-aware retrieval with canonical-author ranking
//! - Near-duplicate collapsing
//! - Immutable citation assembly
//! - Grounded synthesis behind a bounded external call

mod agent;
mod citations;
mod normalizer;
mod retriever;
mod synthesis;
pub mod taxonomy;

pub use agent::{AgentResponse, AskRequest, CitationAgent, DISCLAIMER, SYNTHESIS_UNAVAILABLE};
pub use citations::Citation;
pub use normalizer::{is_arabic, normalize, Lang, NormalizedQuery, MAX_KEYWORDS};
pub use retriever::{
    dedupe, RankedCandidate, RetrievalQuery, Retriever, CANONICAL_BOOST, OVERFETCH_MARGIN,
};
pub use synthesis::{GatewayError, HttpSynthesisGateway, SynthesisGateway};
pub use taxonomy::{Domain, Tradition};
