//! raahi-agent: a rule-based travel agent for the RAAHI booking platform
//!
//! Parses free-text trip queries (English and Roman-Urdu), tracks
//! short-lived conversation context, ranks candidate packages fetched
//! from the booking backend, and composes a templated chat reply. All
//! "understanding" is deterministic keyword and pattern matching; there
//! is no language model anywhere in the pipeline.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use raahi_agent::{BackendClient, TravelAgent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = TravelAgent::new(BackendClient::new("http://localhost:5000")?);
//!     agent.sessions().start_sweep();
//!
//!     let outcome = agent
//!         .handle_query("show hunza packages under 30k", "conv_1")
//!         .await;
//!     println!("{}", outcome.response);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod error;
pub mod services;
pub mod types;

pub use core::{
    detect_language, extract_price_range, has_urdu_content, is_refinement, merge_with_context,
    parse_query, rank, score_package, suggestions, ConversationContext, Preferences,
    RecommendationEngine, ResponseComposer, SearchCriteria, SessionStore, TravelAgent,
    MAX_RECOMMENDATIONS, SESSION_TIMEOUT, SWEEP_INTERVAL,
};
pub use error::{AgentError, Result};
pub use services::{BackendClient, CandidateFetcher, SearchFilters};
pub use types::{
    Intent, Language, Package, PackageRecommendation, ParsedQuery, PriceRange, QueryOutcome,
    TravelType, FALLBACK_IMAGES,
};

#[cfg(feature = "cli")]
pub mod cli;
