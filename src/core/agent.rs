use futures::FutureExt;
use tracing::{error, info};

use crate::core::parser::parse_query;
use crate::core::ranking::{RecommendationEngine, SearchCriteria};
use crate::core::session::{self, SessionStore};
use crate::core::templates::ResponseComposer;
use crate::error::Result;
use crate::services::{BackendClient, CandidateFetcher};
use crate::types::QueryOutcome;

/// The travel agent pipeline: parse → merge context → rank → compose.
///
/// Stateless per request apart from the injected [`SessionStore`];
/// cheap to share behind an `Arc` across concurrent callers.
#[derive(Debug)]
pub struct TravelAgent<F> {
    engine: RecommendationEngine<F>,
    sessions: SessionStore,
    composer: ResponseComposer,
}

impl TravelAgent<BackendClient> {
    /// Agent wired to the backend resolved from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BackendClient::from_env()?))
    }
}

impl<F: CandidateFetcher> TravelAgent<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            engine: RecommendationEngine::new(fetcher),
            sessions: SessionStore::new(),
            composer: ResponseComposer::new(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_composer(mut self, composer: ResponseComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one chat message. This is the sole entry point.
    ///
    /// Never fails: any error or panic inside the pipeline is caught
    /// here and mapped to an apologetic reply with the `error` field
    /// set, so an HTTP layer can always serialize the outcome verbatim.
    pub async fn handle_query(&self, raw: &str, conversation_id: &str) -> QueryOutcome {
        let pipeline = std::panic::AssertUnwindSafe(self.process(raw, conversation_id));

        match pipeline.catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!(target: "raahi::agent", error = %err, "query pipeline failed");
                QueryOutcome::apologetic(conversation_id, err.to_string())
            }
            Err(panic) => {
                let message = panic_message(&panic);
                error!(target: "raahi::agent", message, "query pipeline panicked");
                QueryOutcome::apologetic(conversation_id, message.to_string())
            }
        }
    }

    async fn process(&self, raw: &str, conversation_id: &str) -> Result<QueryOutcome> {
        let context = self.sessions.get_or_create(conversation_id);
        let mut parsed = parse_query(raw);

        if session::is_refinement(raw, &context) {
            info!(
                target: "raahi::agent",
                conversation_id,
                "refinement query, merging previous context"
            );
            parsed = session::merge_with_context(&context, &parsed);
        }

        self.sessions.update(conversation_id, raw, &parsed);

        let criteria = SearchCriteria::from(&parsed);
        let recommendations = self.engine.find_matching(&criteria).await;
        let response = self.composer.compose(raw, &recommendations, &parsed);

        info!(
            target: "raahi::agent",
            conversation_id,
            recommendations = recommendations.len(),
            "query handled"
        );

        Ok(QueryOutcome {
            response,
            recommendations,
            parsed_query: parsed,
            conversation_id: conversation_id.to_string(),
            error: None,
        })
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
