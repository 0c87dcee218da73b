use serde::{Deserialize, Serialize};

use super::package::PackageRecommendation;
use super::query::ParsedQuery;

/// Result of one trip through the pipeline, returned by
/// [`TravelAgent::handle_query`](crate::TravelAgent::handle_query).
///
/// `error` is only set by the top-level catch path; in that case
/// `response` still carries an apologetic reply and `recommendations`
/// is empty, so a calling HTTP layer can pass the structure through
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub response: String,
    pub recommendations: Vec<PackageRecommendation>,
    pub parsed_query: ParsedQuery,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    /// Generic apologetic outcome produced when the pipeline fails
    pub fn apologetic(conversation_id: impl Into<String>, error: String) -> Self {
        Self {
            response: "Sorry, I encountered an error. Please try rephrasing your query \
                       or contact support."
                .to_string(),
            recommendations: Vec::new(),
            parsed_query: ParsedQuery::default(),
            conversation_id: conversation_id.into(),
            error: Some(error),
        }
    }
}
