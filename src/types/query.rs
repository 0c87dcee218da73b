use serde::{Deserialize, Serialize};

/// Detected query language.
///
/// Roman-Urdu ("dikhao", "sasta") counts as Urdu; a query mixing both
/// keyword sets is reported as mixed and rendered with English templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Urdu,
    Mixed,
}

impl Language {
    /// True when replies should use the Urdu template set
    pub fn is_urdu(&self) -> bool {
        matches!(self, Language::Urdu)
    }
}

/// Trip style inferred from the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelType {
    Budget,
    Luxury,
    Family,
    Adventure,
    Weekend,
}

impl TravelType {
    /// Keyword form used for title matching during scoring
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelType::Budget => "budget",
            TravelType::Luxury => "luxury",
            TravelType::Family => "family",
            TravelType::Adventure => "adventure",
            TravelType::Weekend => "weekend",
        }
    }
}

/// What the user wants to do with the results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Book,
    #[default]
    Browse,
    Compare,
    Info,
}

/// Structured trip attributes extracted from one raw query.
///
/// Every field except `intent` and `language` is independently optional;
/// fields are extracted without cross-validation, so a parse may be
/// mutually inconsistent (e.g. a budget travel type next to a luxury
/// budget figure). That is the caller's problem to interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Trip length in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Budget in PKR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(rename = "travelType", skip_serializing_if = "Option::is_none")]
    pub travel_type: Option<TravelType>,
    pub intent: Intent,
    pub language: Language,
}

impl ParsedQuery {
    /// True when at least one trip attribute was understood.
    ///
    /// A parse with no signal triggers a clarifying question instead of a
    /// package search response.
    pub fn has_trip_signal(&self) -> bool {
        self.destination.is_some()
            || self.budget.is_some()
            || self.duration.is_some()
            || self.travel_type.is_some()
    }
}

/// Price range extracted from "between X and Y" / "under X" / "over X"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}
