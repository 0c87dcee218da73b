pub mod outcome;
pub mod package;
pub mod query;

pub use outcome::QueryOutcome;
pub use package::{Package, PackageRecommendation, FALLBACK_IMAGES};
pub use query::{Intent, Language, ParsedQuery, PriceRange, TravelType};
