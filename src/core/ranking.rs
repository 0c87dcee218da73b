use tracing::{debug, info, warn};

use crate::services::{CandidateFetcher, SearchFilters};
use crate::types::{Package, PackageRecommendation, ParsedQuery, TravelType};

/// Ranked results are truncated to this many entries
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Bookings above this count earn the popularity bonus
const POPULARITY_THRESHOLD: u32 = 10;

/// What the user asked for, as far as we could tell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub destination: Option<String>,
    pub duration: Option<u32>,
    pub budget: Option<u32>,
    pub travel_type: Option<TravelType>,
    pub travelers: Option<u32>,
}

impl From<&ParsedQuery> for SearchCriteria {
    fn from(parsed: &ParsedQuery) -> Self {
        Self {
            destination: parsed.destination.clone(),
            duration: parsed.duration,
            budget: parsed.budget,
            travel_type: parsed.travel_type,
            travelers: parsed.travelers,
        }
    }
}

impl SearchCriteria {
    /// Coarse backend filters; travel type and traveler count only
    /// matter to the scorer
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            destination: self.destination.clone(),
            max_price: self.budget,
            duration: self.duration,
        }
    }

    /// Widened criteria for the single fallback retry: budget up by
    /// half, duration constraint dropped, destination kept
    fn relaxed(&self) -> SearchCriteria {
        SearchCriteria {
            destination: self.destination.clone(),
            duration: None,
            budget: self.budget.map(|b| (b as f64 * 1.5).round() as u32),
            travel_type: self.travel_type,
            travelers: self.travelers,
        }
    }
}

/// Score one candidate against the criteria.
///
/// Additive weighted components, clamped to 0-100. Pure function; the
/// returned reasons describe which components fired, for display.
pub fn score_package(pkg: &Package, criteria: &SearchCriteria) -> (u8, Vec<String>) {
    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    // Destination (35)
    if let Some(destination) = &criteria.destination {
        if pkg
            .destination
            .to_lowercase()
            .contains(&destination.to_lowercase())
        {
            score += 35.0;
            reasons.push(format!("Matches your destination: {destination}"));
        }
    }

    // Duration proximity (25 / 18 / 10)
    if let Some(duration) = criteria.duration {
        let diff = pkg.duration.abs_diff(duration);
        score += match diff {
            0 => 25.0,
            1 => 18.0,
            2 => 10.0,
            _ => 0.0,
        };
        if diff == 0 {
            reasons.push(format!("Exactly {duration} days"));
        } else if diff <= 2 {
            reasons.push("Close to your preferred duration".to_string());
        }
    }

    // Budget fit (25 / 20 / 12 / 5)
    if let Some(budget) = criteria.budget.filter(|b| *b > 0) {
        let ratio = pkg.price / f64::from(budget);
        score += if ratio <= 0.8 {
            25.0
        } else if ratio <= 1.0 {
            20.0
        } else if ratio <= 1.15 {
            12.0
        } else if ratio <= 1.3 {
            5.0
        } else {
            0.0
        };
        if ratio <= 1.0 {
            reasons.push("Within your budget".to_string());
        }
    }

    // Rating contributes up to 10 (ratings run 0-5)
    score += pkg.rating * 2.0;
    if pkg.rating >= 4.5 {
        reasons.push(format!("Highly rated: {}/5", pkg.rating));
    }

    // Popularity (5)
    if pkg.bookings_count > POPULARITY_THRESHOLD {
        score += 5.0;
        reasons.push("Popular with other travelers".to_string());
    }

    // Travel type named in the title (10)
    if let Some(travel_type) = criteria.travel_type {
        if pkg.title.to_lowercase().contains(travel_type.as_str()) {
            score += 10.0;
            reasons.push(format!("{} trip", travel_type.as_str()));
        }
    }

    // Capacity (5)
    if let (Some(travelers), Some(capacity)) = (criteria.travelers, pkg.max_travelers) {
        if capacity >= travelers {
            score += 5.0;
        }
    }

    // Availability (5)
    if pkg.is_active {
        score += 5.0;
    }

    (score.round().clamp(0.0, 100.0) as u8, reasons)
}

/// Score, sort (stable, descending), truncate to the top entries, and
/// apply the image fallback. Ties keep candidate order.
pub fn rank(candidates: Vec<Package>, criteria: &SearchCriteria) -> Vec<PackageRecommendation> {
    let mut scored: Vec<(Package, u8, Vec<String>)> = candidates
        .into_iter()
        .map(|pkg| {
            let (score, reasons) = score_package(&pkg, criteria);
            (pkg, score, reasons)
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(MAX_RECOMMENDATIONS);

    scored
        .into_iter()
        .map(|(pkg, score, reasons)| PackageRecommendation::from_package(pkg, score, reasons))
        .collect()
}

/// Fetches candidates and ranks them, with one constraint-relaxing
/// retry when the strict criteria come back empty
#[derive(Debug)]
pub struct RecommendationEngine<F> {
    fetcher: F,
}

impl<F: CandidateFetcher> RecommendationEngine<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Run the full fetch → score → sort → truncate pipeline.
    ///
    /// A failed or unsuccessful fetch counts as zero candidates. When
    /// the strict pass is empty and the user constrained destination or
    /// budget, retry once with [`SearchCriteria::relaxed`]; a second
    /// empty result is returned as-is.
    pub async fn find_matching(&self, criteria: &SearchCriteria) -> Vec<PackageRecommendation> {
        let strict = self.fetch_and_rank(criteria).await;
        if !strict.is_empty() {
            return strict;
        }

        if criteria.destination.is_some() || criteria.budget.is_some() {
            let relaxed = criteria.relaxed();
            info!(
                target: "raahi::ranking",
                budget = ?relaxed.budget,
                "no exact matches, retrying with relaxed criteria"
            );
            return self.fetch_and_rank(&relaxed).await;
        }

        strict
    }

    async fn fetch_and_rank(&self, criteria: &SearchCriteria) -> Vec<PackageRecommendation> {
        let candidates = match self.fetcher.search_packages(&criteria.filters()).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    target: "raahi::ranking",
                    error = %err,
                    "candidate fetch failed, treating as zero candidates"
                );
                Vec::new()
            }
        };

        debug!(
            target: "raahi::ranking",
            candidates = candidates.len(),
            "scoring candidates"
        );
        rank(candidates, criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn package(id: &str, destination: &str, duration: u32, price: f64) -> Package {
        Package {
            id: id.to_string(),
            title: format!("{destination} Tour"),
            destination: destination.to_string(),
            duration,
            price,
            rating: 0.0,
            max_travelers: None,
            bookings_count: 0,
            is_active: true,
            images: vec!["https://cdn.example.com/a.jpg".to_string()],
            includes: vec![],
            description: None,
            agency_name: None,
        }
    }

    fn criteria(destination: Option<&str>, duration: Option<u32>, budget: Option<u32>) -> SearchCriteria {
        SearchCriteria {
            destination: destination.map(|s| s.to_string()),
            duration,
            budget,
            ..Default::default()
        }
    }

    /// Fake fetcher that replays queued responses and records filters
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Vec<Package>>>,
        seen_filters: Mutex<Vec<SearchFilters>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Vec<Package>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen_filters: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CandidateFetcher for ScriptedFetcher {
        async fn search_packages(&self, filters: &SearchFilters) -> Result<Vec<Package>> {
            self.seen_filters.lock().unwrap().push(filters.clone());
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let pkg = package("p1", "Hunza", 5, 20000.0);
        let criteria = criteria(Some("Hunza"), Some(5), Some(25000));
        assert_eq!(score_package(&pkg, &criteria), score_package(&pkg, &criteria));
    }

    #[test]
    fn test_full_match_score() {
        let mut pkg = package("p1", "Hunza", 5, 18000.0);
        pkg.rating = 4.0;
        // destination 35 + duration 25 + budget 25 (ratio 0.72) + rating 8 + active 5
        let (score, reasons) = score_package(&pkg, &criteria(Some("Hunza"), Some(5), Some(25000)));
        assert_eq!(score, 98);
        assert!(reasons.iter().any(|r| r.contains("Hunza")));
    }

    #[test]
    fn test_score_clamped_at_100() {
        let mut pkg = package("p1", "Hunza", 5, 10000.0);
        pkg.rating = 5.0;
        pkg.bookings_count = 50;
        pkg.max_travelers = Some(10);
        pkg.title = "Hunza family adventure".to_string();
        let criteria = SearchCriteria {
            destination: Some("Hunza".to_string()),
            duration: Some(5),
            budget: Some(40000),
            travel_type: Some(TravelType::Family),
            travelers: Some(4),
        };
        let (score, _) = score_package(&pkg, &criteria);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_duration_tiers() {
        let criteria = criteria(None, Some(5), None);
        let base = |d: u32| {
            let pkg = package("p", "Swat", d, 1000.0);
            score_package(&pkg, &criteria).0
        };
        // active bonus of 5 rides on top of every tier
        assert_eq!(base(5), 30);
        assert_eq!(base(4), 23);
        assert_eq!(base(6), 23);
        assert_eq!(base(7), 15);
        assert_eq!(base(9), 5);
    }

    #[test]
    fn test_budget_tiers() {
        let criteria = criteria(None, None, Some(10000));
        let base = |price: f64| {
            let pkg = package("p", "Swat", 3, price);
            score_package(&pkg, &criteria).0
        };
        assert_eq!(base(8000.0), 30); // ratio 0.8
        assert_eq!(base(10000.0), 25); // ratio 1.0
        assert_eq!(base(11500.0), 17); // ratio 1.15
        assert_eq!(base(13000.0), 10); // ratio 1.3
        assert_eq!(base(14000.0), 5); // ratio 1.4, availability only
    }

    #[test]
    fn test_inactive_package_loses_availability_bonus() {
        let mut pkg = package("p", "Swat", 3, 1000.0);
        pkg.is_active = false;
        assert_eq!(score_package(&pkg, &SearchCriteria::default()).0, 0);
    }

    #[test]
    fn test_rank_caps_at_five_and_sorts_descending() {
        let candidates: Vec<Package> = (0..10)
            .map(|i| package(&format!("p{i}"), "Hunza", 5 + i, 10000.0))
            .collect();
        let ranked = rank(candidates, &criteria(Some("Hunza"), Some(5), None));

        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
        for pair in ranked.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        assert_eq!(ranked[0].package_id, "p0");
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let candidates = vec![
            package("first", "Hunza", 5, 10000.0),
            package("second", "Hunza", 5, 10000.0),
        ];
        let ranked = rank(candidates, &criteria(Some("Hunza"), None, None));
        assert_eq!(ranked[0].package_id, "first");
        assert_eq!(ranked[1].package_id, "second");
    }

    #[tokio::test]
    async fn test_fallback_relaxes_budget_and_drops_duration() {
        let fetcher = ScriptedFetcher::new(vec![
            vec![],
            vec![package("alt", "Hunza", 4, 14000.0)],
        ]);
        let engine = RecommendationEngine::new(fetcher);

        let ranked = engine
            .find_matching(&criteria(Some("Hunza"), Some(5), Some(10000)))
            .await;
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].package_id, "alt");

        let filters = engine.fetcher.seen_filters.lock().unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].max_price, Some(10000));
        assert_eq!(filters[0].duration, Some(5));
        assert_eq!(filters[1].max_price, Some(15000));
        assert_eq!(filters[1].duration, None);
        assert_eq!(filters[1].destination.as_deref(), Some("Hunza"));
    }

    #[tokio::test]
    async fn test_no_fallback_without_destination_or_budget() {
        let fetcher = ScriptedFetcher::new(vec![vec![]]);
        let engine = RecommendationEngine::new(fetcher);

        let ranked = engine.find_matching(&criteria(None, Some(3), None)).await;
        assert!(ranked.is_empty());
        assert_eq!(engine.fetcher.seen_filters.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_treated_as_zero_candidates() {
        struct FailingFetcher;

        #[async_trait]
        impl CandidateFetcher for FailingFetcher {
            async fn search_packages(&self, _filters: &SearchFilters) -> Result<Vec<Package>> {
                Err(crate::error::AgentError::Backend("boom".to_string()))
            }
        }

        let engine = RecommendationEngine::new(FailingFetcher);
        let ranked = engine.find_matching(&criteria(Some("Hunza"), None, None)).await;
        assert!(ranked.is_empty());
    }
}
