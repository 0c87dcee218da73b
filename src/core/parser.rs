use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::language::detect_language;
use crate::types::{Intent, ParsedQuery, PriceRange, TravelType};

// Declared order is matching precedence for every table below; the first
// hit wins and reordering entries changes observable behavior.

const DESTINATIONS: &[&str] = &[
    "hunza",
    "swat",
    "naran",
    "kaghan",
    "skardu",
    "neelum",
    "kashmir",
    "murree",
    "nathia gali",
    "chitral",
    "kalash",
    "kumrat",
    "gilgit",
    "fairy meadows",
    "attabad",
    "sharda",
    "kel",
    "kalam",
    "malam jabba",
    "islamabad",
    "lahore",
    "karachi",
];

/// Multi-word variants checked before the plain destination list
const DESTINATION_ALIASES: &[(&str, &str)] = &[
    ("hunza valley", "hunza"),
    ("swat valley", "swat"),
    ("naran kaghan", "naran"),
    ("kaghan valley", "naran"),
    ("neelum valley", "neelum"),
    ("fairy meadow", "fairy meadows"),
    ("nathiagali", "nathia gali"),
];

/// (keyword, implied max budget in PKR, implied travel type)
const BUDGET_KEYWORDS: &[(&str, Option<u32>, Option<TravelType>)] = &[
    ("cheap", Some(15000), Some(TravelType::Budget)),
    ("budget", Some(20000), Some(TravelType::Budget)),
    ("sasta", Some(15000), Some(TravelType::Budget)),
    ("affordable", Some(30000), Some(TravelType::Budget)),
    ("moderate", Some(60000), None),
    ("expensive", None, Some(TravelType::Luxury)),
    ("luxury", None, Some(TravelType::Luxury)),
    ("mahanga", None, Some(TravelType::Luxury)),
    ("premium", None, Some(TravelType::Luxury)),
];

const TRAVEL_TYPE_KEYWORDS: &[(TravelType, &[&str])] = &[
    (
        TravelType::Family,
        &["family", "families", "kids", "children", "khandan"],
    ),
    (
        TravelType::Adventure,
        &["adventure", "trek", "hiking", "climb", "trekking"],
    ),
    (
        TravelType::Luxury,
        &["luxury", "premium", "deluxe", "5 star", "vip"],
    ),
    (
        TravelType::Budget,
        &["budget", "cheap", "affordable", "economy", "sasta"],
    ),
    (TravelType::Weekend, &["weekend", "short", "2 days", "2 din"]),
];

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Book,
        &["book", "reserve", "lena hai", "booking", "reserve karna"],
    ),
    (
        Intent::Browse,
        &["show", "find", "search", "dikhao", "batao", "suggest"],
    ),
    (Intent::Compare, &["compare", "vs", "difference", "better"]),
    (Intent::Info, &["about", "details", "information", "kya hai"]),
];

// "2 days", "3 din", "2-3 days" (range form keeps the first number)
const DURATION_PATTERNS: &[&str] = &[
    r"(\d+)\s*(?:day|days)",
    r"(\d+)\s*(?:din)",
    r"(\d+)-(\d+)\s*(?:day|days|din)",
];

// "under 20k", "30 hazar", "rs. 25000" ... A captured amount is scaled
// by 1000 exactly when the pattern text itself contains a literal `k`,
// which also catches the `pkr` prefix form. Long-standing contract, do
// not "fix" it.
const BUDGET_PATTERNS: &[&str] = &[
    r"under\s*(\d+)k",
    r"under\s*(\d+)\s*(?:thousand|hazar)",
    r"(\d+)k",
    r"(\d+)\s*(?:thousand|hazar)",
    r"(\d+)\s*rupees",
    r"rs\.?\s*(\d+)",
    r"pkr\s*(\d+)",
];

const TRAVELER_PATTERNS: &[&str] = &[
    r"(\d+)\s*(?:people|person|persons|log)",
    r"(\d+)\s*(?:travelers|travellers)",
    r"for\s*(\d+)",
];

static DURATION_RES: Lazy<Vec<Regex>> = Lazy::new(|| compile_all(DURATION_PATTERNS));

static BUDGET_RES: Lazy<Vec<(Regex, bool)>> = Lazy::new(|| {
    BUDGET_PATTERNS
        .iter()
        .map(|p| (compile(p), p.contains('k')))
        .collect()
});

static TRAVELER_RES: Lazy<Vec<Regex>> = Lazy::new(|| compile_all(TRAVELER_PATTERNS));

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("static pattern must compile")
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| compile(p)).collect()
}

/// Extract structured trip attributes from a raw free-text query.
///
/// Pure function of the input plus the static tables above; absence of a
/// match leaves the field unset and never fails. All keyword checks are
/// case-insensitive, unanchored substring containment, so "karachi" will
/// match inside a longer token — that looseness is part of the contract.
pub fn parse_query(raw: &str) -> ParsedQuery {
    let lower = raw.to_lowercase();
    let mut result = ParsedQuery {
        language: detect_language(raw),
        ..Default::default()
    };

    debug!(target: "raahi::parser", query = %raw, "parsing query");

    // 1. Destination: aliases first, then the plain list
    for (alias, canonical) in DESTINATION_ALIASES {
        if lower.contains(alias) {
            result.destination = Some(capitalize_first(canonical));
            break;
        }
    }
    if result.destination.is_none() {
        for dest in DESTINATIONS {
            if lower.contains(dest) {
                result.destination = Some(title_case(dest));
                break;
            }
        }
    }

    // 2. Duration from numeric patterns
    for re in DURATION_RES.iter() {
        if let Some(caps) = re.captures(raw) {
            result.duration = caps[1].parse().ok();
            break;
        }
    }

    // "weekend" forces 2 days even over a numeric match; "week" only
    // fills in when nothing else did
    if lower.contains("weekend") {
        result.duration = Some(2);
    } else if lower.contains("week") && result.duration.is_none() {
        result.duration = Some(7);
    }

    // 3. Budget from numeric patterns, then from vague keywords
    for (re, times_thousand) in BUDGET_RES.iter() {
        if let Some(caps) = re.captures(raw) {
            if let Ok(amount) = caps[1].parse::<u32>() {
                result.budget = Some(if *times_thousand {
                    amount.saturating_mul(1000)
                } else {
                    amount
                });
            }
            break;
        }
    }
    for (keyword, max, travel_type) in BUDGET_KEYWORDS {
        if lower.contains(keyword) {
            if let Some(max) = max {
                if result.budget.is_none() {
                    result.budget = Some(*max);
                }
            }
            if travel_type.is_some() {
                result.travel_type = *travel_type;
            }
            break;
        }
    }

    // 4. Travelers, with keyword overrides beating any numeric match
    for re in TRAVELER_RES.iter() {
        if let Some(caps) = re.captures(raw) {
            result.travelers = caps[1].parse().ok();
            break;
        }
    }
    if lower.contains("solo") || lower.contains("alone") {
        result.travelers = Some(1);
    } else if lower.contains("couple") {
        result.travelers = Some(2);
    } else if lower.contains("family") {
        result.travelers = Some(4);
        result.travel_type = Some(TravelType::Family);
    }

    // 5. Travel type, only when nothing above already decided it
    if result.travel_type.is_none() {
        for (travel_type, keywords) in TRAVEL_TYPE_KEYWORDS {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                result.travel_type = Some(*travel_type);
                break;
            }
        }
    }

    // 6. Intent, defaulting to browse
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            result.intent = *intent;
            break;
        }
    }

    debug!(target: "raahi::parser", parsed = ?result, "parse complete");

    result
}

static BETWEEN_RE: Lazy<Regex> = Lazy::new(|| compile(r"between\s*(\d+)k?\s*and\s*(\d+)k?"));
static UNDER_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:under|below)\s*(\d+)k?"));
static ABOVE_RE: Lazy<Regex> = Lazy::new(|| compile(r"(?:above|over)\s*(\d+)k?"));

/// Extract an explicit price range ("between 20k and 40k", "under 30k",
/// "above 50k"). Amounts are always read as thousands of PKR.
pub fn extract_price_range(raw: &str) -> PriceRange {
    if let Some(caps) = BETWEEN_RE.captures(raw) {
        return PriceRange {
            min: caps[1].parse::<u32>().ok().map(|n| n * 1000),
            max: caps[2].parse::<u32>().ok().map(|n| n * 1000),
        };
    }

    if let Some(caps) = UNDER_RE.captures(raw) {
        return PriceRange {
            min: None,
            max: caps[1].parse::<u32>().ok().map(|n| n * 1000),
        };
    }

    if let Some(caps) = ABOVE_RE.captures(raw) {
        return PriceRange {
            min: caps[1].parse::<u32>().ok().map(|n| n * 1000),
            max: None,
        };
    }

    PriceRange::default()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    #[test]
    fn test_destination_alias_wins() {
        let parsed = parse_query("show hunza valley packages");
        assert_eq!(parsed.destination.as_deref(), Some("Hunza"));
    }

    #[test]
    fn test_destination_direct_list_title_case() {
        let parsed = parse_query("trip to nathia gali please");
        assert_eq!(parsed.destination.as_deref(), Some("Nathia Gali"));
    }

    #[test]
    fn test_destination_alias_capitalizes_first_word_only() {
        let parsed = parse_query("fairy meadow tour");
        assert_eq!(parsed.destination.as_deref(), Some("Fairy meadows"));
    }

    #[test]
    fn test_destination_substring_matching_is_loose() {
        // containment, not token boundaries
        let parsed = parse_query("anything in hunzaabad");
        assert_eq!(parsed.destination.as_deref(), Some("Hunza"));
    }

    #[test]
    fn test_duration_days() {
        assert_eq!(parse_query("5 days in swat").duration, Some(5));
        assert_eq!(parse_query("3 din ka trip").duration, Some(3));
    }

    #[test]
    fn test_duration_range_keeps_first_number_found() {
        // "2-3 days": the day pattern lands on "3 days"
        assert_eq!(parse_query("2-3 days in naran").duration, Some(3));
    }

    #[test]
    fn test_weekend_beats_numeric_duration() {
        assert_eq!(parse_query("weekend trip for 5 days").duration, Some(2));
    }

    #[test]
    fn test_week_fills_only_when_unset() {
        assert_eq!(parse_query("one week in skardu").duration, Some(7));
        assert_eq!(parse_query("4 days next week").duration, Some(4));
    }

    #[test]
    fn test_budget_k_suffix() {
        assert_eq!(parse_query("packages under 20k").budget, Some(20000));
        assert_eq!(parse_query("20k packages").budget, Some(20000));
    }

    #[test]
    fn test_budget_thousand_not_scaled() {
        assert_eq!(parse_query("under 30 thousand").budget, Some(30));
        assert_eq!(parse_query("30 hazar tak").budget, Some(30));
    }

    #[test]
    fn test_budget_pkr_pattern_scales() {
        // the pkr pattern text contains `k`, so it is scaled like k-forms
        assert_eq!(parse_query("pkr 25 wala").budget, Some(25000));
    }

    #[test]
    fn test_budget_rupees_and_rs() {
        assert_eq!(parse_query("25000 rupees max").budget, Some(25000));
        assert_eq!(parse_query("rs. 18000").budget, Some(18000));
    }

    #[test]
    fn test_budget_keyword_sets_amount_and_type() {
        let parsed = parse_query("something cheap please");
        assert_eq!(parsed.budget, Some(15000));
        assert_eq!(parsed.travel_type, Some(TravelType::Budget));
    }

    #[test]
    fn test_budget_keyword_does_not_override_numeric() {
        let parsed = parse_query("cheap trip under 40k");
        assert_eq!(parsed.budget, Some(40000));
        assert_eq!(parsed.travel_type, Some(TravelType::Budget));
    }

    #[test]
    fn test_luxury_keyword_sets_type_without_amount() {
        let parsed = parse_query("luxury tour");
        assert_eq!(parsed.budget, None);
        assert_eq!(parsed.travel_type, Some(TravelType::Luxury));
    }

    #[test]
    fn test_travelers_numeric() {
        assert_eq!(parse_query("4 people going to swat").travelers, Some(4));
        assert_eq!(parse_query("trip for 6").travelers, Some(6));
        assert_eq!(parse_query("3 log ja rahe hain").travelers, Some(3));
    }

    #[test]
    fn test_family_overrides_numeric_travelers() {
        let parsed = parse_query("family trip for 7");
        assert_eq!(parsed.travelers, Some(4));
        assert_eq!(parsed.travel_type, Some(TravelType::Family));
    }

    #[test]
    fn test_solo_and_couple() {
        assert_eq!(parse_query("solo trek").travelers, Some(1));
        assert_eq!(parse_query("couple getaway").travelers, Some(2));
    }

    #[test]
    fn test_travel_type_table_order() {
        assert_eq!(
            parse_query("trekking in kumrat").travel_type,
            Some(TravelType::Adventure)
        );
        assert_eq!(
            parse_query("deluxe stay").travel_type,
            Some(TravelType::Luxury)
        );
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(parse_query("book hunza package").intent, Intent::Book);
        assert_eq!(parse_query("show me options").intent, Intent::Browse);
        assert_eq!(parse_query("hunza vs swat").intent, Intent::Compare);
        assert_eq!(parse_query("details kya hai").intent, Intent::Info);
        assert_eq!(parse_query("hmm").intent, Intent::Browse);
    }

    #[test]
    fn test_full_query() {
        let parsed = parse_query("Find sasta Hunza packages for 2 people, 5 days dikhao");
        assert_eq!(parsed.destination.as_deref(), Some("Hunza"));
        assert_eq!(parsed.duration, Some(5));
        assert_eq!(parsed.budget, Some(15000));
        assert_eq!(parsed.travelers, Some(2));
        assert_eq!(parsed.travel_type, Some(TravelType::Budget));
        assert_eq!(parsed.language, Language::Urdu);
    }

    #[test]
    fn test_price_range_between() {
        let range = extract_price_range("between 20k and 40k");
        assert_eq!(range.min, Some(20000));
        assert_eq!(range.max, Some(40000));
    }

    #[test]
    fn test_price_range_bounds() {
        assert_eq!(extract_price_range("below 35").max, Some(35000));
        assert_eq!(extract_price_range("over 50k").min, Some(50000));
        assert_eq!(extract_price_range("no numbers here"), PriceRange::default());
    }
}
