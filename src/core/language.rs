use crate::types::Language;

const ENGLISH_KEYWORDS: &[&str] = &[
    "show", "find", "suggest", "recommend", "search", "want", "need", "looking", "cheap",
    "expensive", "budget", "luxury", "family", "package", "tour", "trip", "visit", "go", "travel",
];

// Roman-Urdu as typed in chat, not transliterated script.
// "family"/"khandan" appear in both registers on purpose.
const URDU_KEYWORDS: &[&str] = &[
    "dikhao", "dikha", "batao", "bata", "chahiye", "chahie", "lena hai", "lena", "jana hai",
    "jana", "sasta", "mahanga", "din", "hazar", "rupay", "family", "khandan",
];

/// Classify a query as English, Roman-Urdu, or mixed.
///
/// Counts keyword-set hits by case-insensitive substring containment and
/// compares the two tallies; ties with any English hit land on mixed,
/// and a query matching neither set defaults to English.
pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();

    let english_count = ENGLISH_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    let urdu_count = URDU_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    if urdu_count > english_count && urdu_count > 0 {
        Language::Urdu
    } else if english_count > 0 && urdu_count > 0 {
        Language::Mixed
    } else {
        Language::English
    }
}

/// True when the text contains any Roman-Urdu keyword
pub fn has_urdu_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    URDU_KEYWORDS.iter().any(|kw| lower.contains(*kw))
}
