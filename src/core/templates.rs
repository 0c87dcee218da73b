use rand::Rng;

use crate::types::{Language, PackageRecommendation, ParsedQuery};

const GREETING_KEYWORDS: &[&str] = &["hi", "hello", "hey", "salam", "assalam"];

/// A short message containing a greeting keyword is answered with a
/// greeting no matter what else came back from the pipeline
const GREETING_MAX_TOKENS: usize = 3;

const ENGLISH_GREETINGS: &[&str] = &[
    "Hello! I'm RAAHI, your travel assistant. How can I help you plan your trip today?",
    "Welcome to RAAHI! Looking for the perfect travel package? Tell me where you want to go!",
    "Hi there! Ready to explore Pakistan's beautiful destinations? What are you looking for?",
];

const URDU_GREETINGS: &[&str] = &[
    "Assalam-o-Alaikum! Main RAAHI hoon, aapka travel assistant. Kahan jana chahte hain?",
    "Khush amdeed! RAAHI mein aap ko kaun se destinations pasand hain?",
    "Hello! Main aap ki trip plan karne mein madad kar sakta hoon. Bataye kya chahiye?",
];

/// Everything a body template can interpolate
struct TemplateData<'a> {
    count: usize,
    destination: Option<&'a str>,
    budget: Option<u32>,
    duration: Option<u32>,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

/// Composes the chat reply from templates keyed by language and result
/// count.
///
/// Greeting choice is randomized; inject a picker to pin it in tests.
pub struct ResponseComposer {
    picker: Box<dyn Fn(usize) -> usize + Send + Sync>,
}

impl std::fmt::Debug for ResponseComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseComposer").finish_non_exhaustive()
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseComposer {
    pub fn new() -> Self {
        Self {
            picker: Box::new(|len| rand::thread_rng().gen_range(0..len)),
        }
    }

    /// Replace the greeting picker (receives the template count, returns
    /// an index into it)
    pub fn with_picker(picker: impl Fn(usize) -> usize + Send + Sync + 'static) -> Self {
        Self {
            picker: Box::new(picker),
        }
    }

    /// Build the reply text for one processed query.
    ///
    /// Order matters: a short greeting wins over everything, a parse
    /// with no trip signal asks a clarifying question, and only then is
    /// the count-bucketed body rendered and decorated with per-package
    /// summary lines.
    pub fn compose(
        &self,
        raw: &str,
        recommendations: &[PackageRecommendation],
        parsed: &ParsedQuery,
    ) -> String {
        let language = parsed.language;
        let lower = raw.to_lowercase();

        if GREETING_KEYWORDS.iter().any(|kw| lower.contains(kw))
            && raw.split_whitespace().count() <= GREETING_MAX_TOKENS
        {
            return self.greeting(language);
        }

        if !parsed.has_trip_signal() {
            if let Some(question) = clarifying_question(parsed, language) {
                return question;
            }
        }

        let data = TemplateData {
            count: recommendations.len(),
            destination: parsed.destination.as_deref(),
            budget: parsed.budget,
            duration: parsed.duration,
            min_price: recommendations
                .iter()
                .map(|r| r.price)
                .min_by(|a, b| a.total_cmp(b)),
            max_price: recommendations
                .iter()
                .map(|r| r.price)
                .max_by(|a, b| a.total_cmp(b)),
        };

        let body = if language.is_urdu() {
            match data.count {
                0 => urdu_none(&data),
                1 | 2 => urdu_few(&data),
                _ => urdu_many(&data),
            }
        } else {
            match data.count {
                0 => english_none(&data),
                1 | 2 => english_few(&data),
                _ => english_many(&data),
            }
        };

        if recommendations.is_empty() {
            return body;
        }

        let mut reply = body;
        reply.push_str("\n\n");
        for pkg in recommendations {
            let marker = match pkg.match_score {
                80.. => "🌟",
                60..=79 => "⭐",
                _ => "✨",
            };
            reply.push_str(&format!(
                "{marker} {}\n",
                format_package_details(pkg, language)
            ));
        }
        reply
    }

    /// A randomly chosen greeting for the language
    pub fn greeting(&self, language: Language) -> String {
        let pool = if language.is_urdu() {
            URDU_GREETINGS
        } else {
            ENGLISH_GREETINGS
        };
        let index = (self.picker)(pool.len()).min(pool.len() - 1);
        pool[index].to_string()
    }
}

fn english_many(data: &TemplateData) -> String {
    let mut response = format!("Great! I found {} amazing packages", data.count);

    if let Some(destination) = data.destination {
        response.push_str(&format!(" to {destination}"));
    }
    if let Some(duration) = data.duration {
        response.push_str(&format!(" for {duration} {}", day_word(duration)));
    }
    if let Some(budget) = data.budget {
        response.push_str(&format!(" under PKR {}", group_thousands(budget.into())));
    }
    response.push_str("! ");

    if let (Some(min), Some(max)) = (data.min_price, data.max_price) {
        response.push_str(&format!(
            "Prices range from PKR {} to PKR {}. ",
            format_pkr(min),
            format_pkr(max)
        ));
    }

    response.push_str("Here are the top picks for you:");
    response
}

fn english_few(data: &TemplateData) -> String {
    let mut response = format!(
        "I found {} {}",
        data.count,
        if data.count == 1 { "package" } else { "packages" }
    );
    if let Some(destination) = data.destination {
        response.push_str(&format!(" to {destination}"));
    }
    response.push_str(". ");
    response.push_str(if data.count == 1 {
        "Here it is:"
    } else {
        "Check them out:"
    });
    response
}

fn english_none(data: &TemplateData) -> String {
    let mut response = String::from("I couldn't find exact matches");

    let mut criteria = Vec::new();
    if let Some(destination) = data.destination {
        criteria.push(destination.to_string());
    }
    if let Some(budget) = data.budget {
        criteria.push(format!("under PKR {}", group_thousands(budget.into())));
    }
    if let Some(duration) = data.duration {
        criteria.push(format!("{duration} days"));
    }
    if !criteria.is_empty() {
        response.push_str(&format!(" for {}", criteria.join(", ")));
    }

    response.push_str(", but I have some great alternatives! Would you like to see:");
    response.push_str("\n- Similar destinations");
    response.push_str("\n- Flexible duration packages");
    response.push_str("\n- Higher budget options");
    response
}

fn urdu_many(data: &TemplateData) -> String {
    let mut response = format!("Bahut acha! {} packages mil gaye", data.count);

    if let Some(destination) = data.destination {
        response.push_str(&format!(" {destination} ke liye"));
    }
    if let Some(duration) = data.duration {
        response.push_str(&format!(", {duration} din ke liye"));
    }
    if let Some(budget) = data.budget {
        response.push_str(&format!(", PKR {} ke andar", group_thousands(budget.into())));
    }

    response.push_str("! Yeh dekhen:");
    response
}

fn urdu_few(data: &TemplateData) -> String {
    let mut response = format!(
        "{} package{} mil {}",
        data.count,
        if data.count > 1 { "s" } else { "" },
        if data.count > 1 { "gaye" } else { "gaya" }
    );
    if let Some(destination) = data.destination {
        response.push_str(&format!(" {destination} ke liye"));
    }
    response.push_str(". Yeh dekhen:");
    response
}

fn urdu_none(data: &TemplateData) -> String {
    let mut response = String::from("Exact match nahi mila");

    if data.destination.is_some() || data.budget.is_some() {
        response.push_str(" lekin aur options hain! ");
    }

    response.push_str("Kya aap:");
    response.push_str("\n- Milte julte destinations dekhna chahenge?");
    response.push_str("\n- Budget thoda increase kar sakte hain?");
    response
}

/// Ask for whichever trip detail is missing, destination first.
///
/// Returns `None` when nothing useful is missing (the caller then falls
/// through to the normal body templates).
fn clarifying_question(parsed: &ParsedQuery, language: Language) -> Option<String> {
    let destination_missing = parsed.destination.is_none();
    let budget_missing = parsed.budget.is_none() && parsed.duration.is_none();

    if !destination_missing && !budget_missing {
        return None;
    }

    let question = if language.is_urdu() {
        if destination_missing {
            "Kaunsa destination chahiye? Hunza, Swat, Naran, Skardu ya Murree?"
        } else if budget_missing {
            "Aap ka budget kya hai? Isse behtar packages mil jayenge!"
        } else {
            "Thodi aur details bata sakte hain?"
        }
    } else if destination_missing {
        "Which destination are you interested in? Popular options include Hunza, Swat, Naran, Skardu, and Murree."
    } else if budget_missing {
        "What's your budget range? This helps me find the perfect package for you!"
    } else {
        "Could you provide more details about your trip preferences?"
    };

    Some(question.to_string())
}

/// One-line package summary for chat display
fn format_package_details(pkg: &PackageRecommendation, language: Language) -> String {
    if language.is_urdu() {
        format!(
            "{} - PKR {}, {} din, Rating: {}/5",
            pkg.title,
            format_pkr(pkg.price),
            pkg.duration,
            pkg.rating
        )
    } else {
        format!(
            "{} - PKR {}, {} {}, Rating: {}/5",
            pkg.title,
            format_pkr(pkg.price),
            pkg.duration,
            day_word(pkg.duration),
            pkg.rating
        )
    }
}

/// Follow-up suggestion chips keyed on what the parse is still missing
pub fn suggestions(parsed: &ParsedQuery, language: Language) -> Vec<String> {
    let mut suggestions = Vec::new();

    if language.is_urdu() {
        if parsed.destination.is_none() {
            suggestions.push("Hunza packages dikhao".to_string());
            suggestions.push("Swat ke liye options".to_string());
        }
        if parsed.budget.is_none() {
            suggestions.push("20k ke andar packages".to_string());
            suggestions.push("Sasta packages".to_string());
        }
    } else {
        if parsed.destination.is_none() {
            suggestions.push("Show me Hunza packages".to_string());
            suggestions.push("Find Swat tours".to_string());
        }
        if parsed.budget.is_none() {
            suggestions.push("Under 30k packages".to_string());
            suggestions.push("Budget friendly trips".to_string());
        }
        if parsed.duration.is_none() {
            suggestions.push("Weekend packages".to_string());
            suggestions.push("2 day trips".to_string());
        }
    }

    suggestions.truncate(3);
    suggestions
}

fn day_word(duration: u32) -> &'static str {
    if duration == 1 {
        "day"
    } else {
        "days"
    }
}

fn format_pkr(price: f64) -> String {
    group_thousands(price.round().max(0.0) as u64)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
