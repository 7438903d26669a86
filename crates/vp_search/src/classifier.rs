//! Heuristic tagging of search results by plain substring matching.
//!
//! All matches are case-insensitive over `"{title} {description}"`, except
//! language detection which only looks at title tokens.

use vp_core::{Category, Language};

/// Category rules in priority order; the first rule with a matching term wins.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::Saisie, &["saisie", "douane", "customs", "seizure"]),
    (Category::Brevet, &["brevet", "patent", "invention"]),
    (Category::Marque, &["marque", "trademark", "brand"]),
    (Category::Judiciaire, &["justice", "tribunal", "judiciaire", "court", "lawsuit"]),
    (Category::Copyright, &["droit d'auteur", "copyright", "copie"]),
];

const KEYWORD_GROUPS: &[(&str, &[&str])] = &[
    ("saisie", &["saisie", "seizure", "saisies"]),
    ("douane", &["douane", "customs", "douanes"]),
    ("contrefaçon", &["contrefaçon", "contrefacon", "counterfeit", "counterfeiting"]),
    ("brevet", &["brevet", "patent"]),
    ("marque", &["marque", "trademark", "brand"]),
    ("ompic", &["ompic", "maroc"]),
    ("euipo", &["euipo", "europe"]),
    ("wipo", &["wipo", "ompi"]),
    ("chine", &["chine", "china", "chinois"]),
    ("marseille", &["marseille"]),
    ("paris", &["paris"]),
];

const FR_STOP_WORDS: &[&str] = &["le", "la", "les", "un", "une", "des", "et", "ou", "mais", "donc"];
const EN_STOP_WORDS: &[&str] = &["the", "a", "an", "and", "or", "but", "so", "in", "on", "at"];
const ES_STOP_WORDS: &[&str] = &["el", "la", "los", "las", "un", "una", "y", "o", "pero", "en"];

fn content(title: &str, description: &str) -> String {
    format!("{} {}", title, description).to_lowercase()
}

pub fn categorize(title: &str, description: &str) -> Category {
    let content = content(title, description);
    CATEGORY_RULES
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| content.contains(t)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Tags whose synonyms appear in the article, each at most once.
pub fn extract_keywords(title: &str, description: &str) -> Vec<String> {
    let content = content(title, description);
    KEYWORD_GROUPS
        .iter()
        .filter(|(_, terms)| terms.iter().any(|t| content.contains(t)))
        .map(|(tag, _)| tag.to_string())
        .collect()
}

/// Stop-word vote over the title. Ties and titles without stop words are French.
pub fn detect_language(title: &str) -> Language {
    let title = title.to_lowercase();
    let words: Vec<&str> = title.split_whitespace().collect();
    let count = |list: &[&str]| words.iter().filter(|w| list.contains(w)).count();

    let fr = count(FR_STOP_WORDS);
    let en = count(EN_STOP_WORDS);
    let es = count(ES_STOP_WORDS);

    if en > fr && en > es {
        Language::En
    } else if es > fr && es > en {
        Language::Es
    } else {
        Language::Fr
    }
}
