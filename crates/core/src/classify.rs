//! Keyword classification of raw place records.
//!
//! Matching is case-insensitive over the place name, category and category
//! type. Latin keywords must match a whole word, optionally pluralised with
//! `s`/`es`, so "Small Cafe" is not a mall and "parking" is not a park.
//! Arabic keywords are matched as substrings since they commonly carry
//! attached prefixes such as the definite article.

use std::collections::BTreeSet;

use crate::models::{InterestTag, RawPlace};

pub const RELIGION_KEYWORDS: &[&str] = &[
    "mosque",
    "masjid",
    "haram",
    "shrine",
    "religious",
    "مسجد",
    "جامع",
    "الحرم",
    "ديني",
];

pub const FOOD_KEYWORDS: &[&str] = &[
    "restaurant",
    "resturant",
    "cafe",
    "café",
    "coffee",
    "bakery",
    "food",
    "dining",
    "مطعم",
    "مطاعم",
    "مقهى",
    "كافيه",
    "قهوة",
    "مخبز",
    "أكل",
];

pub const HISTORY_KEYWORDS: &[&str] = &[
    "museum",
    "historical",
    "heritage",
    "palace",
    "fort",
    "fortress",
    "archaeology",
    "archaeological",
    "متحف",
    "تاريخي",
    "تراث",
    "قصر",
    "قلعة",
    "أثري",
];

pub const ENTERTAINMENT_KEYWORDS: &[&str] = &[
    "entertainment",
    "amusement",
    "park",
    "mall",
    "shopping",
    "theme",
    "zoo",
    "aquarium",
    "beach",
    "cinema",
    "ترفيه",
    "ملاهي",
    "حديقة",
    "مول",
    "شاطئ",
    "سينما",
];

pub const CAFE_KEYWORDS: &[&str] = &[
    "cafe", "café", "coffee", "espresso", "مقهى", "كافيه", "قهوة", "كوفي",
];

pub const MOSQUE_KEYWORDS: &[&str] = &["mosque", "masjid", "مسجد", "جامع"];

/// Tags from the keyword table alone. Never empty: unmatched places are entertainment.
pub fn classify(raw: &RawPlace) -> BTreeSet<InterestTag> {
    let text = haystack(raw);
    let mut tags = BTreeSet::new();

    for (tag, keywords) in [
        (InterestTag::Religion, RELIGION_KEYWORDS),
        (InterestTag::Food, FOOD_KEYWORDS),
        (InterestTag::History, HISTORY_KEYWORDS),
        (InterestTag::Entertainment, ENTERTAINMENT_KEYWORDS),
    ] {
        if contains_any(&text, keywords) {
            tags.insert(tag);
        }
    }

    if tags.is_empty() {
        tags.insert(InterestTag::Entertainment);
    }

    tags
}

/// Tags declared on the record win when at least one of them is recognised.
pub fn interest_tags(raw: &RawPlace) -> BTreeSet<InterestTag> {
    let declared = raw
        .declared_tags()
        .iter()
        .filter_map(|tag| InterestTag::parse(tag))
        .collect::<BTreeSet<_>>();

    if declared.is_empty() {
        classify(raw)
    } else {
        declared
    }
}

pub fn is_cafe_like(raw: &RawPlace) -> bool {
    if contains_any(&haystack(raw), CAFE_KEYWORDS) {
        return true;
    }

    raw.declared_tags()
        .iter()
        .any(|tag| contains_any(&tag.to_lowercase(), CAFE_KEYWORDS))
}

pub fn is_mosque(raw: &RawPlace) -> bool {
    contains_any(&haystack(raw), MOSQUE_KEYWORDS)
}

fn haystack(raw: &RawPlace) -> String {
    [&raw.name, &raw.category, &raw.category_type]
        .into_iter()
        .flatten()
        .map(|field| field.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| matches_keyword(input, needle))
}

fn matches_keyword(input: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return input.contains(keyword);
    }

    input.match_indices(keyword).any(|(start, _)| {
        let word_start = !input[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        let rest = &input[start + keyword.len()..];
        let suffix = rest
            .split(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or_default();

        word_start && matches!(suffix, "" | "s" | "es")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPlace {
        serde_json::from_value(value).expect("valid raw place")
    }

    #[test]
    fn classifies_english_and_arabic() {
        let mosque = raw(json!({ "name": "Grand Mosque", "category": "mosque" }));
        assert_eq!(classify(&mosque), BTreeSet::from([InterestTag::Religion]));

        let restaurant = raw(json!({ "name": "مطعم البيك", "category": "" }));
        assert_eq!(classify(&restaurant), BTreeSet::from([InterestTag::Food]));

        let museum = raw(json!({ "name": "National Museum", "category": "attraction" }));
        assert!(classify(&museum).contains(&InterestTag::History));
    }

    #[test]
    fn unmatched_places_fall_back_to_entertainment() {
        let metro = raw(json!({ "name": "King Abdullah Station", "category": "metro" }));
        assert_eq!(classify(&metro), BTreeSet::from([InterestTag::Entertainment]));
    }

    #[test]
    fn declared_tags_take_precedence() {
        let place = raw(json!({
            "name": "Grand Mosque",
            "category": "mosque",
            "interests": ["history"]
        }));
        assert_eq!(interest_tags(&place), BTreeSet::from([InterestTag::History]));

        let unknown = raw(json!({ "name": "Grand Mosque", "interests": ["spa"] }));
        assert_eq!(interest_tags(&unknown), BTreeSet::from([InterestTag::Religion]));
    }

    #[test]
    fn detects_cafes_and_mosques() {
        assert!(is_cafe_like(&raw(json!({ "name": "Café Noir", "category": "cafe" }))));
        assert!(is_cafe_like(&raw(json!({ "name": "مقهى الركن" }))));
        assert!(!is_cafe_like(&raw(json!({ "name": "Al Romansiah", "category": "restaurant" }))));
        assert!(is_mosque(&raw(json!({ "name": "جامع الملك خالد" }))));
    }

    #[test]
    fn latin_keywords_match_whole_words_only() {
        let small = raw(json!({ "name": "Small Bites", "category": "restaurant" }));
        assert_eq!(classify(&small), BTreeSet::from([InterestTag::Food]));

        let parking = raw(json!({ "name": "Tower Parking", "category": "parking" }));
        assert_eq!(classify(&parking), BTreeSet::from([InterestTag::Entertainment]));
        assert!(!contains_any("tower parking", ENTERTAINMENT_KEYWORDS));
        assert!(!contains_any("spark labs", ENTERTAINMENT_KEYWORDS));

        assert!(contains_any("riyadh park", ENTERTAINMENT_KEYWORDS));
        assert!(contains_any("amusement_park", ENTERTAINMENT_KEYWORDS));
        assert!(contains_any("the holy mosques", MOSQUE_KEYWORDS));
        assert!(contains_any("al-masjid an-nabawi", MOSQUE_KEYWORDS));
        assert!(!is_cafe_like(&raw(json!({ "name": "Cafeteria Supplies" }))));
    }

    #[test]
    fn arabic_keywords_match_with_attached_prefixes() {
        let mall = raw(json!({ "name": "المول الكبير" }));
        assert_eq!(classify(&mall), BTreeSet::from([InterestTag::Entertainment]));
        assert!(is_cafe_like(&raw(json!({ "name": "المقهى الشعبي" }))));
    }

    #[test]
    fn enrichment_is_deterministic() {
        let record = raw(json!({ "name": "Brew Lab", "category": "coffee shop" }));
        assert_eq!(interest_tags(&record), interest_tags(&record));
        assert_eq!(is_cafe_like(&record), is_cafe_like(&record));
    }
}
