use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestTag {
    Religion,
    Food,
    Entertainment,
    History,
}

impl InterestTag {
    pub const ALL: [InterestTag; 4] = [
        InterestTag::Religion,
        InterestTag::Food,
        InterestTag::Entertainment,
        InterestTag::History,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "religion" | "religious" | "ديني" | "دين" => Some(Self::Religion),
            "food" | "restaurants" | "أكل" | "مطاعم" => Some(Self::Food),
            "entertainment" | "fun" | "ترفيه" | "ترفيهي" => Some(Self::Entertainment),
            "history" | "heritage" | "culture" | "تاريخ" | "تاريخي" => Some(Self::History),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Religion => "religion",
            Self::Food => "food",
            Self::Entertainment => "entertainment",
            Self::History => "history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    #[default]
    Any,
    Cheap,
    Medium,
    Luxury,
}

impl BudgetTier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "any" | "all" | "أي" => Some(Self::Any),
            other => PriceLevel::parse(other).map(Self::from),
        }
    }

    /// Absent price levels count as medium.
    pub fn admits(self, price_level: Option<PriceLevel>) -> bool {
        let level = price_level.unwrap_or(PriceLevel::Medium);
        match self {
            Self::Any => true,
            Self::Cheap => level == PriceLevel::Cheap,
            Self::Medium => level == PriceLevel::Medium,
            Self::Luxury => level == PriceLevel::Luxury,
        }
    }
}

impl From<PriceLevel> for BudgetTier {
    fn from(level: PriceLevel) -> Self {
        match level {
            PriceLevel::Cheap => Self::Cheap,
            PriceLevel::Medium => Self::Medium,
            PriceLevel::Luxury => Self::Luxury,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    Cheap,
    Medium,
    Luxury,
}

impl PriceLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cheap" | "budget" | "low" | "inexpensive" | "$" | "رخيص" | "اقتصادي" => {
                Some(Self::Cheap)
            }
            "medium" | "moderate" | "mid" | "$$" | "متوسط" => Some(Self::Medium),
            "luxury" | "expensive" | "high" | "$$$" | "$$$$" | "فاخر" => Some(Self::Luxury),
            _ => None,
        }
    }

    /// Accepts the named levels or a places-API style numeric level (0-4).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => match number.as_f64()? {
                level if level < 0.0 => None,
                level if level < 2.0 => Some(Self::Cheap),
                level if level < 3.0 => Some(Self::Medium),
                _ => Some(Self::Luxury),
            },
            _ => None,
        }
    }
}

/// A place record as it arrives from the catalog source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "type")]
    pub category_type: Option<String>,
    #[serde(
        default,
        alias = "interestTags",
        alias = "interest_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub interests: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl RawPlace {
    /// Stable key: `id`, then `place_id`, then `code`, else the name.
    pub fn identity(&self) -> String {
        [&self.id, &self.place_id, &self.code]
            .into_iter()
            .find_map(|field| field.as_ref().and_then(identity_text))
            .unwrap_or_else(|| self.name.clone().unwrap_or_default())
    }

    /// Tag labels carried on the record itself, as raw strings.
    pub fn declared_tags(&self) -> Vec<String> {
        match &self.interests {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect(),
            Some(Value::String(text)) => text
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn identity_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// A catalog record after enrichment; the planner only ever sees these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub identity: String,
    pub name: String,
    pub region: String,
    pub category: Option<String>,
    pub category_type: Option<String>,
    pub interest_tags: BTreeSet<InterestTag>,
    pub estimated_duration_hours: f64,
    pub rating: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub is_cafe_like: bool,
    pub is_mosque: bool,
    pub link: Option<String>,
}

impl Place {
    pub fn enrich(raw: &RawPlace, default_visit_hours: f64) -> Self {
        let estimated_duration_hours = value_as_f64(raw.estimated_duration.as_ref())
            .filter(|hours| *hours > 0.0)
            .unwrap_or(default_visit_hours);

        Self {
            identity: raw.identity(),
            name: raw.name.clone().unwrap_or_default(),
            region: raw.region.clone().unwrap_or_default(),
            category: raw.category.clone(),
            category_type: raw.category_type.clone(),
            interest_tags: classify::interest_tags(raw),
            estimated_duration_hours,
            rating: value_as_f64(raw.rating.as_ref()),
            price_level: raw.price_level.as_ref().and_then(PriceLevel::from_value),
            is_cafe_like: classify::is_cafe_like(raw),
            is_mosque: classify::is_mosque(raw),
            link: raw.link.clone(),
        }
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn has_tag(&self, tag: InterestTag) -> bool {
        self.interest_tags.contains(&tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripConstraints {
    #[serde(default)]
    pub city: String,
    pub days: u32,
    pub hours_per_day: f64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub interests: Vec<InterestTag>,
    #[serde(default)]
    pub budget: BudgetTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledVisit {
    pub place: Place,
    pub interest: InterestTag,
    pub visit_start: String,
    pub visit_end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub total_hours: f64,
    pub visits: Vec<ScheduledVisit>,
}

impl DayPlan {
    pub fn empty(day: u32) -> Self {
        Self {
            day,
            total_hours: 0.0,
            visits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub scheduled_visits: usize,
    pub distinct_places: usize,
    pub empty_days: usize,
    pub total_hours: f64,
}

impl PlanSummary {
    pub fn from_days(days: &[DayPlan]) -> Self {
        let distinct = days
            .iter()
            .flat_map(|day| day.visits.iter())
            .map(|visit| visit.place.identity.as_str())
            .collect::<BTreeSet<_>>();

        Self {
            scheduled_visits: days.iter().map(|day| day.visits.len()).sum(),
            distinct_places: distinct.len(),
            empty_days: days.iter().filter(|day| day.visits.is_empty()).count(),
            total_hours: days.iter().map(|day| day.total_hours).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub city: String,
    pub days: Vec<DayPlan>,
    pub summary: PlanSummary,
}

/// Metadata the caller attaches when keeping a generated plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItinerary {
    pub title: String,
    #[serde(default)]
    pub main_destination: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_budget: Option<i64>,
    pub plan_details: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub main_destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_budget: Option<i64>,
    pub plan_details: Value,
    pub created_at: DateTime<Utc>,
}
