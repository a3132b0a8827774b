use serde::{Deserialize, Serialize};

use crate::models::InterestTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Average visit length used only to size the number of picks per day.
    pub average_visit_hours: f64,
    pub default_visit_hours: f64,
    pub default_start_time: String,
    /// Optional cap on trip length; unbounded unless configured.
    pub max_days: Option<u32>,
    /// Cities where cafes are dropped from mixed-interest plans.
    pub cafe_restricted_cities: Vec<String>,
    pub default_interests: Vec<InterestTag>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            average_visit_hours: 1.5,
            default_visit_hours: 1.5,
            default_start_time: "09:00".to_string(),
            max_days: None,
            cafe_restricted_cities: vec![
                "makkah".to_string(),
                "mecca".to_string(),
                "مكة".to_string(),
            ],
            default_interests: vec![
                InterestTag::Religion,
                InterestTag::Food,
                InterestTag::Entertainment,
            ],
        }
    }
}

impl PlannerConfig {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
