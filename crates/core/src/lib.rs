pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod validate;

pub use classify::{classify, interest_tags};
pub use config::PlannerConfig;
pub use error::ValidationError;
pub use models::*;
pub use planner::{generate, ItineraryPlanner};
pub use validate::validate_new_itinerary;
