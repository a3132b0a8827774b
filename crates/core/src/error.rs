use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("days must be at least 1")]
    InvalidDays,

    #[error("days must not exceed {max} (got {got})")]
    TooManyDays { max: u32, got: u32 },

    #[error("hours_per_day must be greater than 0 and at most 24 (got {0})")]
    InvalidHoursPerDay(f64),

    #[error("title is required")]
    EmptyTitle,

    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("end_date must not be before start_date")]
    DateRange,

    #[error("total_budget must not be negative")]
    NegativeBudget,
}
