use crate::error::ValidationError;
use crate::models::NewItinerary;

const MAX_TITLE_LEN: usize = 255;
const MAX_DESTINATION_LEN: usize = 255;

pub fn validate_new_itinerary(itinerary: &NewItinerary) -> Result<(), ValidationError> {
    let title = itinerary.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "title",
            max: MAX_TITLE_LEN,
        });
    }

    if let Some(destination) = &itinerary.main_destination {
        if destination.chars().count() > MAX_DESTINATION_LEN {
            return Err(ValidationError::FieldTooLong {
                field: "main_destination",
                max: MAX_DESTINATION_LEN,
            });
        }
    }

    if let (Some(start), Some(end)) = (itinerary.start_date, itinerary.end_date) {
        if end < start {
            return Err(ValidationError::DateRange);
        }
    }

    if itinerary.total_budget.is_some_and(|budget| budget < 0) {
        return Err(ValidationError::NegativeBudget);
    }

    Ok(())
}
