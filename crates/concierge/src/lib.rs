use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use rihla_catalog::PlaceCatalog;
use rihla_core::{
    validate_new_itinerary, DayPlan, ItineraryPlanner, ItineraryRecord, NewItinerary,
    PlanResponse, PlanSummary, TripConstraints,
};
use rihla_observability::PlannerMetrics;
use rihla_storage::ItineraryRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavePlanRequest {
    pub title: String,
    #[serde(default)]
    pub main_destination: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub total_budget: Option<i64>,
    pub days: Vec<DayPlan>,
}

/// Ties the catalog, planner and itinerary store together for callers.
#[derive(Clone)]
pub struct ItineraryConcierge<S>
where
    S: ItineraryRepository,
{
    catalog: Arc<PlaceCatalog>,
    planner: ItineraryPlanner,
    store: Arc<S>,
    metrics: Arc<PlannerMetrics>,
}

impl<S> ItineraryConcierge<S>
where
    S: ItineraryRepository,
{
    pub fn new(
        catalog: Arc<PlaceCatalog>,
        planner: ItineraryPlanner,
        store: Arc<S>,
        metrics: Arc<PlannerMetrics>,
    ) -> Self {
        Self {
            catalog,
            planner,
            store,
            metrics,
        }
    }

    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    pub fn planner(&self) -> &ItineraryPlanner {
        &self.planner
    }

    #[instrument(skip(self, constraints), fields(city = %constraints.city, days = constraints.days))]
    pub fn plan(&self, constraints: &TripConstraints) -> Result<PlanResponse> {
        let started = Instant::now();

        let days = match self.planner.generate(self.catalog.places(), constraints) {
            Ok(days) => days,
            Err(error) => {
                self.metrics.inc_rejected();
                warn!(%error, "plan request rejected");
                return Err(error.into());
            }
        };

        let summary = PlanSummary::from_days(&days);
        self.metrics
            .record_plan(summary.scheduled_visits, summary.empty_days, started.elapsed());

        info!(
            visits = summary.scheduled_visits,
            distinct_places = summary.distinct_places,
            empty_days = summary.empty_days,
            "plan generated"
        );

        Ok(PlanResponse {
            city: constraints.city.trim().to_string(),
            days,
            summary,
        })
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn save_plan(&self, user_id: &str, request: SavePlanRequest) -> Result<ItineraryRecord> {
        let draft = NewItinerary {
            title: request.title,
            main_destination: request
                .main_destination
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            start_date: request.start_date,
            end_date: request.end_date,
            total_budget: request.total_budget,
            plan_details: serde_json::to_value(&request.days)?,
        };
        validate_new_itinerary(&draft)?;

        let record = self.store.create_itinerary(user_id, draft).await?;
        self.metrics.inc_saved();
        info!(itinerary_id = %record.id, user_id, "itinerary saved");

        Ok(record)
    }

    pub async fn list_itineraries(&self, user_id: &str) -> Result<Vec<ItineraryRecord>> {
        self.store.list_itineraries(user_id).await
    }

    pub async fn get_itinerary(&self, user_id: &str, id: &str) -> Result<Option<ItineraryRecord>> {
        self.store.get_itinerary(user_id, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_itinerary(&self, user_id: &str, id: &str) -> Result<bool> {
        let removed = self.store.delete_itinerary(user_id, id).await?;
        if removed {
            info!("itinerary deleted");
        }
        Ok(removed)
    }

    pub fn metrics(&self) -> &PlannerMetrics {
        &self.metrics
    }
}

/// Rebuilds the day plans from a stored record, if they are still readable.
pub fn stored_days(record: &ItineraryRecord) -> Option<Vec<DayPlan>> {
    serde_json::from_value(record.plan_details.clone()).ok()
}
