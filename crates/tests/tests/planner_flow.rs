use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use rihla_catalog::PlaceCatalog;
use rihla_concierge::{stored_days, ItineraryConcierge, SavePlanRequest};
use rihla_core::{
    BudgetTier, InterestTag, ItineraryPlanner, PlannerConfig, PriceLevel, TripConstraints,
};
use rihla_observability::PlannerMetrics;
use rihla_storage::{ItineraryRepository, SqliteStore, Store};

fn data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/places")
}

fn catalog() -> Arc<PlaceCatalog> {
    Arc::new(PlaceCatalog::from_path(data_root()).expect("catalog should load"))
}

fn concierge<S: ItineraryRepository>(store: S) -> ItineraryConcierge<S> {
    ItineraryConcierge::new(
        catalog(),
        ItineraryPlanner::new(PlannerConfig::default()),
        Arc::new(store),
        PlannerMetrics::shared(),
    )
}

fn trip(city: &str, days: u32, hours: f64) -> TripConstraints {
    TripConstraints {
        city: city.to_string(),
        days,
        hours_per_day: hours,
        start_time: Some("08:30".to_string()),
        interests: Vec::new(),
        budget: BudgetTier::Any,
    }
}

#[test]
fn madinah_plan_keeps_a_mosque_every_day() {
    let concierge = concierge(Store::memory());
    let response = concierge.plan(&trip("madinah", 3, 6.0)).unwrap();

    assert_eq!(response.days.len(), 3);
    for day in &response.days {
        assert!(day
            .visits
            .iter()
            .any(|visit| visit.interest == InterestTag::Religion));
        assert!(day
            .visits
            .iter()
            .all(|visit| visit.place.region == "Al Madinah Region"));
        assert_eq!(day.visits.first().map(|v| v.visit_start.as_str()), Some("08:30"));
    }
}

#[test]
fn makkah_default_interests_never_schedule_cafes() {
    let concierge = concierge(Store::memory());
    let response = concierge.plan(&trip("Makkah", 3, 9.0)).unwrap();

    let visits = response
        .days
        .iter()
        .flat_map(|day| day.visits.iter())
        .collect::<Vec<_>>();
    assert!(!visits.is_empty());
    assert!(visits.iter().all(|visit| !visit.place.is_cafe_like));
    assert!(visits.iter().any(|visit| visit.place.name == "Al Baik Aziziyah"));
}

#[test]
fn cheap_budget_only_admits_cheap_places_or_mosques() {
    let concierge = concierge(Store::memory());
    let mut request = trip("Riyadh", 2, 6.0);
    request.budget = BudgetTier::Cheap;
    request.interests = vec![InterestTag::Religion, InterestTag::History, InterestTag::Food];

    let response = concierge.plan(&request).unwrap();
    let mut seen = HashSet::new();

    for visit in response.days.iter().flat_map(|day| day.visits.iter()) {
        assert!(visit.place.is_mosque || visit.place.price_level == Some(PriceLevel::Cheap));
        if visit.interest != InterestTag::Religion {
            assert!(seen.insert(visit.place.identity.clone()));
        }
    }
    assert!(seen.contains("ry-002"));
}

#[test]
fn unknown_city_degrades_to_empty_days() {
    let concierge = concierge(Store::memory());
    let response = concierge.plan(&trip("Tabuk", 2, 6.0)).unwrap();

    assert_eq!(response.days.len(), 2);
    assert_eq!(response.summary.empty_days, 2);
    assert_eq!(response.summary.total_hours, 0.0);
}

#[test]
fn concurrent_plans_do_not_share_state() {
    let planner = ItineraryPlanner::default();
    let catalog = catalog();
    let request = trip("", 4, 7.5);

    let expected = planner.generate(catalog.places(), &request).unwrap();
    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(|| planner.generate(catalog.places(), &request).unwrap()))
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[tokio::test]
async fn sqlite_store_keeps_generated_plans() {
    let store = SqliteStore::in_memory().await.unwrap();
    let concierge = concierge(store);

    let response = concierge.plan(&trip("Jeddah", 2, 4.5)).unwrap();
    let record = concierge
        .save_plan(
            "traveller-1",
            SavePlanRequest {
                title: "Jeddah weekend".to_string(),
                main_destination: Some("Jeddah".to_string()),
                total_budget: Some(1_200),
                days: response.days.clone(),
                ..SavePlanRequest::default()
            },
        )
        .await
        .unwrap();

    let fetched = concierge
        .get_itinerary("traveller-1", &record.id)
        .await
        .unwrap()
        .expect("saved itinerary should be readable");
    assert_eq!(fetched.title, "Jeddah weekend");
    assert_eq!(stored_days(&fetched), Some(response.days));

    assert!(concierge
        .get_itinerary("someone-else", &record.id)
        .await
        .unwrap()
        .is_none());
    assert!(concierge
        .delete_itinerary("traveller-1", &record.id)
        .await
        .unwrap());
    assert!(concierge
        .list_itineraries("traveller-1")
        .await
        .unwrap()
        .is_empty());
}
