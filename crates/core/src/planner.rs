use std::collections::HashSet;

use tracing::debug;

use crate::clock::{advance, duration_minutes, format_clock, parse_clock};
use crate::config::PlannerConfig;
use crate::error::ValidationError;
use crate::models::{BudgetTier, DayPlan, InterestTag, Place, RawPlace, ScheduledVisit, TripConstraints};

const FALLBACK_START_MINUTES: u32 = 9 * 60;
const MAX_HOURS_PER_DAY: f64 = 24.0;

/// Greedy day-by-day allocator over a place catalog.
///
/// Each call to [`ItineraryPlanner::generate`] owns its cursors and used-place
/// set, so a single planner can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ItineraryPlanner {
    config: PlannerConfig,
}

pub fn generate(
    catalog: &[RawPlace],
    constraints: &TripConstraints,
) -> Result<Vec<DayPlan>, ValidationError> {
    ItineraryPlanner::default().generate(catalog, constraints)
}

impl ItineraryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn generate(
        &self,
        catalog: &[RawPlace],
        constraints: &TripConstraints,
    ) -> Result<Vec<DayPlan>, ValidationError> {
        self.validate(constraints)?;

        let days = constraints.days;
        let interests = self.requested_interests(constraints);
        let city = constraints.city.trim().to_lowercase();
        let restrict_cafes = self.restricts_cafes(&city, &interests);
        let start = constraints
            .start_time
            .as_deref()
            .and_then(parse_clock)
            .or_else(|| parse_clock(&self.config.default_start_time))
            .unwrap_or(FALLBACK_START_MINUTES);

        let mut ranked = catalog
            .iter()
            .map(|raw| Place::enrich(raw, self.config.default_visit_hours))
            .filter(|place| admits(place, &city, constraints.budget, &interests, restrict_cafes))
            .collect::<Vec<_>>();

        if ranked.is_empty() {
            debug!(city = %city, days, "no places matched; returning empty days");
            return Ok((1..=days).map(DayPlan::empty).collect());
        }

        ranked.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero()));

        let slots_per_day =
            ((constraints.hours_per_day / self.config.average_visit_hours).floor() as usize).max(1);
        let max_cafes_per_day = if restrict_cafes { 0 } else { slots_per_day };

        let mut context = AllocationContext::new(&ranked, &interests);
        let plans = (1..=days)
            .map(|day| {
                let picks = context.allocate_day(day, slots_per_day, max_cafes_per_day);
                schedule_day(day, &picks, start)
            })
            .collect::<Vec<_>>();

        debug!(
            city = %city,
            days,
            candidates = ranked.len(),
            slots_per_day,
            restrict_cafes,
            visits = plans.iter().map(|plan| plan.visits.len()).sum::<usize>(),
            "itinerary generated"
        );

        Ok(plans)
    }

    fn validate(&self, constraints: &TripConstraints) -> Result<(), ValidationError> {
        if constraints.days < 1 {
            return Err(ValidationError::InvalidDays);
        }
        if let Some(max) = self.config.max_days {
            if constraints.days > max {
                return Err(ValidationError::TooManyDays {
                    max,
                    got: constraints.days,
                });
            }
        }
        let hours = constraints.hours_per_day;
        if !hours.is_finite() || hours <= 0.0 || hours > MAX_HOURS_PER_DAY {
            return Err(ValidationError::InvalidHoursPerDay(constraints.hours_per_day));
        }
        Ok(())
    }

    fn requested_interests(&self, constraints: &TripConstraints) -> Vec<InterestTag> {
        let source = if constraints.interests.is_empty() {
            &self.config.default_interests
        } else {
            &constraints.interests
        };

        let mut seen = HashSet::new();
        source.iter().copied().filter(|tag| seen.insert(*tag)).collect()
    }

    fn restricts_cafes(&self, city: &str, interests: &[InterestTag]) -> bool {
        let restricted_city = !city.is_empty()
            && self
                .config
                .cafe_restricted_cities
                .iter()
                .any(|name| city.contains(&name.to_lowercase()));

        restricted_city
            && interests.contains(&InterestTag::Food)
            && interests.iter().any(|tag| *tag != InterestTag::Food)
    }
}

fn admits(
    place: &Place,
    city: &str,
    budget: BudgetTier,
    interests: &[InterestTag],
    restrict_cafes: bool,
) -> bool {
    let region_match = city.is_empty() || place.region.to_lowercase().contains(city);
    let budget_match = place.is_mosque || budget.admits(place.price_level);
    let interest_match = interests.iter().any(|tag| place.has_tag(*tag));

    region_match && budget_match && interest_match && !(restrict_cafes && place.is_cafe_like)
}

struct Bucket {
    interest: InterestTag,
    members: Vec<usize>,
    cursor: usize,
}

struct AllocationContext<'a> {
    places: &'a [Place],
    buckets: Vec<Bucket>,
    used: HashSet<&'a str>,
}

impl<'a> AllocationContext<'a> {
    fn new(places: &'a [Place], interests: &[InterestTag]) -> Self {
        let buckets = interests
            .iter()
            .map(|&interest| {
                let mut members = places
                    .iter()
                    .enumerate()
                    .filter(|(_, place)| place.has_tag(interest))
                    .map(|(index, _)| index)
                    .collect::<Vec<_>>();

                if interest == InterestTag::Food {
                    members.sort_by(|&a, &b| {
                        let (a, b) = (&places[a], &places[b]);
                        a.is_cafe_like
                            .cmp(&b.is_cafe_like)
                            .then_with(|| b.rating_or_zero().total_cmp(&a.rating_or_zero()))
                    });
                }

                Bucket {
                    interest,
                    members,
                    cursor: 0,
                }
            })
            .filter(|bucket| !bucket.members.is_empty())
            .collect();

        Self {
            places,
            buckets,
            used: HashSet::new(),
        }
    }

    fn allocate_day(
        &mut self,
        day: u32,
        slots: usize,
        max_cafes: usize,
    ) -> Vec<(&'a Place, InterestTag)> {
        let mut picks = Vec::new();
        if self.buckets.is_empty() {
            return picks;
        }

        let len = self.buckets.len();
        let offset = (day as usize - 1) % len;
        let order = (0..len).map(|i| (i + offset) % len).collect::<Vec<_>>();
        let mut cafes = 0_usize;

        // One pick per interest before any interest gets a second.
        for &slot in &order {
            if picks.len() >= slots {
                break;
            }
            if let Some(pick) = self.pick(slot, &mut cafes, max_cafes) {
                picks.push(pick);
            }
        }

        while picks.len() < slots {
            let mut progressed = false;
            for &slot in &order {
                if picks.len() >= slots {
                    break;
                }
                if let Some(pick) = self.pick(slot, &mut cafes, max_cafes) {
                    picks.push(pick);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        picks
    }

    fn pick(
        &mut self,
        slot: usize,
        cafes: &mut usize,
        max_cafes: usize,
    ) -> Option<(&'a Place, InterestTag)> {
        let places = self.places;
        let bucket = &mut self.buckets[slot];
        let repeatable = bucket.interest == InterestTag::Religion;
        let len = bucket.members.len();

        for step in 0..len {
            let position = (bucket.cursor + step) % len;
            let place = &places[bucket.members[position]];

            if !repeatable && self.used.contains(place.identity.as_str()) {
                continue;
            }
            if bucket.interest == InterestTag::Food && place.is_cafe_like && *cafes >= max_cafes {
                continue;
            }

            bucket.cursor = (position + 1) % len;
            if !repeatable {
                self.used.insert(place.identity.as_str());
            }
            if place.is_cafe_like {
                *cafes += 1;
            }
            return Some((place, bucket.interest));
        }

        None
    }
}

fn schedule_day(day: u32, picks: &[(&Place, InterestTag)], start: u32) -> DayPlan {
    let mut clock = start;
    let mut total_hours = 0.0;
    let mut visits = Vec::with_capacity(picks.len());

    for &(place, interest) in picks {
        let visit_end = advance(clock, duration_minutes(place.estimated_duration_hours));
        visits.push(ScheduledVisit {
            place: place.clone(),
            interest,
            visit_start: format_clock(clock),
            visit_end: format_clock(visit_end),
        });
        clock = visit_end;
        total_hours += place.estimated_duration_hours;
    }

    DayPlan {
        day,
        total_hours,
        visits,
    }
}
