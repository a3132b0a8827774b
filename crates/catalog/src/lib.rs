mod records;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use rihla_core::{InterestTag, Place, PlannerConfig, RawPlace};
use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

pub use records::{parse_records, ParsedRecords};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    pub records_loaded: usize,
    pub source_files: usize,
    pub skipped_records: usize,
}

/// Read-only set of raw place records, loaded once and shared between plans.
#[derive(Debug, Clone, Default)]
pub struct PlaceCatalog {
    places: Vec<RawPlace>,
    stats: CatalogStats,
}

impl PlaceCatalog {
    pub fn from_places(places: Vec<RawPlace>) -> Self {
        let stats = CatalogStats {
            records_loaded: places.len(),
            source_files: 0,
            skipped_records: 0,
        };
        Self { places, stats }
    }

    /// Loads a single `.json` file or every `.json` file below a directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        let files = if root.is_dir() {
            let mut files = WalkDir::new(root)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("json"))
                .map(|entry| entry.into_path())
                .collect::<Vec<_>>();
            files.sort();
            files
        } else {
            vec![root.to_path_buf()]
        };

        let mut places = Vec::new();
        let mut stats = CatalogStats::default();

        for file in &files {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("failed reading place catalog: {}", file.display()))?;
            let parsed = parse_records(&raw)
                .with_context(|| format!("invalid place catalog: {}", file.display()))?;

            if parsed.skipped > 0 {
                warn!(
                    file = %file.display(),
                    skipped = parsed.skipped,
                    "skipped malformed place records"
                );
            }

            stats.source_files += 1;
            stats.skipped_records += parsed.skipped;
            places.extend(parsed.places);
        }

        stats.records_loaded = places.len();
        info!(
            root = %root.display(),
            records = stats.records_loaded,
            files = stats.source_files,
            "place catalog loaded"
        );

        Ok(Self { places, stats })
    }

    pub fn places(&self) -> &[RawPlace] {
        &self.places
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats.clone()
    }

    pub fn regions(&self) -> Vec<String> {
        self.places
            .iter()
            .filter_map(|place| place.region.as_deref())
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .map(ToString::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Count of places per interest tag, optionally limited to one city.
    pub fn interest_histogram(
        &self,
        city: Option<&str>,
        config: &PlannerConfig,
    ) -> BTreeMap<InterestTag, usize> {
        let city = city.map(|value| value.trim().to_lowercase());
        let mut histogram = BTreeMap::new();

        for raw in &self.places {
            let place = Place::enrich(raw, config.default_visit_hours);
            if let Some(city) = &city {
                if !place.region.to_lowercase().contains(city.as_str()) {
                    continue;
                }
            }
            for tag in place.interest_tags {
                *histogram.entry(tag).or_insert(0) += 1;
            }
        }

        histogram
    }
}
