use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rihla_catalog::PlaceCatalog;
use rihla_concierge::{ItineraryConcierge, SavePlanRequest};
use rihla_core::{BudgetTier, InterestTag, ItineraryPlanner, PlannerConfig, TripConstraints};
use rihla_observability::{init_tracing, PlannerMetrics};
use rihla_storage::Store;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "rihla")]
#[command(about = "Day-by-day itinerary planner over a place catalog")]
struct Cli {
    /// Catalog file or directory of JSON place files.
    #[arg(long, env = "RIHLA_CATALOG", default_value = "data/places")]
    catalog: PathBuf,

    /// Optional planner configuration (JSON).
    #[arg(long, env = "RIHLA_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Plan {
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value_t = 1)]
        days: u32,
        #[arg(long, default_value_t = 6.0)]
        hours: f64,
        #[arg(long)]
        start: Option<String>,
        #[arg(long = "interest", value_parser = parse_interest)]
        interests: Vec<InterestTag>,
        #[arg(long, default_value = "any", value_parser = parse_budget)]
        budget: BudgetTier,
        #[arg(long)]
        save: bool,
        #[arg(long, default_value = "local")]
        user: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        total_budget: Option<i64>,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    Itineraries {
        #[command(subcommand)]
        command: ItineraryCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    Stats {
        #[arg(long)]
        city: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ItineraryCommand {
    List {
        #[arg(long, default_value = "local")]
        user: String,
    },
    Show {
        id: String,
        #[arg(long, default_value = "local")]
        user: String,
    },
    Delete {
        id: String,
        #[arg(long, default_value = "local")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("rihla_cli");
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let concierge = build_concierge(&cli.catalog, config).await?;

    match cli.command {
        Command::Plan {
            city,
            days,
            hours,
            start,
            interests,
            budget,
            save,
            user,
            title,
            start_date,
            end_date,
            total_budget,
        } => {
            let response = concierge.plan(&TripConstraints {
                city,
                days,
                hours_per_day: hours,
                start_time: start,
                interests,
                budget,
            })?;

            if !save {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            let title = title.unwrap_or_else(|| default_title(&response.city, days));
            let record = concierge
                .save_plan(
                    &user,
                    SavePlanRequest {
                        title,
                        main_destination: Some(response.city.clone()),
                        start_date,
                        end_date,
                        total_budget,
                        days: response.days.clone(),
                    },
                )
                .await?;

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "plan": response, "saved": record }))?
            );
        }
        Command::Catalog { command } => match command {
            CatalogCommand::Stats { city } => {
                let catalog = concierge.catalog();
                let histogram =
                    catalog.interest_histogram(city.as_deref(), concierge.planner().config());
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "stats": catalog.stats(),
                        "regions": catalog.regions(),
                        "interests": histogram,
                    }))?
                );
            }
        },
        Command::Itineraries { command } => match command {
            ItineraryCommand::List { user } => {
                let records = concierge.list_itineraries(&user).await?;
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            ItineraryCommand::Show { id, user } => {
                let Some(record) = concierge.get_itinerary(&user, &id).await? else {
                    bail!("itinerary {id} not found");
                };
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            ItineraryCommand::Delete { id, user } => {
                if !concierge.delete_itinerary(&user, &id).await? {
                    bail!("itinerary {id} not found");
                }
                println!("{}", json!({ "deleted": id }));
            }
        },
    }

    Ok(())
}

fn parse_interest(value: &str) -> Result<InterestTag, String> {
    InterestTag::parse(value).ok_or_else(|| {
        format!("unknown interest '{value}' (expected religion, food, entertainment or history)")
    })
}

fn parse_budget(value: &str) -> Result<BudgetTier, String> {
    BudgetTier::parse(value)
        .ok_or_else(|| format!("unknown budget '{value}' (expected any, cheap, medium or luxury)"))
}

fn default_title(city: &str, days: u32) -> String {
    if city.is_empty() {
        format!("{days}-day trip")
    } else {
        format!("{days}-day trip in {city}")
    }
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading planner config {}", path.display()))?;
    PlannerConfig::from_json(&raw)
        .with_context(|| format!("invalid planner config {}", path.display()))
}

async fn build_concierge(catalog_path: &Path, config: PlannerConfig) -> Result<ItineraryConcierge<Store>> {
    let catalog = PlaceCatalog::from_path(catalog_path)
        .with_context(|| format!("failed loading place catalog from {}", catalog_path.display()))?;

    let store = if let Ok(database_url) = env::var("RIHLA_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    Ok(ItineraryConcierge::new(
        Arc::new(catalog),
        ItineraryPlanner::new(config),
        Arc::new(store),
        PlannerMetrics::shared(),
    ))
}
