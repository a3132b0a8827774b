use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use rihla_core::{ItineraryRecord, NewItinerary};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::warn;
use uuid::Uuid;

/// Owner-scoped store for generated plans. Plans are kept as opaque JSON.
pub trait ItineraryRepository: Send + Sync {
    async fn create_itinerary(&self, user_id: &str, draft: NewItinerary) -> Result<ItineraryRecord>;
    async fn list_itineraries(&self, user_id: &str) -> Result<Vec<ItineraryRecord>>;
    async fn get_itinerary(&self, user_id: &str, id: &str) -> Result<Option<ItineraryRecord>>;
    async fn delete_itinerary(&self, user_id: &str, id: &str) -> Result<bool>;
}

fn new_record(user_id: &str, draft: NewItinerary) -> ItineraryRecord {
    ItineraryRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: draft.title.trim().to_string(),
        main_destination: draft.main_destination,
        start_date: draft.start_date,
        end_date: draft.end_date,
        total_budget: draft.total_budget,
        plan_details: draft.plan_details,
        created_at: Utc::now(),
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    itineraries: Arc<RwLock<HashMap<String, Vec<ItineraryRecord>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItineraryRepository for MemoryStore {
    async fn create_itinerary(&self, user_id: &str, draft: NewItinerary) -> Result<ItineraryRecord> {
        let record = new_record(user_id, draft);
        self.itineraries
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_itineraries(&self, user_id: &str) -> Result<Vec<ItineraryRecord>> {
        let mut records = self
            .itineraries
            .read()
            .get(user_id)
            .map(|records| records.iter().rev().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get_itinerary(&self, user_id: &str, id: &str) -> Result<Option<ItineraryRecord>> {
        Ok(self
            .itineraries
            .read()
            .get(user_id)
            .and_then(|records| records.iter().find(|record| record.id == id).cloned()))
    }

    async fn delete_itinerary(&self, user_id: &str, id: &str) -> Result<bool> {
        let mut guard = self.itineraries.write();
        let Some(records) = guard.get_mut(user_id) else {
            return Ok(false);
        };

        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database on a single connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("failed opening in-memory sqlite")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS itineraries (
              id TEXT PRIMARY KEY,
              user_id TEXT NOT NULL,
              title TEXT NOT NULL,
              main_destination TEXT,
              start_date TEXT,
              end_date TEXT,
              total_budget INTEGER,
              plan_json TEXT NOT NULL,
              created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_itineraries_user ON itineraries (user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> ItineraryRecord {
    let id: String = row.get("id");
    let plan_json: String = row.get("plan_json");
    let plan_details = serde_json::from_str(&plan_json).unwrap_or_else(|error| {
        warn!(itinerary_id = %id, %error, "stored plan is not valid json");
        serde_json::Value::Null
    });
    let created_at = row
        .get::<String, _>("created_at")
        .parse::<DateTime<Utc>>()
        .unwrap_or_else(|error| {
            warn!(itinerary_id = %id, %error, "stored created_at is not rfc3339; using current time");
            Utc::now()
        });

    ItineraryRecord {
        user_id: row.get("user_id"),
        title: row.get("title"),
        main_destination: row.get("main_destination"),
        start_date: parse_date(row.get("start_date")),
        end_date: parse_date(row.get("end_date")),
        total_budget: row.get("total_budget"),
        plan_details,
        created_at,
        id,
    }
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|text| text.parse().ok())
}

impl ItineraryRepository for SqliteStore {
    async fn create_itinerary(&self, user_id: &str, draft: NewItinerary) -> Result<ItineraryRecord> {
        let record = new_record(user_id, draft);
        let plan_json = serde_json::to_string(&record.plan_details)?;

        sqlx::query(
            r#"
            INSERT INTO itineraries
              (id, user_id, title, main_destination, start_date, end_date, total_budget, plan_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.title)
        .bind(&record.main_destination)
        .bind(record.start_date.map(|date| date.to_string()))
        .bind(record.end_date.map(|date| date.to_string()))
        .bind(record.total_budget)
        .bind(plan_json)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_itineraries(&self, user_id: &str) -> Result<Vec<ItineraryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, main_destination, start_date, end_date,
                   total_budget, plan_json, created_at
            FROM itineraries
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn get_itinerary(&self, user_id: &str, id: &str) -> Result<Option<ItineraryRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, main_destination, start_date, end_date,
                   total_budget, plan_json, created_at
            FROM itineraries
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn delete_itinerary(&self, user_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM itineraries WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
        }
    }
}

impl ItineraryRepository for Store {
    async fn create_itinerary(&self, user_id: &str, draft: NewItinerary) -> Result<ItineraryRecord> {
        match self {
            Store::Memory(store) => store.create_itinerary(user_id, draft).await,
            Store::Sqlite(store) => store.create_itinerary(user_id, draft).await,
        }
    }

    async fn list_itineraries(&self, user_id: &str) -> Result<Vec<ItineraryRecord>> {
        match self {
            Store::Memory(store) => store.list_itineraries(user_id).await,
            Store::Sqlite(store) => store.list_itineraries(user_id).await,
        }
    }

    async fn get_itinerary(&self, user_id: &str, id: &str) -> Result<Option<ItineraryRecord>> {
        match self {
            Store::Memory(store) => store.get_itinerary(user_id, id).await,
            Store::Sqlite(store) => store.get_itinerary(user_id, id).await,
        }
    }

    async fn delete_itinerary(&self, user_id: &str, id: &str) -> Result<bool> {
        match self {
            Store::Memory(store) => store.delete_itinerary(user_id, id).await,
            Store::Sqlite(store) => store.delete_itinerary(user_id, id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(title: &str) -> NewItinerary {
        NewItinerary {
            title: title.to_string(),
            main_destination: Some("Madinah".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 20),
            end_date: NaiveDate::from_ymd_opt(2025, 11, 22),
            total_budget: Some(3_000),
            plan_details: json!([{ "day": 1, "total_hours": 1.5, "visits": [] }]),
        }
    }

    async fn exercise(store: &impl ItineraryRepository) {
        let first = store.create_itinerary("u-1", draft("Quiet days")).await.unwrap();
        let second = store.create_itinerary("u-1", draft("Family trip")).await.unwrap();
        store.create_itinerary("u-2", draft("Someone else")).await.unwrap();

        let listed = store.list_itineraries("u-1").await.unwrap();
        assert_eq!(
            listed.iter().map(|record| record.id.as_str()).collect::<Vec<_>>(),
            vec![second.id.as_str(), first.id.as_str()]
        );

        let fetched = store.get_itinerary("u-1", &first.id).await.unwrap().unwrap();
        assert_eq!(fetched.plan_details, first.plan_details);
        assert_eq!(fetched.start_date, first.start_date);
        assert_eq!(fetched.total_budget, Some(3_000));

        assert!(store.get_itinerary("u-2", &first.id).await.unwrap().is_none());
        assert!(!store.delete_itinerary("u-2", &first.id).await.unwrap());
        assert!(store.delete_itinerary("u-1", &first.id).await.unwrap());
        assert!(store.get_itinerary("u-1", &first.id).await.unwrap().is_none());
        assert_eq!(store.list_itineraries("u-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_store_is_owner_scoped() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_plans() {
        let store = SqliteStore::in_memory().await.unwrap();
        exercise(&store).await;
    }

    #[tokio::test]
    async fn sqlite_store_reads_rows_with_damaged_columns() {
        let store = SqliteStore::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO itineraries (id, user_id, title, plan_json, created_at) \
             VALUES ('legacy-1', 'u-1', 'Imported', 'not json', 'yesterday')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let before = Utc::now();
        let record = store.get_itinerary("u-1", "legacy-1").await.unwrap().unwrap();
        assert_eq!(record.title, "Imported");
        assert_eq!(record.plan_details, serde_json::Value::Null);
        assert!(record.created_at >= before);
        assert_eq!(store.list_itineraries("u-1").await.unwrap().len(), 1);
    }
}
