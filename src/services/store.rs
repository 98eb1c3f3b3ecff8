use crate::models::{BloodGroup, DonorRecord, NewDonor};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors from the donor store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt donor row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Read/insert access to donor records.
///
/// The matching pipeline only ever reads; registration inserts. Behind a
/// trait so route handlers can run against an in-memory store in tests.
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// All donors whose blood group equals `group` exactly. An empty
    /// result is valid, not an error.
    async fn fetch_by_blood_group(&self, group: BloodGroup)
        -> Result<Vec<DonorRecord>, StoreError>;

    /// Insert a new donor, returning the assigned id.
    async fn insert(&self, donor: NewDonor) -> Result<i64, StoreError>;

    /// Whether the store is reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed donor store.
///
/// Connections are checked out of the pool per query and returned on every
/// exit path, so concurrent requests never share or leak a connection.
pub struct PostgresDonorStore {
    pool: PgPool,
}

impl PostgresDonorStore {
    /// Connect and run migrations.
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Connect using optional settings with the usual defaults.
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
        )
        .await
    }

    fn row_to_donor(row: &sqlx::postgres::PgRow) -> Result<DonorRecord, StoreError> {
        let id: i64 = row.get("id");
        let blood_group: String = row.get("blood_group");
        let blood_group = blood_group
            .parse::<BloodGroup>()
            .map_err(|e| StoreError::CorruptRow {
                id,
                reason: e.to_string(),
            })?;

        Ok(DonorRecord {
            id,
            name: row.get("name"),
            age: row.get("age"),
            weight_kg: row.get("weight_kg"),
            hemoglobin: row.get("hemoglobin"),
            blood_group,
            last_donation: row.get("last_donation"),
            contact: row.get("contact"),
            address: row.get("address"),
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
        })
    }
}

#[async_trait]
impl DonorStore for PostgresDonorStore {
    async fn fetch_by_blood_group(
        &self,
        group: BloodGroup,
    ) -> Result<Vec<DonorRecord>, StoreError> {
        let query = r#"
            SELECT id, name, age, weight_kg, hemoglobin, blood_group,
                   last_donation, contact, address, latitude, longitude
            FROM donors
            WHERE blood_group = $1
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(group.as_str())
            .fetch_all(&self.pool)
            .await?;

        let donors: Result<Vec<DonorRecord>, StoreError> =
            rows.iter().map(Self::row_to_donor).collect();
        let donors = donors?;

        tracing::debug!("Fetched {} donors for blood group {}", donors.len(), group);

        Ok(donors)
    }

    async fn insert(&self, donor: NewDonor) -> Result<i64, StoreError> {
        let query = r#"
            INSERT INTO donors
                (name, age, weight_kg, hemoglobin, blood_group,
                 last_donation, contact, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(&donor.name)
            .bind(donor.age)
            .bind(donor.weight_kg)
            .bind(donor.hemoglobin)
            .bind(donor.blood_group.as_str())
            .bind(donor.last_donation)
            .bind(&donor.contact)
            .bind(&donor.address)
            .bind(donor.latitude)
            .bind(donor.longitude)
            .fetch_one(&self.pool)
            .await?;

        let id: i64 = row.get("id");
        tracing::debug!("Registered donor {} ({})", id, donor.blood_group);

        Ok(id)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
