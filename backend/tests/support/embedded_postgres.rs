//! Embedded PostgreSQL databases for repository integration tests.
//!
//! One cluster is shared per test binary. Each test gets a fresh database
//! cloned from a template that already carries the tracker migrations; the
//! template name embeds a hash of `migrations/` so schema edits rebuild it.
//!
//! Seeding and assertions go through a synchronous `PgConnection` so they
//! never run inside the Tokio runtime the repositories use.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use diesel::pg::PgConnection;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl};
use mytrucktracker::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "tracker_template";

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, String> {
    let hash = hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the migrated template once per cluster and return its name.
fn ensure_template_database(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        runtime
            .block_on(run_migrations(&url))
            .map_err(|err| err.to_string())?;
    }
    Ok(template_name)
}

#[derive(QueryableByName)]
struct Scalar {
    #[diesel(sql_type = BigInt)]
    value: i64,
}

#[derive(QueryableByName)]
struct OptionalText {
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

/// A migrated, throwaway tracker database with a small pool onto it.
pub struct TrackerDatabase {
    /// Runtime driving the async repositories.
    pub runtime: Runtime,
    /// Pool handed to the adapters under test.
    pub pool: DbPool,
    url: String,
    _database: TemporaryDatabase,
}

impl TrackerDatabase {
    /// Clone the template into a uniquely named database and pool onto it.
    pub fn provision() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let cluster = shared_cluster_handle().map_err(|err| format!("{err:?}"))?;
        let template = ensure_template_database(cluster, &runtime)?;
        let name = format!("test_{}", Uuid::new_v4().simple());
        let database = cluster
            .temporary_database_from_template(name.as_str(), template.as_str())
            .map_err(|err| format!("create database from template: {err:?}"))?;
        let url = database.url().to_string();

        let config = PoolConfig::new(&url).with_max_size(2).with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            runtime,
            pool,
            url,
            _database: database,
        })
    }

    fn connect(&self) -> PgConnection {
        PgConnection::establish(&self.url).expect("seed connection")
    }

    /// Run a single statement, panicking on failure.
    pub fn execute(&self, sql: &str) {
        diesel::sql_query(sql)
            .execute(&mut self.connect())
            .unwrap_or_else(|err| panic!("{sql}: {err}"));
    }

    /// Read a single `BIGINT` aliased as `value`.
    pub fn scalar(&self, sql: &str) -> i64 {
        diesel::sql_query(sql)
            .get_result::<Scalar>(&mut self.connect())
            .unwrap_or_else(|err| panic!("{sql}: {err}"))
            .value
    }

    /// Read a nullable text column aliased as `value` from exactly one row.
    pub fn optional_text(&self, sql: &str) -> Option<String> {
        diesel::sql_query(sql)
            .get_result::<OptionalText>(&mut self.connect())
            .unwrap_or_else(|err| panic!("{sql}: {err}"))
            .value
    }

    /// Row count of `table`.
    pub fn count(&self, table: &str) -> i64 {
        self.scalar(&format!("SELECT COUNT(*) AS value FROM {table}"))
    }

    /// Insert a user and return its id.
    pub fn insert_user(&self, username: &str, steam_id: &str, is_admin: bool) -> i64 {
        self.scalar(&format!(
            "INSERT INTO users (username, steam_id, is_admin) \
             VALUES ('{username}', '{steam_id}', {is_admin}) RETURNING id AS value"
        ))
    }

    /// Insert an unfinished job owned by `user_id` and return its id.
    pub fn insert_job(&self, user_id: i64, steam_id: &str) -> i64 {
        self.scalar(&format!(
            "INSERT INTO jobs (user_id, driver_steam_id, game, truck, cargo, \
                source_city, source_company, destination_city, destination_company, \
                planned_distance_km, truck_license_plate, truck_license_plate_country, \
                truck_plate_code, truck_plate_country_id, trailer_license_plate, \
                trailer_license_plate_country, trailer_plate_code, trailer_plate_country_id, \
                start_time) \
             VALUES ({user_id}, '{steam_id}', 'ets2', 'Scania R', 'Apples', \
                'Calais', 'TREK', 'Paris', 'LkwLog', 312.5, 'AB 123', 'France', \
                'F', 'france', 'CD 456', 'France', 'F', 'france', NOW()) \
             RETURNING id AS value"
        ))
    }
}
