//! `SQLite` implementation of [`AlertSource`].
//!
//! Each sensor kind lives in its own table with the same `(id, state,
//! activated_at)` shape. Every `(kind, scope)` pair maps to one static query
//! joining that table with `devices`; no SQL is assembled at runtime.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use stopfire_app::ports::AlertSource;
use stopfire_domain::alert::{ActiveReading, AlertScope};
use stopfire_domain::error::StopfireError;
use stopfire_domain::id::{ChannelId, DeviceId};
use stopfire_domain::sensor::{SensorKind, SensorState};

use crate::error::StorageError;

struct Wrapper(ActiveReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sensor_id: i64 = row.try_get("sensor_id")?;
        let state: i64 = row.try_get("state")?;
        let activated_at: String = row.try_get("activated_at")?;
        let device_id: i64 = row.try_get("device_id")?;
        let device_serial: String = row.try_get("serial_number")?;

        Ok(Self(ActiveReading {
            sensor_id: ChannelId::new(sensor_id),
            state: SensorState::from_flag(state),
            activated_at,
            device_id: DeviceId::new(device_id),
            device_serial,
        }))
    }
}

macro_rules! active_query {
    ($table:literal, $column:literal, $predicate:literal) => {
        concat!(
            "SELECT s.id AS sensor_id, s.state, s.activated_at, d.id AS device_id, d.serial_number FROM ",
            $table,
            " s JOIN devices d ON d.",
            $column,
            " = s.id WHERE ",
            $predicate,
            " AND s.state = 1 ORDER BY s.activated_at DESC"
        )
    };
}

/// The three scoped queries of one sensor table.
struct Queries {
    by_owner: &'static str,
    by_device: &'static str,
    by_serial: &'static str,
}

macro_rules! queries {
    ($table:literal, $column:literal) => {
        Queries {
            by_owner: active_query!($table, $column, "d.owner_id = ?"),
            by_device: active_query!($table, $column, "d.id = ?"),
            by_serial: active_query!($table, $column, "d.serial_number = ?"),
        }
    };
}

static KY_026: Queries = queries!("ky_026", "ky026_id");
static MQ_2: Queries = queries!("mq_2", "mq2_id");
static MQ_135: Queries = queries!("mq_135", "mq135_id");
static DHT_22: Queries = queries!("dht_22", "dht22_id");

fn queries_for(kind: SensorKind) -> &'static Queries {
    match kind {
        SensorKind::Ky026 => &KY_026,
        SensorKind::Mq2 => &MQ_2,
        SensorKind::Mq135 => &MQ_135,
        SensorKind::Dht22 => &DHT_22,
    }
}

/// `SQLite`-backed alert source reading the four sensor tables.
pub struct SqliteAlertSource {
    pool: SqlitePool,
}

impl SqliteAlertSource {
    /// Create a new alert source using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AlertSource for SqliteAlertSource {
    fn find_active(
        &self,
        kind: SensorKind,
        scope: &AlertScope,
    ) -> impl Future<Output = Result<Vec<ActiveReading>, StopfireError>> + Send {
        let pool = self.pool.clone();
        let scope = scope.clone();
        async move {
            let queries = queries_for(kind);
            let query = match &scope {
                AlertScope::User(user_id) => {
                    sqlx::query_as::<_, Wrapper>(queries.by_owner).bind(user_id.get())
                }
                AlertScope::Device(device_id) => {
                    sqlx::query_as::<_, Wrapper>(queries.by_device).bind(device_id.get())
                }
                AlertScope::Serial(serial_number) => {
                    sqlx::query_as::<_, Wrapper>(queries.by_serial).bind(serial_number.clone())
                }
            };

            let rows = query.fetch_all(&pool).await.map_err(StorageError::from)?;
            tracing::trace!(%kind, rows = rows.len(), "sensor table read");

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
