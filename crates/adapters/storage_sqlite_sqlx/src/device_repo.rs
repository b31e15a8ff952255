//! `SQLite` implementation of [`DeviceRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use stopfire_app::ports::DeviceRepository;
use stopfire_domain::device::{Device, NewDevice};
use stopfire_domain::error::{ConflictError, NotFoundError, StopfireError};
use stopfire_domain::id::{ChannelId, DeviceId, UserId};
use stopfire_domain::sensor::{SensorChannels, SensorKind};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }

    fn many(values: Vec<Self>) -> Vec<Device> {
        values.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let serial_number: String = row.try_get("serial_number")?;
        let ky026: Option<i64> = row.try_get("ky026_id")?;
        let mq2: Option<i64> = row.try_get("mq2_id")?;
        let mq135: Option<i64> = row.try_get("mq135_id")?;
        let dht22: Option<i64> = row.try_get("dht22_id")?;
        let owner_id: Option<i64> = row.try_get("owner_id")?;

        Ok(Self(Device {
            id: DeviceId::new(id),
            serial_number,
            channels: SensorChannels {
                ky026: ky026.map(ChannelId::new),
                mq2: mq2.map(ChannelId::new),
                mq135: mq135.map(ChannelId::new),
                dht22: dht22.map(ChannelId::new),
            },
            owner_id: owner_id.map(UserId::new),
        }))
    }
}

const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_BY_SERIAL: &str = "SELECT * FROM devices WHERE serial_number = ?";
const SELECT_BY_OWNER: &str = "SELECT * FROM devices WHERE owner_id = ? ORDER BY id";
const SELECT_UNOWNED: &str = "SELECT * FROM devices WHERE owner_id IS NULL ORDER BY id";
const INSERT: &str = "INSERT INTO devices (serial_number, ky026_id, mq2_id, mq135_id, dht22_id, owner_id) VALUES (?, ?, ?, ?, ?, ?)";
const UPDATE: &str = "UPDATE devices SET serial_number = ?, ky026_id = ?, mq2_id = ?, mq135_id = ?, dht22_id = ?, owner_id = ? WHERE id = ?";
const UPDATE_CHANNELS: &str =
    "UPDATE devices SET ky026_id = ?, mq2_id = ?, mq135_id = ?, dht22_id = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";
const CLAIM: &str =
    "UPDATE devices SET owner_id = ? WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)";
const RELEASE: &str = "UPDATE devices SET owner_id = NULL WHERE id = ? AND owner_id IS NOT NULL";

/// Sensor rows referenced by a device must exist before the device row does.
const fn seed_query(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Ky026 => "INSERT OR IGNORE INTO ky_026 (id) VALUES (?)",
        SensorKind::Mq2 => "INSERT OR IGNORE INTO mq_2 (id) VALUES (?)",
        SensorKind::Mq135 => "INSERT OR IGNORE INTO mq_135 (id) VALUES (?)",
        SensorKind::Dht22 => "INSERT OR IGNORE INTO dht_22 (id) VALUES (?)",
    }
}

/// Turn a unique-constraint failure on `serial_number` into a domain conflict.
fn write_error(err: sqlx::Error, serial_number: &str) -> StopfireError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ConflictError::DuplicateSerial(serial_number.to_string()).into()
        }
        _ => StorageError::from(err).into(),
    }
}

async fn seed_channels(
    conn: &mut SqliteConnection,
    channels: &SensorChannels,
) -> Result<(), sqlx::Error> {
    for (kind, id) in channels.iter() {
        sqlx::query(seed_query(kind))
            .bind(id.get())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// `SQLite`-backed device registry.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            seed_channels(&mut tx, &device.channels)
                .await
                .map_err(StorageError::from)?;

            let result = sqlx::query(INSERT)
                .bind(&device.serial_number)
                .bind(device.channels.ky026.map(ChannelId::get))
                .bind(device.channels.mq2.map(ChannelId::get))
                .bind(device.channels.mq135.map(ChannelId::get))
                .bind(device.channels.dht22.map(ChannelId::get))
                .bind(device.owner_id.map(UserId::get))
                .execute(&mut *tx)
                .await
                .map_err(|err| write_error(err, &device.serial_number))?;

            tx.commit().await.map_err(StorageError::from)?;

            Ok(device.with_id(DeviceId::new(result.last_insert_rowid())))
        }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_serial(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Device>, StopfireError>> + Send {
        let pool = self.pool.clone();
        let serial_number = serial_number.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SERIAL)
                .bind(serial_number)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Device>, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
                .bind(owner_id.get())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn find_unowned(&self) -> impl Future<Output = Result<Vec<Device>, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_UNOWNED)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            seed_channels(&mut tx, &device.channels)
                .await
                .map_err(StorageError::from)?;

            let result = sqlx::query(UPDATE)
                .bind(&device.serial_number)
                .bind(device.channels.ky026.map(ChannelId::get))
                .bind(device.channels.mq2.map(ChannelId::get))
                .bind(device.channels.mq135.map(ChannelId::get))
                .bind(device.channels.dht22.map(ChannelId::get))
                .bind(device.owner_id.map(UserId::get))
                .bind(device.id.get())
                .execute(&mut *tx)
                .await
                .map_err(|err| write_error(err, &device.serial_number))?;

            // dropping the transaction rolls the seeded sensor rows back
            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into());
            }

            tx.commit().await.map_err(StorageError::from)?;

            Ok(device)
        }
    }

    fn set_channels(
        &self,
        id: DeviceId,
        channels: SensorChannels,
    ) -> impl Future<Output = Result<bool, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            seed_channels(&mut tx, &channels)
                .await
                .map_err(StorageError::from)?;

            let result = sqlx::query(UPDATE_CHANNELS)
                .bind(channels.ky026.map(ChannelId::get))
                .bind(channels.mq2.map(ChannelId::get))
                .bind(channels.mq135.map(ChannelId::get))
                .bind(channels.dht22.map(ChannelId::get))
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Ok(false);
            }

            tx.commit().await.map_err(StorageError::from)?;

            Ok(true)
        }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn set_owner(
        &self,
        id: DeviceId,
        owner_id: UserId,
    ) -> impl Future<Output = Result<bool, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(CLAIM)
                .bind(owner_id.get())
                .bind(id.get())
                .bind(owner_id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }

    fn clear_owner(&self, id: DeviceId) -> impl Future<Output = Result<bool, StopfireError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(RELEASE)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
