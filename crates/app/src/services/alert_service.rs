//! Alert service — merges the four sensor tables into one ordered alert feed.

use stopfire_domain::alert::{Alert, AlertScope, sort_most_recent_first};
use stopfire_domain::error::StopfireError;
use stopfire_domain::id::{DeviceId, UserId};
use stopfire_domain::sensor::SensorKind;
use stopfire_domain::time::now;

use crate::ports::AlertSource;

/// Read-only aggregator over an [`AlertSource`].
pub struct AlertService<S> {
    source: S,
}

impl<S: AlertSource> AlertService<S> {
    /// Create a new service backed by the given alert source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Active alerts for a scope, most recent activation first.
    ///
    /// Queries every [`SensorKind`] in turn. An empty feed is not an error.
    ///
    /// # Errors
    ///
    /// Returns the first storage error raised by any per-kind query; no
    /// partial feed is returned.
    #[tracing::instrument(skip(self))]
    pub async fn alerts(&self, scope: AlertScope) -> Result<Vec<Alert>, StopfireError> {
        let observed_at = now();
        let mut alerts = Vec::new();

        for kind in SensorKind::ALL {
            let readings = self.source.find_active(kind, &scope).await?;
            alerts.extend(
                readings
                    .into_iter()
                    .filter(|reading| reading.state.is_active())
                    .map(|reading| Alert::from_reading(kind, reading, observed_at)),
            );
        }

        sort_most_recent_first(&mut alerts);
        tracing::debug!(count = alerts.len(), "alerts aggregated");
        Ok(alerts)
    }

    /// Alerts of every device owned by `user_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::alerts`].
    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<Alert>, StopfireError> {
        self.alerts(AlertScope::User(user_id)).await
    }

    /// Alerts of one device, by id.
    ///
    /// # Errors
    ///
    /// See [`Self::alerts`].
    pub async fn for_device(&self, device_id: DeviceId) -> Result<Vec<Alert>, StopfireError> {
        self.alerts(AlertScope::Device(device_id)).await
    }

    /// Alerts of one device, by serial number.
    ///
    /// # Errors
    ///
    /// See [`Self::alerts`].
    pub async fn for_serial(
        &self,
        serial_number: impl Into<String>,
    ) -> Result<Vec<Alert>, StopfireError> {
        self.alerts(AlertScope::Serial(serial_number.into())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use stopfire_domain::alert::ActiveReading;
    use stopfire_domain::id::ChannelId;
    use stopfire_domain::sensor::SensorState;

    /// A stored sensor row together with the device it belongs to.
    struct Row {
        reading: ActiveReading,
        owner_id: Option<UserId>,
    }

    #[derive(Default)]
    struct InMemoryAlertSource {
        rows: HashMap<SensorKind, Vec<Row>>,
        failing: Option<SensorKind>,
        calls: Mutex<Vec<SensorKind>>,
    }

    impl InMemoryAlertSource {
        fn insert(
            &mut self,
            kind: SensorKind,
            device: (i64, &str, Option<i64>),
            sensor_id: i64,
            state: SensorState,
            activated_at: &str,
        ) {
            let (device_id, serial, owner) = device;
            self.rows.entry(kind).or_default().push(Row {
                reading: ActiveReading {
                    sensor_id: ChannelId::new(sensor_id),
                    state,
                    activated_at: activated_at.to_string(),
                    device_id: DeviceId::new(device_id),
                    device_serial: serial.to_string(),
                },
                owner_id: owner.map(UserId::new),
            });
        }

        fn matches(row: &Row, scope: &AlertScope) -> bool {
            match scope {
                AlertScope::User(user_id) => row.owner_id == Some(*user_id),
                AlertScope::Device(device_id) => row.reading.device_id == *device_id,
                AlertScope::Serial(serial) => row.reading.device_serial == *serial,
            }
        }
    }

    impl AlertSource for InMemoryAlertSource {
        fn find_active(
            &self,
            kind: SensorKind,
            scope: &AlertScope,
        ) -> impl Future<Output = Result<Vec<ActiveReading>, StopfireError>> + Send {
            self.calls.lock().unwrap().push(kind);
            let result: Result<Vec<ActiveReading>, StopfireError> = if self.failing == Some(kind) {
                Err(StopfireError::Storage(Box::new(std::io::Error::other(
                    "connection lost",
                ))))
            } else {
                Ok(self
                    .rows
                    .get(&kind)
                    .into_iter()
                    .flatten()
                    .filter(|row| row.reading.state.is_active() && Self::matches(row, scope))
                    .map(|row| row.reading.clone())
                    .collect())
            };
            async { result }
        }
    }

    /// Four devices, each with one active reading in a distinct kind.
    /// Devices 1 and 3 belong to user 7, device 2 to user 8, device 4 is unowned.
    fn fleet() -> InMemoryAlertSource {
        let mut source = InMemoryAlertSource::default();
        source.insert(
            SensorKind::Ky026,
            (1, "ESP-001", Some(7)),
            1,
            SensorState::Active,
            "2024-05-01 08:00:00",
        );
        source.insert(
            SensorKind::Mq2,
            (2, "ESP-002", Some(8)),
            6,
            SensorState::Active,
            "2024-05-02 08:00:00",
        );
        source.insert(
            SensorKind::Mq135,
            (3, "ESP-003", Some(7)),
            11,
            SensorState::Active,
            "2024-05-03 08:00:00",
        );
        source.insert(
            SensorKind::Dht22,
            (4, "ESP-004", None),
            16,
            SensorState::Active,
            "2024-05-04 08:00:00",
        );
        source.insert(
            SensorKind::Dht22,
            (1, "ESP-001", Some(7)),
            4,
            SensorState::Inactive,
            "2024-05-05 08:00:00",
        );
        source
    }

    #[tokio::test]
    async fn should_return_alerts_of_owned_devices_most_recent_first() {
        let svc = AlertService::new(fleet());

        let alerts = svc.for_user(UserId::new(7)).await.unwrap();

        let summary: Vec<(SensorKind, &str)> = alerts
            .iter()
            .map(|a| (a.sensor_type, a.device_serial.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (SensorKind::Mq135, "ESP-003"),
                (SensorKind::Ky026, "ESP-001")
            ]
        );
    }

    #[tokio::test]
    async fn should_never_include_inactive_readings() {
        let svc = AlertService::new(fleet());
        let alerts = svc.for_device(DeviceId::new(1)).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sensor_type, SensorKind::Ky026);
        assert!(alerts.iter().all(|a| a.state == SensorState::Active));
    }

    #[tokio::test]
    async fn should_scope_by_serial() {
        let svc = AlertService::new(fleet());
        let alerts = svc.for_serial("ESP-004").await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].sensor_type, SensorKind::Dht22);
        assert_eq!(alerts[0].device_id, DeviceId::new(4));
    }

    #[tokio::test]
    async fn should_return_empty_feed_when_nothing_active() {
        let svc = AlertService::new(fleet());
        let alerts = svc.for_device(DeviceId::new(99)).await.unwrap();
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn should_query_every_kind_once() {
        let svc = AlertService::new(InMemoryAlertSource::default());
        svc.for_user(UserId::new(1)).await.unwrap();
        assert_eq!(*svc.source.calls.lock().unwrap(), SensorKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn should_fail_whole_feed_and_stop_on_first_failing_kind() {
        let mut source = fleet();
        source.failing = Some(SensorKind::Mq2);
        let svc = AlertService::new(source);

        let result = svc.for_user(UserId::new(7)).await;
        assert!(matches!(result, Err(StopfireError::Storage(_))));
        assert_eq!(
            *svc.source.calls.lock().unwrap(),
            vec![SensorKind::Ky026, SensorKind::Mq2]
        );
    }

    #[tokio::test]
    async fn should_stamp_one_observation_time_per_feed() {
        let svc = AlertService::new(fleet());
        let alerts = svc.for_user(UserId::new(7)).await.unwrap();
        assert!(alerts.windows(2).all(|w| w[0].observed_at == w[1].observed_at));
    }
}
