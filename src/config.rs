use std::time::Duration;

use uuid::Uuid;

use crate::sensor::{DEVICE_NAME, SENSOR_SERVICE};

/// What to do with a notification that is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidPayload {
    /// Log a warning, print a placeholder line and keep running.
    #[default]
    Report,
    /// Stop the run with [`crate::Error::InvalidPayload`]. The teardown still runs.
    Abort,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Exact advertised name of the peripheral to connect to.
    pub(crate) device_name: String,
    /// How long to scan before giving up.
    pub(crate) scan_timeout: Duration,
    /// Only characteristics of this service are subscribed to. `None` matches every service.
    pub(crate) service: Option<Uuid>,
    pub(crate) invalid_payload: InvalidPayload,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME.to_string(),
            scan_timeout: Duration::from_secs(5),
            service: Some(SENSOR_SERVICE),
            invalid_payload: InvalidPayload::default(),
        }
    }
}

impl MonitorConfig {
    /// Advertised name of the device to connect to. Matching is exact and case-sensitive.
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Stop the scan after given duration
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Only subscribe to sensor characteristics found under the given service
    pub fn service(mut self, uuid: Uuid) -> Self {
        self.service = Some(uuid);
        self
    }

    /// Subscribe to sensor characteristics wherever they are found
    pub fn any_service(mut self) -> Self {
        self.service = None;
        self
    }

    pub fn on_invalid_payload(mut self, policy: InvalidPayload) -> Self {
        self.invalid_payload = policy;
        self
    }

    pub(crate) fn matches_name(&self, name: Option<&str>) -> bool {
        name == Some(self.device_name.as_str())
    }

    pub(crate) fn matches_service(&self, uuid: Uuid) -> bool {
        self.service.map_or(true, |service| service == uuid)
    }
}
