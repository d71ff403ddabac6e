//! The sensor peripheral's GATT layout and payload decoding.

use std::fmt;

use uuid::Uuid;

use crate::{Error, Result};

/// Advertised name of the sensor peripheral.
pub const DEVICE_NAME: &str = "ProximitySensor";

pub const SENSOR_SERVICE: Uuid = Uuid::from_u128(0x00000000_5ec4_4083_81cd_a10b8d5cf6ec);
pub const PROXIMITY: Uuid = Uuid::from_u128(0x00000001_5ec4_4083_81cd_a10b8d5cf6ec);
pub const GESTURE: Uuid = Uuid::from_u128(0x00000002_5ec4_4083_81cd_a10b8d5cf6ec);
pub const GYROSCOPE: Uuid = Uuid::from_u128(0x00000003_5ec4_4083_81cd_a10b8d5cf6ec);
pub const ACCELEROMETER: Uuid = Uuid::from_u128(0x00000004_5ec4_4083_81cd_a10b8d5cf6ec);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Proximity,
    Gesture,
    Gyroscope,
    Accelerometer,
}

impl SensorKind {
    /// Every kind, in the order notifications are stopped at teardown.
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Proximity,
        SensorKind::Gesture,
        SensorKind::Gyroscope,
        SensorKind::Accelerometer,
    ];

    pub fn uuid(self) -> Uuid {
        match self {
            SensorKind::Proximity => PROXIMITY,
            SensorKind::Gesture => GESTURE,
            SensorKind::Gyroscope => GYROSCOPE,
            SensorKind::Accelerometer => ACCELEROMETER,
        }
    }

    pub fn from_uuid(uuid: Uuid) -> Option<SensorKind> {
        SensorKind::ALL.into_iter().find(|kind| kind.uuid() == uuid)
    }

    /// Label printed in front of each reading
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Proximity => "Proximity",
            SensorKind::Gesture => "Gesture",
            SensorKind::Gyroscope => "Gyroscope",
            SensorKind::Accelerometer => "Accelerometer",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            SensorKind::Proximity => "proximity",
            SensorKind::Gesture => "gesture",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Accelerometer => "accelerometer",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// A decoded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading<'a> {
    pub kind: SensorKind,
    pub text: &'a str,
}

impl fmt::Display for Reading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.text)
    }
}

/// Decodes a notification payload as UTF-8 text.
///
/// The peripheral sends its values already formatted, so no further parsing happens here.
pub fn decode(kind: SensorKind, payload: &[u8]) -> Result<Reading<'_>> {
    let text = std::str::from_utf8(payload)
        .map_err(|source| Error::InvalidPayload { kind, source })?;

    Ok(Reading { kind, text })
}
