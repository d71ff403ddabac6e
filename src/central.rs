//! The boundary between the monitor and a BLE radio stack.
//!
//! [`crate::BluetoothCentral`] implements these traits on top of btleplug. Anything else
//! that can scan, connect and deliver notifications can stand in for it.

#![allow(async_fn_in_trait)]

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use btleplug::api::{BDAddr, CharPropFlags};
use futures::Stream;
use uuid::Uuid;

use crate::Result;

/// Devices seen during a scan. The same device may be reported more than once.
pub type DeviceStream = Pin<Box<dyn Stream<Item = DiscoveredDevice> + Send>>;

/// Raw payloads of a single characteristic.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredDevice {
    /// Advertised local name, if the device has sent one yet
    pub name: Option<String>,
    pub address: BDAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub uuid: Uuid,
    pub characteristics: Vec<CharacteristicInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicInfo {
    pub uuid: Uuid,
    pub properties: CharPropFlags,
}

/// Renders characteristic property flags as `[read, notify]`.
pub struct Properties(pub CharPropFlags);

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(CharPropFlags, &str); 8] = [
            (CharPropFlags::BROADCAST, "broadcast"),
            (CharPropFlags::READ, "read"),
            (CharPropFlags::WRITE_WITHOUT_RESPONSE, "write-without-response"),
            (CharPropFlags::WRITE, "write"),
            (CharPropFlags::NOTIFY, "notify"),
            (CharPropFlags::INDICATE, "indicate"),
            (CharPropFlags::AUTHENTICATED_SIGNED_WRITES, "authenticated-signed-writes"),
            (CharPropFlags::EXTENDED_PROPERTIES, "extended-properties"),
        ];

        let names = NAMES
            .iter()
            .filter(|(flag, _)| self.0.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();

        write!(f, "[{}]", names.join(", "))
    }
}

/// Scanning and connection primitives of a BLE central.
pub trait Central {
    type Connection: crate::Connection;

    /// Starts scanning. The returned stream ends once `timeout` has elapsed.
    async fn scan(&self, timeout: Duration) -> Result<DeviceStream>;

    async fn stop_scan(&self) -> Result<()>;

    /// Connects to the device. Any failure after this returns `Ok` must still be followed
    /// by [`Connection::disconnect`].
    async fn connect(&self, device: &DiscoveredDevice) -> Result<Self::Connection>;
}

/// An open link to one peripheral.
pub trait Connection {
    /// Discovers the GATT table on first use.
    async fn services(&self) -> Result<Vec<ServiceInfo>>;

    /// Enables notifications and returns the payloads of that characteristic.
    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream>;

    /// Fails with [`crate::Error::CharacteristicNotFound`] if the device has no such
    /// characteristic.
    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_are_listed_in_flag_order() {
        let flags = CharPropFlags::NOTIFY | CharPropFlags::READ;
        assert_eq!(Properties(flags).to_string(), "[read, notify]");
    }

    #[test]
    fn empty_properties() {
        assert_eq!(Properties(CharPropFlags::empty()).to_string(), "[]");
    }
}
