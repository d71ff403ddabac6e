//! BLE client for a proximity / gesture / motion sensor peripheral.
//!
//! The [`Monitor`] scans for the peripheral advertising as
//! [`sensor::DEVICE_NAME`], connects to it, enables notifications on the
//! proximity, gesture, gyroscope and accelerometer characteristics and prints
//! every reading until shutdown is requested. It then stops all four
//! notifications and disconnects.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sensorlink::{BluetoothCentral, Error, Monitor, MonitorConfig};
//! use stream_cancel::Tripwire;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Error> {
//!     pretty_env_logger::init();
//!
//!     let (trigger, tripwire) = Tripwire::new();
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         trigger.cancel();
//!     });
//!
//!     let central = BluetoothCentral::new(0).await?;
//!     let mut monitor = Monitor::new(central, MonitorConfig::default(), std::io::stdout());
//!     monitor.run(tripwire).await?;
//!
//!     Ok(())
//! }
//!```

#![warn(clippy::all, future_incompatible, nonstandard_style, rust_2018_idioms)]

pub use btleplug::api::{BDAddr, CharPropFlags};

pub use central::{
    Central, CharacteristicInfo, Connection, DeviceStream, DiscoveredDevice, NotificationStream,
    ServiceInfo,
};
pub use characteristic::Characteristic;
pub use config::{InvalidPayload, MonitorConfig};
pub use device::Device;
pub use error::{Error, Result};
pub use interrupt::forward_interrupts;
pub use monitor::{Monitor, Outcome};
pub use scanner::BluetoothCentral;
pub use sensor::{Reading, SensorKind};

mod device;
mod scanner;

mod central;
mod characteristic;
mod config;
mod error;
mod interrupt;
mod monitor;
pub mod sensor;
