use std::collections::HashSet;
use std::io::Write;
use std::pin::pin;

use futures::stream::select_all;
use futures::{FutureExt, StreamExt};
use stream_cancel::{StreamExt as _, Tripwire};

use crate::central::{Central, Connection, DeviceStream, DiscoveredDevice, Properties};
use crate::config::{InvalidPayload, MonitorConfig};
use crate::sensor::{self, SensorKind};
use crate::{Error, Result};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The scan window closed without the target device showing up.
    DeviceNotFound,
    /// Shutdown was requested before the target device was found.
    Interrupted,
    /// The session ran until shutdown and was torn down.
    Finished {
        /// Sensors whose notifications were enabled, in subscription order
        subscribed: Vec<SensorKind>,
        /// Number of notifications printed
        readings: usize,
    },
}

/// Finds the sensor peripheral, streams its readings to `console` and tears the
/// connection down when shutdown is requested.
pub struct Monitor<C, W> {
    central: C,
    config: MonitorConfig,
    console: W,
}

impl<C: Central, W: Write> Monitor<C, W> {
    pub fn new(central: C, config: MonitorConfig, console: W) -> Self {
        Self {
            central,
            config,
            console,
        }
    }

    pub fn into_console(self) -> W {
        self.console
    }

    /// Runs one session: scan, connect, subscribe, print readings until `shutdown` fires,
    /// then unsubscribe and disconnect.
    ///
    /// Once connected, the teardown runs whether the session ends normally or with an error.
    pub async fn run(&mut self, shutdown: Tripwire) -> Result<Outcome> {
        let device = match self.discover(shutdown.clone()).await? {
            Some(device) => device,
            None if is_tripped(&shutdown) => {
                log::info!("Shutdown requested during the scan");
                return Ok(Outcome::Interrupted);
            }
            None => {
                writeln!(
                    self.console,
                    "Device '{}' not found. Make sure it's advertising and try again.",
                    self.config.device_name
                )?;
                return Ok(Outcome::DeviceNotFound);
            }
        };

        let name = &self.config.device_name;
        writeln!(
            self.console,
            "Connecting to {} at address {}...",
            name, device.address
        )?;
        let connection = self.central.connect(&device).await?;
        writeln!(self.console, "Connected to {}!", name)?;

        let session = self.session(&connection, shutdown).await;
        let teardown = self.teardown(&connection).await;

        let (subscribed, readings) = session?;
        teardown?;

        Ok(Outcome::Finished {
            subscribed,
            readings,
        })
    }

    /// Scans until the configured device is seen, the scan window closes, or shutdown fires.
    async fn discover(&mut self, shutdown: Tripwire) -> Result<Option<DiscoveredDevice>> {
        writeln!(self.console, "Scanning for BLE devices...")?;

        let devices = self.central.scan(self.config.scan_timeout).await?;
        let target = self.find_target(devices, shutdown).await;

        if let Err(e) = self.central.stop_scan().await {
            log::warn!("Could not stop the scan: {}", e);
        }

        target
    }

    async fn find_target(
        &mut self,
        devices: DeviceStream,
        shutdown: Tripwire,
    ) -> Result<Option<DiscoveredDevice>> {
        let mut devices = pin!(devices.take_until_if(shutdown));
        let mut seen = HashSet::new();

        while let Some(device) = devices.next().await {
            if !seen.insert(device.clone()) {
                continue;
            }

            writeln!(
                self.console,
                "Found device: {}, Address: {}",
                device.name.as_deref().unwrap_or("<unnamed>"),
                device.address
            )?;

            if self.config.matches_name(device.name.as_deref()) {
                return Ok(Some(device));
            }
        }

        Ok(None)
    }

    /// Subscribes to every sensor characteristic found and prints readings until shutdown.
    async fn session(
        &mut self,
        connection: &C::Connection,
        shutdown: Tripwire,
    ) -> Result<(Vec<SensorKind>, usize)> {
        writeln!(self.console, "Discovering services and characteristics...")?;

        let mut subscribed = Vec::new();
        let mut streams = Vec::new();

        for service in connection.services().await? {
            writeln!(self.console, "Service: {}", service.uuid)?;

            if !self.config.matches_service(service.uuid) {
                continue;
            }

            for characteristic in &service.characteristics {
                writeln!(
                    self.console,
                    "  Characteristic: {} - Properties: {}",
                    characteristic.uuid,
                    Properties(characteristic.properties)
                )?;

                let Some(kind) = SensorKind::from_uuid(characteristic.uuid) else {
                    continue;
                };

                writeln!(self.console, "Subscribing to {} notifications...", kind)?;
                match connection.subscribe(characteristic.uuid).await {
                    Ok(stream) => {
                        subscribed.push(kind);
                        streams.push(stream.map(move |payload| (kind, payload)));
                    }
                    Err(e) => log::warn!("Could not subscribe to {} notifications: {}", kind, e),
                }
            }
        }

        log::info!("Subscribed to {} sensor(s)", subscribed.len());
        writeln!(self.console, "Receiving data... Press Ctrl+C to exit.")?;

        let mut readings = 0;
        let mut notifications = pin!(select_all(streams).take_until_if(shutdown.clone()));

        while let Some((kind, payload)) = notifications.next().await {
            self.print_reading(kind, &payload)?;
            readings += 1;
        }

        if !is_tripped(&shutdown) {
            log::warn!("All notification streams ended; waiting for shutdown");
            shutdown.await;
        }

        Ok((subscribed, readings))
    }

    fn print_reading(&mut self, kind: SensorKind, payload: &[u8]) -> Result<()> {
        match sensor::decode(kind, payload) {
            Ok(reading) => writeln!(self.console, "{}", reading)?,
            Err(Error::InvalidPayload { source, .. })
                if self.config.invalid_payload == InvalidPayload::Report =>
            {
                log::warn!("Dropping {} payload {:02x?}: {}", kind, payload, source);
                writeln!(
                    self.console,
                    "{}: <invalid UTF-8, {} bytes>",
                    kind.label(),
                    payload.len()
                )?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Stops all four notifications in fixed order, whether or not they were enabled, then
    /// disconnects.
    async fn teardown(&mut self, connection: &C::Connection) -> Result<()> {
        if let Err(e) = writeln!(self.console, "\nStopping notifications...") {
            log::warn!("Could not write to the console: {}", e);
        }

        for kind in SensorKind::ALL {
            if let Err(e) = connection.unsubscribe(kind.uuid()).await {
                log::warn!("Could not stop {} notifications: {}", kind, e);
            }
        }

        connection.disconnect().await?;
        writeln!(self.console, "Disconnected.")?;

        Ok(())
    }
}

fn is_tripped(shutdown: &Tripwire) -> bool {
    shutdown.clone().now_or_never().unwrap_or(false)
}
