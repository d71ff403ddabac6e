use std::time::Duration;

use btleplug::api::{Central as _, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::{stream, StreamExt};

use crate::central::{Central, DeviceStream, DiscoveredDevice};
use crate::{Device, Error, Result};

/// A [`Central`] backed by the platform's Bluetooth adapter.
pub struct BluetoothCentral {
    _manager: Manager,
    adapter: Adapter,
}

impl BluetoothCentral {
    /// Opens the Bluetooth adapter at `adapter_index`. Index 0 is the first adapter found.
    pub async fn new(adapter_index: usize) -> Result<Self> {
        let manager = Manager::new().await?;
        let mut adapters = manager.adapters().await?;

        if adapter_index >= adapters.len() {
            return Err(Error::AdapterNotFound(adapter_index));
        }

        let adapter = adapters.swap_remove(adapter_index);

        log::trace!("Using adapter: {:?}", adapter);

        Ok(Self {
            _manager: manager,
            adapter,
        })
    }
}

async fn describe(peripheral: &Peripheral) -> DiscoveredDevice {
    let name = peripheral
        .properties()
        .await
        .ok()
        .flatten()
        .and_then(|props| props.local_name);

    DiscoveredDevice {
        name,
        address: peripheral.address(),
    }
}

impl Central for BluetoothCentral {
    type Connection = Device;

    async fn scan(&self, timeout: Duration) -> Result<DeviceStream> {
        log::info!("Starting the scan");

        let events = self.adapter.events().await?;

        // Devices cached by the adapter may not produce a discovery event again.
        let mut known = Vec::new();
        for peripheral in self.adapter.peripherals().await? {
            known.push(describe(&peripheral).await);
        }

        // Last fallible step, so an error never leaves the adapter scanning.
        self.adapter.start_scan(ScanFilter::default()).await?;

        let adapter = self.adapter.clone();
        let discovered = events.filter_map(move |event| {
            let adapter = adapter.clone();
            async move {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => return None,
                };

                let peripheral = adapter.peripheral(&id).await.ok()?;
                log::trace!("Device seen: {:?}", peripheral);

                Some(describe(&peripheral).await)
            }
        });

        Ok(Box::pin(
            stream::iter(known)
                .chain(discovered)
                .take_until(tokio::time::sleep(timeout)),
        ))
    }

    async fn stop_scan(&self) -> Result<()> {
        log::info!("Stopping the scan");
        Ok(self.adapter.stop_scan().await?)
    }

    async fn connect(&self, device: &DiscoveredDevice) -> Result<Device> {
        let peripheral = self
            .adapter
            .peripherals()
            .await?
            .into_iter()
            .find(|peripheral| peripheral.address() == device.address)
            .ok_or(Error::PeripheralNotFound(device.address))?;

        log::debug!("Connecting to device {}", device.address);
        peripheral.connect().await?;

        // Services are discovered by `Device` once the session owns the link, so a failed
        // discovery still ends in a disconnect.
        Ok(Device::new(peripheral))
    }
}
