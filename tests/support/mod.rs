//! A scripted BLE stack that records every call made through it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{stream, StreamExt};
use sensorlink::sensor::SENSOR_SERVICE;
use sensorlink::{
    BDAddr, Central, CharPropFlags, CharacteristicInfo, Connection, DeviceStream,
    DiscoveredDevice, Error, NotificationStream, Result, SensorKind, ServiceInfo,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Scan(Duration),
    StopScan,
    Connect(BDAddr),
    Services,
    Subscribe(Uuid),
    Unsubscribe(Uuid),
    Disconnect,
}

pub fn device(name: &str, last_octet: u8) -> DiscoveredDevice {
    DiscoveredDevice {
        name: Some(name.to_string()),
        address: BDAddr::from([0x24, 0x0a, 0xc4, 0x00, 0x00, last_octet]),
    }
}

pub fn notify(uuid: Uuid) -> CharacteristicInfo {
    CharacteristicInfo {
        uuid,
        properties: CharPropFlags::READ | CharPropFlags::NOTIFY,
    }
}

/// The sensor service with the given sensors, in the given order.
pub fn sensor_service(kinds: &[SensorKind]) -> ServiceInfo {
    ServiceInfo {
        uuid: SENSOR_SERVICE,
        characteristics: kinds.iter().map(|kind| notify(kind.uuid())).collect(),
    }
}

#[derive(Default)]
struct Script {
    services: Vec<ServiceInfo>,
    payloads: HashMap<Uuid, Vec<Vec<u8>>>,
    failing_subscriptions: HashSet<Uuid>,
    failing_services: bool,
    close_streams: bool,
}

#[derive(Clone, Default)]
pub struct FakeCentral {
    devices: Vec<DiscoveredDevice>,
    refuse_connection: bool,
    script: Arc<Script>,
    calls: Arc<Mutex<Vec<Call>>>,
    // Keeps notification streams open until the test ends.
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
}

impl FakeCentral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advertising(mut self, device: DiscoveredDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_service(mut self, service: ServiceInfo) -> Self {
        self.script_mut().services.push(service);
        self
    }

    /// Payload delivered on `uuid` as soon as it is subscribed to.
    pub fn with_payload(mut self, uuid: Uuid, payload: &[u8]) -> Self {
        self.script_mut()
            .payloads
            .entry(uuid)
            .or_default()
            .push(payload.to_vec());
        self
    }

    pub fn failing_subscription(mut self, uuid: Uuid) -> Self {
        self.script_mut().failing_subscriptions.insert(uuid);
        self
    }

    /// GATT discovery fails after the link is up.
    pub fn failing_services(mut self) -> Self {
        self.script_mut().failing_services = true;
        self
    }

    /// End every notification stream after its scripted payloads, as on link loss.
    pub fn closing_streams(mut self) -> Self {
        self.script_mut().close_streams = true;
        self
    }

    pub fn refusing_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("script is configured before use")
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn has_characteristic(&self, uuid: Uuid) -> bool {
        self.script
            .services
            .iter()
            .flat_map(|service| &service.characteristics)
            .any(|characteristic| characteristic.uuid == uuid)
    }
}

impl Central for FakeCentral {
    type Connection = FakeCentral;

    async fn scan(&self, timeout: Duration) -> Result<DeviceStream> {
        self.record(Call::Scan(timeout));

        // Devices advertise right away, then the radio stays quiet until the window closes.
        Ok(Box::pin(
            stream::iter(self.devices.clone())
                .chain(stream::pending())
                .take_until(tokio::time::sleep(timeout)),
        ))
    }

    async fn stop_scan(&self) -> Result<()> {
        self.record(Call::StopScan);
        Ok(())
    }

    async fn connect(&self, device: &DiscoveredDevice) -> Result<FakeCentral> {
        self.record(Call::Connect(device.address));

        if self.refuse_connection {
            return Err(Error::PeripheralNotFound(device.address));
        }

        Ok(self.clone())
    }
}

impl Connection for FakeCentral {
    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        self.record(Call::Services);

        if self.script.failing_services {
            return Err(Error::Ble(btleplug::Error::NotConnected));
        }

        Ok(self.script.services.clone())
    }

    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream> {
        self.record(Call::Subscribe(characteristic));

        if self.script.failing_subscriptions.contains(&characteristic) {
            return Err(Error::CharacteristicNotFound(characteristic));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        for payload in self.script.payloads.get(&characteristic).into_iter().flatten() {
            sender.send(payload.clone()).unwrap();
        }

        if !self.script.close_streams {
            self.senders.lock().unwrap().push(sender);
        }

        Ok(Box::pin(UnboundedReceiverStream::new(receiver)))
    }

    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()> {
        self.record(Call::Unsubscribe(characteristic));

        if self.has_characteristic(characteristic) {
            Ok(())
        } else {
            Err(Error::CharacteristicNotFound(characteristic))
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.record(Call::Disconnect);
        Ok(())
    }
}
