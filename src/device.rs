use btleplug::api::{BDAddr, Peripheral as _, Service};
use btleplug::platform::Peripheral;
use uuid::Uuid;

use crate::central::{CharacteristicInfo, Connection, NotificationStream, ServiceInfo};
use crate::{Characteristic, Error, Result};

/// A connected peripheral.
#[derive(Debug, Clone)]
pub struct Device {
    pub(crate) peripheral: Peripheral,
}

impl Device {
    pub(crate) fn new(peripheral: Peripheral) -> Self {
        Self { peripheral }
    }

    #[inline]
    pub fn address(&self) -> BDAddr {
        self.peripheral.address()
    }

    async fn gatt_services(&self) -> Result<Vec<Service>> {
        let mut services = self.peripheral.services();
        if services.is_empty() {
            log::debug!("Discovering services for {}", self.address());
            self.peripheral.discover_services().await?;
            services = self.peripheral.services();
        }

        Ok(services.into_iter().collect())
    }

    /// Get characteristic by UUID
    pub async fn characteristic(&self, uuid: Uuid) -> Result<Option<Characteristic>> {
        let characteristic = self
            .gatt_services()
            .await?
            .into_iter()
            .flat_map(|service| service.characteristics)
            .find(|characteristic| characteristic.uuid == uuid);

        Ok(characteristic.map(|characteristic| Characteristic {
            peripheral: self.peripheral.clone(),
            characteristic,
        }))
    }

    async fn require_characteristic(&self, uuid: Uuid) -> Result<Characteristic> {
        self.characteristic(uuid)
            .await?
            .ok_or(Error::CharacteristicNotFound(uuid))
    }
}

impl Connection for Device {
    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        Ok(self
            .gatt_services()
            .await?
            .into_iter()
            .map(|service| ServiceInfo {
                uuid: service.uuid,
                characteristics: service
                    .characteristics
                    .into_iter()
                    .map(|characteristic| CharacteristicInfo {
                        uuid: characteristic.uuid,
                        properties: characteristic.properties,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn subscribe(&self, characteristic: Uuid) -> Result<NotificationStream> {
        self.require_characteristic(characteristic)
            .await?
            .subscribe()
            .await
    }

    async fn unsubscribe(&self, characteristic: Uuid) -> Result<()> {
        self.require_characteristic(characteristic)
            .await?
            .unsubscribe()
            .await
    }

    async fn disconnect(&self) -> Result<()> {
        log::debug!("Disconnecting from {}", self.address());
        Ok(self.peripheral.disconnect().await?)
    }
}
