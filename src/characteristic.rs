use btleplug::api::{Characteristic as BtleCharacteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use futures::StreamExt;
use uuid::Uuid;

use crate::central::NotificationStream;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Characteristic {
    pub(crate) peripheral: Peripheral,
    pub(crate) characteristic: BtleCharacteristic,
}

impl Characteristic {
    pub async fn subscribe(&self) -> Result<NotificationStream> {
        log::debug!("Enabling notifications for {}", self.uuid());
        self.peripheral.subscribe(&self.characteristic).await?;

        // The peripheral delivers every characteristic's notifications on one stream.
        let stream = self.peripheral.notifications().await?;
        let uuid = self.characteristic.uuid;

        Ok(Box::pin(stream.filter_map(move |n| async move {
            if n.uuid == uuid {
                Some(n.value)
            } else {
                None
            }
        })))
    }

    pub async fn unsubscribe(&self) -> Result<()> {
        log::debug!("Disabling notifications for {}", self.uuid());
        Ok(self.peripheral.unsubscribe(&self.characteristic).await?)
    }

    pub fn uuid(&self) -> Uuid {
        self.characteristic.uuid
    }
}
