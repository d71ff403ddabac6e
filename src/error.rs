use std::io;
use std::str::Utf8Error;

use btleplug::api::BDAddr;
use uuid::Uuid;

use crate::SensorKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Ble(#[from] btleplug::Error),

    #[error("no Bluetooth adapter at index {0}")]
    AdapterNotFound(usize),

    #[error("device {0} is not known to the adapter")]
    PeripheralNotFound(BDAddr),

    #[error("characteristic {0} not found on the connected device")]
    CharacteristicNotFound(Uuid),

    #[error("{kind} payload is not valid UTF-8")]
    InvalidPayload {
        kind: SensorKind,
        #[source]
        source: Utf8Error,
    },

    #[error("failed to write to the console")]
    Console(#[from] io::Error),
}
