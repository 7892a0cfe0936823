//! SoftDevice Radio Bring-up
//!
//! The radio init entry point used by the sequencer. Refuses to enable the
//! SoftDevice unless the boot stage handed over a reserved radio region.

use defmt::{info, Format};
use nrf_softdevice::ble::gatt_server::RegisterError;
use nrf_softdevice::{Config as SdConfig, RawError, Softdevice};

use crate::ble::services::Server;
use crate::core::memory::RadioRegion;
use crate::sequencer::{RadioError, RadioFault, RadioInit};

/// Initialised radio for the current boot session
pub struct RadioHandle {
    sd: &'static Softdevice,
    server: Server,
    region: RadioRegion,
}

/// Region and stack details for logging
#[derive(Debug, Clone, Copy, Format)]
pub struct RadioInfo {
    pub region_len: usize,
}

impl RadioHandle {
    pub fn softdevice(&self) -> &'static Softdevice {
        self.sd
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn info(&self) -> RadioInfo {
        RadioInfo {
            region_len: self.region.len(),
        }
    }

    /// Split into the pieces the BLE task owns
    pub fn into_parts(self) -> (&'static Softdevice, Server, RadioRegion) {
        (self.sd, self.server, self.region)
    }
}

/// Radio backed by the S140 SoftDevice
pub struct SoftdeviceRadio {
    region: Option<RadioRegion>,
    config: SdConfig,
    enabled: bool,
}

impl SoftdeviceRadio {
    pub fn new(region: Option<RadioRegion>, config: SdConfig) -> Self {
        Self {
            region,
            config,
            enabled: false,
        }
    }
}

impl RadioInit for SoftdeviceRadio {
    type Handle = RadioHandle;

    fn init(&mut self) -> Result<RadioHandle, RadioError> {
        if self.enabled {
            return Err(RadioFault::AlreadyInitialized.into());
        }

        let Some(region) = self.region.take() else {
            return Err(RadioError::MemoryUnreserved);
        };
        self.enabled = true;

        let sd = Softdevice::enable(&self.config);
        info!("Radio: SoftDevice enabled, {} bytes reserved", region.len());

        let server = Server::new(sd).map_err(register_fault)?;
        let sd: &'static Softdevice = sd;

        Ok(RadioHandle { sd, server, region })
    }
}

fn register_fault(err: RegisterError) -> RadioFault {
    #[allow(unreachable_patterns)]
    match err {
        RegisterError::Raw(RawError::NoMem) => RadioFault::OutOfMemory,
        RegisterError::Raw(raw) => RadioFault::Hardware(raw as u32),
        _ => RadioFault::Hardware(0),
    }
}
