//! Radio-Memory Reservation Sequencer
//!
//! Runs once per boot, before any task is spawned. If the radio comes up the
//! handle is returned. If it fails because its memory region was never
//! reserved, the request is recorded in retained memory and the device is
//! reset so the boot stage can reserve the region first thing next boot.
//!
//! ```text
//! MemUnreserved --init fails, flag set, restart--> PendingReserve
//! PendingReserve --next boot, region reserved-->   Reserved (stable)
//! ```
//!
//! Any other radio failure is returned to the caller untouched.

use defmt::{error, info, warn, Format};

use crate::core::reset::Restart;
use crate::core::retained::{FlagStore, RetainedKey};

/// Radio failures that are not a missing reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum RadioFault {
    /// Allocation failed although the region is reserved
    OutOfMemory,
    /// Controller or SoftDevice error code
    Hardware(u32),
    /// Radio was already brought up this boot
    AlreadyInitialized,
}

/// Radio init errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum RadioError {
    /// Radio memory region is not reserved yet
    MemoryUnreserved,
    Fault(RadioFault),
}

impl From<RadioFault> for RadioError {
    fn from(fault: RadioFault) -> Self {
        RadioError::Fault(fault)
    }
}

/// Radio subsystem init entry point
pub trait RadioInit {
    type Handle;

    fn init(&mut self) -> Result<Self::Handle, RadioError>;
}

/// Reservation state as seen from the retained flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum ReservationState {
    MemUnreserved,
    PendingReserve,
    Reserved,
}

impl ReservationState {
    pub fn observe<F: FlagStore>(flags: &F) -> Self {
        if flags.get(RetainedKey::BleMemoryRequested) {
            ReservationState::PendingReserve
        } else if flags.get(RetainedKey::BleMemoryReserved) {
            ReservationState::Reserved
        } else {
            ReservationState::MemUnreserved
        }
    }
}

/// Outcome of one init attempt
#[derive(Debug, PartialEq, Eq, Format)]
pub enum Acquire<H> {
    Ready(H),
    /// Request recorded; the device must restart before the radio can run
    RestartRequired,
}

/// Attempt radio init, recording a reservation request on the one failure
/// that a restart can fix.
pub fn try_acquire<R, F>(radio: &mut R, flags: &mut F) -> Result<Acquire<R::Handle>, RadioFault>
where
    R: RadioInit,
    F: FlagStore,
{
    match radio.init() {
        Ok(handle) => {
            info!("Sequencer: radio ready");
            Ok(Acquire::Ready(handle))
        }
        Err(RadioError::MemoryUnreserved) => {
            warn!("Sequencer: radio memory not reserved, requesting it for next boot");
            flags.set(RetainedKey::BleMemoryRequested, true);
            Ok(Acquire::RestartRequired)
        }
        Err(RadioError::Fault(fault)) => {
            error!("Sequencer: radio init failed: {}", fault);
            Err(fault)
        }
    }
}

/// Make sure the radio is usable this boot.
///
/// Returns the handle, or the fault when init failed for any reason other
/// than a missing reservation. On a missing reservation this restarts the
/// device and does not return.
pub fn ensure_radio_ready<R, F, S>(radio: &mut R, flags: &mut F, reset: &mut S) -> Result<R::Handle, RadioFault>
where
    R: RadioInit,
    F: FlagStore,
    S: Restart,
{
    match try_acquire(radio, flags)? {
        Acquire::Ready(handle) => Ok(handle),
        Acquire::RestartRequired => reset.restart(),
    }
}
