//! Boot Stage
//!
//! First thing after reset, before the heap or the radio exist. Reads the
//! retained flags, reserves the radio region when it was requested (or was
//! already reserved on an earlier boot) and consumes the request.

use defmt::{info, Format};

use crate::core::memory::{MemoryError, MemoryPlan, RadioRegion};
use crate::core::retained::{FlagStore, RetainedKey};
use crate::sequencer::ReservationState;

/// What the boot stage decided
pub struct BootReport {
    /// State found in retained memory on entry
    pub entry_state: ReservationState,
    /// Application part of the arena
    pub app: &'static mut [u8],
    /// Radio region, if reserved this boot
    pub radio: Option<RadioRegion>,
}

/// Summary of a boot for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct BootSummary {
    pub entry_state: ReservationState,
    pub app_len: usize,
    pub radio_len: usize,
}

impl BootReport {
    pub fn summary(&self) -> BootSummary {
        BootSummary {
            entry_state: self.entry_state,
            app_len: self.app.len(),
            radio_len: self.radio.as_ref().map_or(0, RadioRegion::len),
        }
    }
}

/// Reserve the radio region out of `arena` if the retained flags ask for it.
pub fn reserve_radio_memory<F: FlagStore>(
    flags: &mut F,
    arena: &'static mut [u8],
    region_len: usize,
) -> Result<BootReport, MemoryError> {
    let entry_state = ReservationState::observe(flags);

    let plan = match entry_state {
        ReservationState::MemUnreserved => MemoryPlan::carve(arena, None)?,
        ReservationState::PendingReserve | ReservationState::Reserved => {
            let plan = MemoryPlan::carve(arena, Some(region_len))?;
            if entry_state == ReservationState::PendingReserve {
                flags.set(RetainedKey::BleMemoryReserved, true);
                flags.set(RetainedKey::BleMemoryRequested, false);
                info!("Boot: honoured radio memory request ({} bytes)", region_len);
            }
            plan
        }
    };

    Ok(BootReport {
        entry_state,
        app: plan.app,
        radio: plan.radio,
    })
}
