//! Device restart primitive

use core::sync::atomic::{compiler_fence, Ordering};

use defmt::warn;

/// Hard restart of the device. Never returns.
pub trait Restart {
    fn restart(&mut self) -> !;
}

/// System reset through the Cortex-M SCB (`SYSRESETREQ`)
///
/// RAM is retained across this reset on the nRF52, which is what keeps the
/// retained flag block alive for the next boot.
pub struct SystemReset;

impl Restart for SystemReset {
    fn restart(&mut self) -> ! {
        warn!("System: issuing system reset");
        compiler_fence(Ordering::SeqCst);
        cortex_m::peripheral::SCB::sys_reset()
    }
}
