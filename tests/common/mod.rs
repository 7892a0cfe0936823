//! Common test utilities and setup for embedded tests
//!
//! This module provides shared functionality for all defmt-test based tests:
//! - Critical section implementation, logger and panic handler
//! - Global heap for proptest
//! - Scripted radios and a simulated device for boot-cycle tests

#![allow(dead_code)]

// Re-export commonly used items for tests (except conflicting macros)
pub use defmt_rtt as _; // global logger
// Use nrf-softdevice which provides both interrupt vectors and critical section
pub use nrf_softdevice as _;
pub use panic_probe as _; // panic handler
pub use {embassy_nrf as _, embassy_sync as _, embassy_time as _};

// Global allocator for proptest (required for alloc feature in no_std)
pub extern crate alloc;
use core::sync::atomic::{AtomicBool, Ordering};

pub use embedded_alloc::LlffHeap as Heap;
use nrf52820_ble_reserve::boot::{self, BootSummary};
use nrf52820_ble_reserve::core::memory::RadioRegion;
use nrf52820_ble_reserve::core::retained::{FlagStore, RetainedBlock, RetainedFlags, RetainedKey};
use nrf52820_ble_reserve::sequencer::{self, Acquire, RadioError, RadioFault, RadioInit};

#[global_allocator]
pub static HEAP: Heap = Heap::empty();

// Define the global allocator backing store - 8KB heap for proptest
pub static mut HEAP_MEM: [u8; 8192] = [0; 8192];

// Global flag to ensure heap is only initialized once
static HEAP_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Ensure heap is initialized exactly once (thread-safe)
pub fn ensure_heap_initialized() {
    if !HEAP_INITIALIZED.swap(true, Ordering::Relaxed) {
        unsafe {
            let ptr = core::ptr::addr_of_mut!(HEAP_MEM) as *mut u8;
            HEAP.init(ptr as usize, 8192);
        }
    }
}

pub fn log_test_start(name: &str) {
    defmt::info!("TEST START: {}", name);
}

pub fn log_test_pass(name: &str) {
    defmt::info!("TEST PASS: {}", name);
}

/// Arena size used by simulated boots
pub const SIM_ARENA_SIZE: usize = 256;

/// Radio region size used by simulated boots
pub const SIM_REGION_SIZE: usize = 96;

static mut SIM_ARENA: [u8; SIM_ARENA_SIZE] = [0; SIM_ARENA_SIZE];

/// Borrow the simulated arena for one boot.
///
/// Tests run one at a time on the target and every boot drops its borrow
/// before the next one starts, so there is never more than one live slice.
pub fn sim_arena() -> &'static mut [u8] {
    unsafe { &mut *core::ptr::addr_of_mut!(SIM_ARENA) }
}

/// Radio whose init result is fixed up front
pub struct ScriptedRadio {
    pub result: Result<u32, RadioError>,
    pub calls: usize,
}

impl ScriptedRadio {
    pub fn ok(handle: u32) -> Self {
        Self {
            result: Ok(handle),
            calls: 0,
        }
    }

    pub fn failing(err: RadioError) -> Self {
        Self {
            result: Err(err),
            calls: 0,
        }
    }
}

impl RadioInit for ScriptedRadio {
    type Handle = u32;

    fn init(&mut self) -> Result<u32, RadioError> {
        self.calls += 1;
        self.result
    }
}

/// Radio that only comes up when the boot stage reserved its region,
/// unless a fault is injected
pub struct RegionRadio {
    region: Option<RadioRegion>,
    fault: Option<RadioFault>,
}

impl RegionRadio {
    pub fn new(region: Option<RadioRegion>, fault: Option<RadioFault>) -> Self {
        Self { region, fault }
    }
}

impl RadioInit for RegionRadio {
    /// Size of the region the radio runs in
    type Handle = usize;

    fn init(&mut self) -> Result<usize, RadioError> {
        if let Some(fault) = self.fault {
            return Err(fault.into());
        }
        match self.region.take() {
            Some(region) => Ok(region.len()),
            None => Err(RadioError::MemoryUnreserved),
        }
    }
}

/// Flag store wrapper counting writes
pub struct CountingFlags<F> {
    pub inner: F,
    pub writes: usize,
}

impl<F: FlagStore> CountingFlags<F> {
    pub fn new(inner: F) -> Self {
        Self { inner, writes: 0 }
    }
}

impl<F: FlagStore> FlagStore for CountingFlags<F> {
    fn get(&self, key: RetainedKey) -> bool {
        self.inner.get(key)
    }

    fn set(&mut self, key: RetainedKey, value: bool) {
        self.writes += 1;
        self.inner.set(key, value);
    }
}

/// Restart primitive that must not be reached
pub struct ForbiddenReset;

impl nrf52820_ble_reserve::core::reset::Restart for ForbiddenReset {
    fn restart(&mut self) -> ! {
        defmt::panic!("restart must not be issued on this path");
    }
}

/// What one simulated boot ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum BootOutcome {
    /// Radio handle obtained (region length)
    Ready(usize),
    /// Reservation requested, device restarted
    Restarted,
    /// Fault propagated to the supervisor
    Faulted(RadioFault),
}

/// Result of one simulated boot
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct BootRecord {
    pub summary: BootSummary,
    pub outcome: BootOutcome,
    /// Flag writes made by the sequencer during this boot
    pub sequencer_writes: usize,
}

/// Device simulation: retained block survives `boot` calls and restarts,
/// `power_cycle` wipes it.
pub struct SimDevice {
    pub retained: RetainedBlock,
    pub restarts: usize,
    pub fault: Option<RadioFault>,
}

impl SimDevice {
    /// Device on its first-ever power-on
    pub fn new() -> Self {
        Self {
            retained: RetainedBlock::zeroed(),
            restarts: 0,
            fault: None,
        }
    }

    /// Run boot stage and sequencer once
    pub fn boot(&mut self) -> BootRecord {
        let mut flags = RetainedFlags::attach(&mut self.retained);
        let report = match boot::reserve_radio_memory(&mut flags, sim_arena(), SIM_REGION_SIZE) {
            Ok(report) => report,
            Err(e) => defmt::panic!("boot stage failed: {}", e),
        };
        let summary = report.summary();

        let mut radio = RegionRadio::new(report.radio, self.fault);
        let mut counted = CountingFlags::new(flags);
        let outcome = match sequencer::try_acquire(&mut radio, &mut counted) {
            Ok(Acquire::Ready(len)) => BootOutcome::Ready(len),
            Ok(Acquire::RestartRequired) => {
                self.restarts += 1;
                BootOutcome::Restarted
            }
            Err(fault) => BootOutcome::Faulted(fault),
        };

        BootRecord {
            summary,
            outcome,
            sequencer_writes: counted.writes,
        }
    }

    /// Boot until the radio comes up or a fault is hit, at most `limit` times
    pub fn boot_until_settled(&mut self, limit: usize) -> BootOutcome {
        let mut last = BootOutcome::Restarted;
        for _ in 0..limit {
            last = self.boot().outcome;
            if last != BootOutcome::Restarted {
                break;
            }
        }
        last
    }

    /// Lose power: retained RAM content is gone
    pub fn power_cycle(&mut self) {
        self.retained = RetainedBlock {
            magic: 0xDEAD_BEEF,
            flags: 0xFF,
            _pad: 0xFF,
            crc: 0x1234,
        };
    }

    pub fn flags(&mut self) -> RetainedFlags<'_> {
        RetainedFlags::attach(&mut self.retained)
    }
}
