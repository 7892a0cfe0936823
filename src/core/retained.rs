//! Retained Flag Store
//!
//! Flags that survive a system reset but not a power cycle. The block lives
//! in a `.uninit` RAM section which cortex-m-rt leaves untouched at start-up,
//! so whatever the previous boot wrote is still there after `SYSRESETREQ`.
//! After power-on the RAM content is arbitrary; the magic word and CRC
//! reject it and the block starts over with every flag cleared.

use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use crc::{Crc, CRC_16_IBM_3740};
use defmt::{debug, Format};

/// CRC-16/CCITT-FALSE over the magic word and flag byte
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Bit 0: application asked for radio memory on the next boot
pub const FLAG_BLE_MEMORY_REQUESTED: u8 = 0x01;
/// Bit 1: boot stage has reserved radio memory (kept until power loss)
pub const FLAG_BLE_MEMORY_RESERVED: u8 = 0x02;

/// Keys stored in the retained block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum RetainedKey {
    BleMemoryRequested,
    BleMemoryReserved,
}

impl RetainedKey {
    const fn mask(self) -> u8 {
        match self {
            RetainedKey::BleMemoryRequested => FLAG_BLE_MEMORY_REQUESTED,
            RetainedKey::BleMemoryReserved => FLAG_BLE_MEMORY_RESERVED,
        }
    }
}

/// Boolean key-value slot persisted across resets
pub trait FlagStore {
    fn get(&self, key: RetainedKey) -> bool;
    fn set(&mut self, key: RetainedKey, value: bool);
}

/// Raw retained block layout (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(C)]
pub struct RetainedBlock {
    pub magic: u32,
    pub flags: u8,
    pub _pad: u8,
    pub crc: u16,
}

impl RetainedBlock {
    /// "BLER"
    pub const MAGIC: u32 = 0x424C_4552;

    /// Block as it looks after power-on: invalid until initialised
    pub const fn zeroed() -> Self {
        Self {
            magic: 0,
            flags: 0,
            _pad: 0,
            crc: 0,
        }
    }

    /// Valid block with every flag cleared
    pub fn fresh() -> Self {
        Self::with_flags(0)
    }

    /// Valid block carrying the given flag bits
    pub fn with_flags(flags: u8) -> Self {
        let mut block = Self {
            magic: Self::MAGIC,
            flags,
            _pad: 0,
            crc: 0,
        };
        block.crc = block.checksum();
        block
    }

    pub fn checksum(&self) -> u16 {
        let mut digest = CRC16.digest();
        digest.update(&self.magic.to_le_bytes());
        digest.update(&[self.flags]);
        digest.finalize()
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.crc == self.checksum()
    }
}

impl Default for RetainedBlock {
    fn default() -> Self {
        Self::fresh()
    }
}

#[link_section = ".uninit.ble_reserve"]
static mut RETAINED: MaybeUninit<RetainedBlock> = MaybeUninit::uninit();

static RETAINED_TAKEN: AtomicBool = AtomicBool::new(false);

/// Flag store backed by a retained block
pub struct RetainedFlags<'a> {
    block: &'a mut RetainedBlock,
    cold_boot: bool,
}

impl RetainedFlags<'static> {
    /// Take the device's retained block. Returns `None` after the first call.
    pub fn take() -> Option<Self> {
        if RETAINED_TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }

        // SAFETY: guarded by RETAINED_TAKEN, so this is the only reference.
        // Every bit pattern is a valid RetainedBlock (plain integers).
        let block = unsafe { &mut *core::ptr::addr_of_mut!(RETAINED).cast::<RetainedBlock>() };
        Some(Self::attach(block))
    }
}

impl<'a> RetainedFlags<'a> {
    /// Validate `block`, re-initialising it when it did not survive
    pub fn attach(block: &'a mut RetainedBlock) -> Self {
        let current = unsafe { core::ptr::read_volatile(&*block as *const RetainedBlock) };
        let cold_boot = !current.is_valid();

        let mut flags = Self { block, cold_boot };
        if cold_boot {
            debug!("Retained: block invalid (magic=0x{:08X}), starting fresh", current.magic);
            flags.store(RetainedBlock::fresh());
        } else {
            debug!("Retained: block valid, flags=0x{:02X}", current.flags);
        }
        flags
    }

    /// True when the block had to be re-initialised (power-on or corruption)
    pub fn cold_boot(&self) -> bool {
        self.cold_boot
    }

    /// Raw flag bits
    pub fn bits(&self) -> u8 {
        self.load().flags
    }

    fn load(&self) -> RetainedBlock {
        unsafe { core::ptr::read_volatile(&*self.block as *const RetainedBlock) }
    }

    fn store(&mut self, block: RetainedBlock) {
        // Volatile so the write is not deferred past a following reset
        unsafe { core::ptr::write_volatile(&mut *self.block as *mut RetainedBlock, block) };
    }
}

impl FlagStore for RetainedFlags<'_> {
    fn get(&self, key: RetainedKey) -> bool {
        self.load().flags & key.mask() != 0
    }

    fn set(&mut self, key: RetainedKey, value: bool) {
        let current = self.load().flags;
        let next = if value {
            current | key.mask()
        } else {
            current & !key.mask()
        };

        debug!("Retained: {} = {} (0x{:02X} -> 0x{:02X})", key, value, current, next);
        self.store(RetainedBlock::with_flags(next));
    }
}
