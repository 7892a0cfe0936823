//! RAM Arena Management
//!
//! A single static arena is split at boot between the application heap and
//! the radio region. Without a reservation the heap takes the whole arena and
//! the radio stack has nothing to run in; with a reservation the top
//! `RADIO_REGION_SIZE` bytes are carved off before the heap is created.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, Format};
use embedded_alloc::LlffHeap;

use crate::config::ARENA_SIZE;

static mut ARENA: [u8; ARENA_SIZE] = [0; ARENA_SIZE];

static ARENA_TAKEN: AtomicBool = AtomicBool::new(false);

/// Memory layout errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum MemoryError {
    /// Requested radio region does not fit in the arena
    RegionTooLarge { requested: usize, available: usize },
    /// Static arena was already handed out this boot
    ArenaTaken,
}

/// RAM reserved for the radio stack for the current boot
pub struct RadioRegion {
    bytes: &'static mut [u8],
}

impl RadioRegion {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.bytes
    }
}

/// Result of splitting the arena
pub struct MemoryPlan {
    /// Memory left for the application heap
    pub app: &'static mut [u8],
    /// Radio region, present only when reserved
    pub radio: Option<RadioRegion>,
}

impl MemoryPlan {
    /// Split `arena`, carving `radio_len` bytes off the top when given
    pub fn carve(arena: &'static mut [u8], radio_len: Option<usize>) -> Result<Self, MemoryError> {
        let Some(radio_len) = radio_len else {
            return Ok(Self {
                app: arena,
                radio: None,
            });
        };

        if radio_len > arena.len() {
            return Err(MemoryError::RegionTooLarge {
                requested: radio_len,
                available: arena.len(),
            });
        }

        let split = arena.len() - radio_len;
        let (app, radio) = arena.split_at_mut(split);
        Ok(Self {
            app,
            radio: Some(RadioRegion { bytes: radio }),
        })
    }

    pub fn is_reserved(&self) -> bool {
        self.radio.is_some()
    }
}

/// Hand out the static arena. Only succeeds once per boot.
pub fn take_arena() -> Result<&'static mut [u8], MemoryError> {
    if ARENA_TAKEN.swap(true, Ordering::AcqRel) {
        return Err(MemoryError::ArenaTaken);
    }

    // SAFETY: guarded by ARENA_TAKEN
    Ok(unsafe { &mut *core::ptr::addr_of_mut!(ARENA) })
}

/// Initialise `heap` over the application part of the arena
pub fn init_heap(heap: &LlffHeap, app: &'static mut [u8]) {
    let len = app.len();
    // SAFETY: `app` is 'static and exclusively owned, so the heap is its only user
    unsafe { heap.init(app.as_mut_ptr() as usize, len) };
    info!("Memory: heap initialized with {} bytes", len);
}
