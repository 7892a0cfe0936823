#![no_std]

//! nRF52820 S140 Radio-Memory Reservation Firmware Library
//!
//! Brings up the BLE radio only once its RAM region has been reserved at
//! boot, using one extra reset to get there on a device's first radio boot:
//!
//! - `core`: System infrastructure (retained flags, memory arena, reset)
//! - `boot`: Boot-time reservation of the radio region
//! - `sequencer`: Radio init with reservation request and restart
//! - `ble`: SoftDevice bring-up, GATT server and advertising
//! - `config`: Compile-time settings

pub mod ble;
pub mod boot;
pub mod config;
pub mod core;
pub mod sequencer;
