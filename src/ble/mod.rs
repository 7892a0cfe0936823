//! BLE Radio
//!
//! SoftDevice bring-up behind the sequencer's init entry point, the GATT
//! server registered with it, and advertising once the radio is ready.

pub mod advertising;
pub mod radio;
pub mod services;
