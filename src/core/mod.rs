//! Core System Infrastructure
//!
//! Platform services the reservation handshake is built on: retained flags
//! that outlive a reset, the RAM arena split, and the reset primitive itself.

pub mod memory;
pub mod reset;
pub mod retained;
