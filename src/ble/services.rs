//! GATT Server
//!
//! A single vendor service exposing the reservation state the device booted
//! with, so a central can tell whether the extra reset already happened.

use defmt::warn;
use nrf_softdevice::ble::{gatt_server, Connection, DisconnectedError};

use crate::sequencer::ReservationState;

#[nrf_softdevice::gatt_service(uuid = "7a1e0001-5c4b-4d8e-9f3a-2b6c1d0e8f41")]
pub struct ReservationService {
    #[characteristic(uuid = "7a1e0002-5c4b-4d8e-9f3a-2b6c1d0e8f41", read, notify)]
    state: u8,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    reservation: ReservationService,
}

/// Characteristic encoding of a reservation state
pub fn state_code(state: ReservationState) -> u8 {
    match state {
        ReservationState::MemUnreserved => 0,
        ReservationState::PendingReserve => 1,
        ReservationState::Reserved => 2,
    }
}

impl Server {
    /// Publish the boot-time reservation state
    pub fn publish_state(&self, state: ReservationState) {
        if let Err(e) = self.reservation.state_set(&state_code(state)) {
            warn!("GATT: failed to set reservation state: {:?}", defmt::Debug2Format(&e));
        }
    }
}

/// Run the server on `conn` until it disconnects
pub async fn serve(conn: &Connection, server: &Server) -> DisconnectedError {
    gatt_server::run(conn, server, |_| {}).await
}
