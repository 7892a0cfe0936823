//! BLE Advertising
//!
//! Connectable undirected advertising on a ready radio. After each connection
//! the GATT server runs until the central disconnects, then advertising
//! resumes.

use defmt::{debug, error, info, Format};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload};
use nrf_softdevice::ble::peripheral::{self, Config as PeripheralConfig, ConnectableAdvertisement};
use nrf_softdevice::Softdevice;

use crate::ble::services::{self, Server};
use crate::config::{ADV_INTERVAL, DEVICE_NAME};

/// Advertising state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum AdvState {
    Stopped = 0,
    Active = 1,
    Connected = 2,
}

static ADV_STATE: Mutex<CriticalSectionRawMutex, AdvState> = Mutex::new(AdvState::Stopped);

/// Current advertising state
pub async fn state() -> AdvState {
    *ADV_STATE.lock().await
}

async fn set_state(next: AdvState) {
    let mut state = ADV_STATE.lock().await;
    if *state != next {
        debug!("Advertising: {} -> {}", *state, next);
        *state = next;
    }
}

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .full_name(DEVICE_NAME)
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new().build();

/// Advertise and serve connections forever
pub async fn run(sd: &'static Softdevice, server: &Server) -> ! {
    info!("Advertising: starting as \"{}\"", DEVICE_NAME);

    loop {
        let config = PeripheralConfig {
            interval: ADV_INTERVAL,
            ..Default::default()
        };

        let adv = ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };

        set_state(AdvState::Active).await;
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Advertising failed: {:?}", defmt::Debug2Format(&e));
                set_state(AdvState::Stopped).await;
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        set_state(AdvState::Connected).await;
        info!("Advertising: central connected");

        let e = services::serve(&conn, server).await;
        info!("Advertising: connection closed: {:?}", defmt::Debug2Format(&e));
    }
}
