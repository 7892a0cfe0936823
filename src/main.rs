#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::{config::Config, interrupt};
use embassy_time::{Duration, Timer};
use embedded_alloc::LlffHeap as Heap;
use nrf_softdevice::Softdevice;
use panic_probe as _;

use nrf52820_ble_reserve::ble::advertising;
use nrf52820_ble_reserve::ble::radio::SoftdeviceRadio;
use nrf52820_ble_reserve::ble::services::Server;
use nrf52820_ble_reserve::boot;
use nrf52820_ble_reserve::config::{self, HEARTBEAT_SECS, RADIO_REGION_SIZE};
use nrf52820_ble_reserve::core::memory::{self, RadioRegion};
use nrf52820_ble_reserve::core::reset::SystemReset;
use nrf52820_ble_reserve::core::retained::RetainedFlags;
use nrf52820_ble_reserve::sequencer::{self, ReservationState};

#[global_allocator]
static HEAP: Heap = Heap::empty();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting nRF52820 S140 firmware");

    let Some(mut flags) = RetainedFlags::take() else {
        defmt::panic!("Retained flags already taken");
    };
    if flags.cold_boot() {
        info!("Retained memory initialised (power-on)");
    }

    // Reserve the radio region before anything else claims RAM
    let arena = unwrap!(memory::take_arena());
    let report = unwrap!(boot::reserve_radio_memory(&mut flags, arena, RADIO_REGION_SIZE));
    let summary = report.summary();
    info!("Boot: {}", summary);
    memory::init_heap(&HEAP, report.app);

    // Configure nRF peripherals
    let mut nrf_config = Config::default();
    // Configure interrupt priorities to avoid SoftDevice reserved levels (0, 1, 4)
    nrf_config.gpiote_interrupt_priority = interrupt::Priority::P2;
    nrf_config.time_interrupt_priority = interrupt::Priority::P2;
    let _peripherals = embassy_nrf::init(nrf_config);

    info!("Embassy initialized, bringing up radio...");

    let mut radio = SoftdeviceRadio::new(report.radio, config::softdevice_config());
    let handle = match sequencer::ensure_radio_ready(&mut radio, &mut flags, &mut SystemReset) {
        Ok(handle) => handle,
        Err(fault) => defmt::panic!("Radio fault: {}", fault),
    };
    info!("Radio ready: {}", handle.info());

    // The state a central sees is what this boot found on entry, collapsed
    // to Reserved once the request has been honoured.
    let published = match summary.entry_state {
        ReservationState::PendingReserve => ReservationState::Reserved,
        state => state,
    };
    handle.server().publish_state(published);

    let (sd, server, region) = handle.into_parts();

    // Spawn SoftDevice task (CRITICAL!)
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server, region)));

    info!("System initialized, entering main loop");

    loop {
        Timer::after(Duration::from_secs(HEARTBEAT_SECS)).await;
        info!("Heartbeat - system running");
    }
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: Server, _region: RadioRegion) {
    advertising::run(sd, &server).await
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}
