//! Firmware Configuration
//!
//! Compile-time settings for the memory split, advertising identity and the
//! SoftDevice. Chip and SoftDevice variant are picked through Cargo features.

use nrf_softdevice::{raw, Config as SdConfig};

/// Total RAM arena shared by the application heap and the radio region
pub const ARENA_SIZE: usize = 8 * 1024;

/// Bytes carved off the arena for the radio once reserved
pub const RADIO_REGION_SIZE: usize = 4 * 1024;

/// Advertised complete local name
pub const DEVICE_NAME: &str = "BLE-Reserve";

/// Main loop heartbeat period
pub const HEARTBEAT_SECS: u64 = 10;

/// Advertising interval (0.625ms units)
pub const ADV_INTERVAL: u32 = 400; // 250ms

/// SoftDevice configuration for a single peripheral link
pub fn softdevice_config() -> SdConfig {
    SdConfig {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
