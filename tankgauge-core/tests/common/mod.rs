//! Shared fixtures for the integration tests

use tankgauge_core::{
    DeviceId, FixedClock, MaterialKind, MemoryAnalyticsStore, MemoryHistoryStore, SensorInstall,
    SensorKind, SensorReading, TankConfig, TankGeometry, TankId, TankName, Timestamp, VolumeEngine,
};

/// 2024-03-13 12:00:00 UTC, on an hour boundary
pub const HOUR_START: Timestamp = 1_710_331_200_000;

/// The fixed "now" every test engine runs at, 50 minutes into the hour
pub const NOW: Timestamp = HOUR_START + 3_000_000;

pub type TestEngine = VolumeEngine<MemoryHistoryStore, MemoryAnalyticsStore, FixedClock>;

pub fn tank_id() -> TankId {
    TankId::try_from("farm-a-diesel").unwrap()
}

pub fn device() -> DeviceId {
    DeviceId::try_from("16098522754E").unwrap()
}

/// 2 m diameter, 3 m tall vertical cylinder (~9425 L geometric), bound
/// to the test device serial
pub fn diesel_tank() -> TankConfig {
    let mut config = TankConfig::new(
        tank_id(),
        TankName::try_from("Farm A diesel").unwrap(),
        TankGeometry::VerticalCylinder {
            diameter: 2.0,
            height: 3.0,
        },
        10_000.0,
        MaterialKind::Liquid,
        SensorInstall::new(SensorKind::Ultrasonic),
    );
    config.device_serial = Some(device());
    config
}

/// Engine on a fixed clock with no tanks registered
pub fn bare_engine() -> TestEngine {
    VolumeEngine::with_clock(
        MemoryHistoryStore::new(),
        MemoryAnalyticsStore::new(),
        FixedClock::new(NOW),
    )
}

/// Engine with the diesel tank already registered
pub fn engine() -> TestEngine {
    let engine = bare_engine();
    engine.register_tank(diesel_tank()).unwrap();
    engine
}

/// Ultrasonic reading: the raw value is the air gap in meters
pub fn reading(ts: Timestamp, air_gap_m: f32) -> SensorReading {
    SensorReading::new(device(), ts, air_gap_m)
}
