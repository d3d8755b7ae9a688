//! End-to-end pipeline tests
//!
//! Drive the engine the way a gateway would: register tanks, feed
//! readings and raw frames, then check the history records, the cached
//! state, the period analytics, and the query surface against each
//! other. Everything runs on a fixed clock so the figures are exact.

mod common;

use std::sync::Arc;

use common::{bare_engine, device, diesel_tank, engine, reading, tank_id, HOUR_START, NOW};
use tankgauge_core::{
    AlertThresholds, DataQuality, FillStatus, HistoryQuery, ManualAdjustment, PeriodType,
    ProcessOutcome, RecordSource, SummaryWindow, TankId,
};

#[test]
fn reading_flows_through_to_history_and_state() {
    let engine = engine();
    // Air gap 1.5 m in a 3 m tank: half full
    let outcome = engine
        .process_reading(&tank_id(), &reading(HOUR_START + 60_000, 1.5))
        .unwrap();

    let record = match outcome {
        ProcessOutcome::Recorded { record, status } => {
            assert_eq!(status, FillStatus::Normal);
            record
        }
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert!((record.level_m - 1.5).abs() < 1e-3);
    assert!((record.volume_m3 - 4.712).abs() < 1e-2);
    assert!((record.fill_percent - 50.0).abs() < 0.1);
    assert_eq!(record.quality, DataQuality::Good);
    assert_eq!(record.source, RecordSource::SensorReading);
    assert_eq!(record.processing.sensor_kind, "ultrasonic");
    assert!(record.processing.validation_passed);
    assert_eq!(record.processing.processed_at, NOW);

    let latest = engine.latest(&tank_id()).unwrap().unwrap();
    assert_eq!(latest, record);

    let state = engine.tank_state(&tank_id()).unwrap();
    assert!((state.current_volume_liters - record.volume_liters).abs() < 1e-3);
    assert_eq!(state.last_reading_at, Some(HOUR_START + 60_000));
}

#[test]
fn analytics_track_usage_and_refills_within_a_bucket() {
    let engine = engine();
    // Levels 2.0 -> 1.6 -> 1.9 m (air gaps 1.0, 1.4, 1.1): a draw then
    // a partial refill, all inside one hour
    for (minute, gap) in [(1u64, 1.0f32), (10, 1.4), (20, 1.1)] {
        engine
            .process_reading(&tank_id(), &reading(HOUR_START + minute * 60_000, gap))
            .unwrap();
    }

    let hourly = engine.analytics(&tank_id(), PeriodType::Hourly).unwrap();
    assert_eq!(hourly.len(), 1);
    let bucket = &hourly[0];

    assert_eq!(bucket.reading_count, 3);
    // Each 0.1 m of level in this cylinder is ~314.16 L
    assert!((bucket.total_used - 4.0 * 314.16).abs() < 2.0);
    assert!((bucket.total_added - 3.0 * 314.16).abs() < 2.0);
    // Conservation: net change equals closing minus opening
    let expected_net = bucket.closing.volume_liters - bucket.opening.volume_liters;
    assert!((bucket.net_change - expected_net).abs() < 1e-2);

    // The same readings land in all four parallel windows
    for period in [PeriodType::Daily, PeriodType::Weekly, PeriodType::Monthly] {
        let buckets = engine.analytics(&tank_id(), period).unwrap();
        assert_eq!(buckets.len(), 1, "{:?}", period);
        assert_eq!(buckets[0].reading_count, 3);
    }
}

#[test]
fn delta_straddling_an_hour_boundary_is_not_booked() {
    let engine = engine();
    // Last reading of the previous hour, then first of the next
    engine
        .process_reading(&tank_id(), &reading(HOUR_START - 60_000, 1.0))
        .unwrap();
    engine
        .process_reading(&tank_id(), &reading(HOUR_START + 60_000, 1.4))
        .unwrap();

    let hourly = engine.analytics(&tank_id(), PeriodType::Hourly).unwrap();
    assert_eq!(hourly.len(), 2);
    // The new hour's bucket opens without booking the cross-boundary draw
    let second = &hourly[1];
    assert_eq!(second.reading_count, 1);
    assert_eq!(second.total_used, 0.0);
    assert_eq!(second.total_added, 0.0);

    // The daily bucket contains both readings, so it does book the draw
    let daily = engine.analytics(&tank_id(), PeriodType::Daily).unwrap();
    assert_eq!(daily.len(), 1);
    assert!(daily[0].total_used > 0.0);
}

#[test]
fn duplicate_device_timestamp_suppressed_everywhere() {
    let engine = engine();
    let first = reading(HOUR_START + 60_000, 1.5);
    engine.process_reading(&tank_id(), &first).unwrap();

    // Same device, same millisecond, different value: redelivery
    let replay = reading(HOUR_START + 60_000, 0.3);
    let outcome = engine.process_reading(&tank_id(), &replay).unwrap();
    assert_eq!(outcome, ProcessOutcome::Duplicate);

    // Neither history nor analytics saw the replay
    let records = engine
        .history_window(
            &tank_id(),
            &HistoryQuery {
                since: 0,
                until: NOW,
                quality: None,
                limit: 100,
            },
        )
        .unwrap();
    assert_eq!(records.len(), 1);
    let hourly = engine.analytics(&tank_id(), PeriodType::Hourly).unwrap();
    assert_eq!(hourly[0].reading_count, 1);
}

#[test]
fn manual_adjustment_feeds_history_but_not_analytics() {
    let engine = engine();
    let mut adjustment = ManualAdjustment::of_volume(6000.0);
    adjustment.timestamp = Some(HOUR_START + 60_000);
    let record = engine.manual_adjustment(&tank_id(), &adjustment).unwrap();

    assert_eq!(record.quality, DataQuality::Manual);
    assert_eq!(record.quality_score, 100);
    assert_eq!(record.source, RecordSource::ManualAdjustment);
    assert_eq!(record.processing.method, "manual_entry");
    assert!((record.fill_percent - 60.0).abs() < 1e-3);

    // Cache tracks the entry, analytics stay untouched
    let state = engine.tank_state(&tank_id()).unwrap();
    assert_eq!(state.current_volume_liters, 6000.0);
    assert!(engine
        .analytics(&tank_id(), PeriodType::Hourly)
        .unwrap()
        .is_empty());

    // The next sensor reading opens its bucket against the entry
    engine
        .process_reading(&tank_id(), &reading(HOUR_START + 120_000, 1.5))
        .unwrap();
    let hourly = engine.analytics(&tank_id(), PeriodType::Hourly).unwrap();
    assert_eq!(hourly.len(), 1);
    assert_eq!(hourly[0].reading_count, 1);
}

#[test]
fn summary_covers_trusted_records_only() {
    let engine = engine();
    // Two good readings and one poor one
    engine
        .process_reading(&tank_id(), &reading(NOW - 3_600_000, 1.0))
        .unwrap();
    engine
        .process_reading(&tank_id(), &reading(NOW - 1_800_000, 1.4))
        .unwrap();
    let mut poor = reading(NOW - 900_000, 1.2);
    poor.quality = DataQuality::Poor;
    engine.process_reading(&tank_id(), &poor).unwrap();

    let summary = engine
        .summary(&tank_id(), SummaryWindow::Day)
        .unwrap()
        .expect("records in window");

    assert_eq!(summary.count, 2);
    // Levels 2.0 then 1.6 m: the trusted records only drew down
    assert!(summary.max_volume_liters > summary.min_volume_liters);
    let expected_net = summary.min_volume_liters - summary.max_volume_liters;
    assert!((summary.net_change_liters - expected_net).abs() < 1e-2);
    assert!((summary.avg_quality_score - DataQuality::Good.score() as f32).abs() < 1e-3);
}

#[test]
fn usage_totals_follow_chronological_deltas() {
    let engine = engine();
    for (minute, gap) in [(1u64, 1.0f32), (10, 1.4), (20, 1.1), (30, 1.3)] {
        engine
            .process_reading(&tank_id(), &reading(HOUR_START + minute * 60_000, gap))
            .unwrap();
    }
    let totals = engine
        .usage_between(&tank_id(), HOUR_START, HOUR_START + 3_600_000)
        .unwrap();
    // Draws: 0.4 m + 0.2 m of level; fill: 0.3 m
    assert!((totals.used_liters - 6.0 * 314.16).abs() < 3.0);
    assert!((totals.added_liters - 3.0 * 314.16).abs() < 2.0);
}

#[test]
fn raw_frame_reaches_the_bound_tank() {
    let engine = engine();
    // Payload: temp 23.5, humidity 48.0, pm 12/18, noise 41.2,
    // level 500 mm air gap, rssi 72, error 0
    let mut line = String::from("FEDC1916098522754E0000002A010024");
    for value in [235i32, 480, 12, 18, 412, 500, 72, 0] {
        line.push_str(&format!("{:08X}", value as u32));
    }
    let line = format!("2024-03-13 12:01:00.000Z {}", line);

    let outcome = engine.process_frame(&line).unwrap();
    let record = match outcome {
        ProcessOutcome::Recorded { record, .. } => record,
        other => panic!("unexpected outcome: {:?}", other),
    };
    // 0.5 m air gap in a 3 m tank
    assert!((record.level_m - 2.5).abs() < 1e-3);
    assert_eq!(record.timestamp, HOUR_START + 60_000);
    assert_eq!(record.environment.temperature_c, Some(23.5));
    assert_eq!(record.environment.rssi_dbm, Some(-28.0));
}

#[test]
fn low_and_critical_thresholds_fire() {
    let engine = bare_engine();
    let mut config = diesel_tank();
    config.thresholds = AlertThresholds {
        low: 20.0,
        high: 80.0,
        critical: 95.0,
    };
    engine.register_tank(config).unwrap();

    // Air gap 2.9 m: level 0.1 m, ~3% full
    let outcome = engine
        .process_reading(&tank_id(), &reading(HOUR_START + 60_000, 2.9))
        .unwrap();
    match outcome {
        ProcessOutcome::Recorded { status, .. } => assert_eq!(status, FillStatus::Low),
        other => panic!("unexpected outcome: {:?}", other),
    }

    // Air gap 0.05 m: ~98% full
    let outcome = engine
        .process_reading(&tank_id(), &reading(HOUR_START + 120_000, 0.05))
        .unwrap();
    match outcome {
        ProcessOutcome::Recorded { status, .. } => assert_eq!(status, FillStatus::Critical),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn unknown_device_is_skipped_not_fatal() {
    let engine = engine();
    let stray = device();
    // Unbind by registering a tank without the serial, then address a
    // serial nobody owns
    let err = engine
        .process_for_device(
            &tankgauge_core::DeviceId::try_from("DEADBEEF0000").unwrap(),
            &reading(HOUR_START, 1.0),
        )
        .unwrap_err();
    assert!(err.is_reading_scoped());
    // The bound device still works afterwards
    engine
        .process_for_device(&stray, &reading(HOUR_START, 1.0))
        .unwrap();
}

#[test]
fn independent_tanks_process_concurrently() {
    let engine = Arc::new(bare_engine());

    let ids: Vec<TankId> = (0..4)
        .map(|i| {
            let id = TankId::try_from(format!("tank-{}", i).as_str()).unwrap();
            let mut config = diesel_tank();
            config.id = id.clone();
            config.device_serial = None;
            engine.register_tank(config).unwrap();
            id
        })
        .collect();

    std::thread::scope(|scope| {
        for id in &ids {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for step in 0..50u64 {
                    let gap = 1.0 + (step % 10) as f32 * 0.05;
                    engine
                        .process_reading(id, &reading(HOUR_START + step * 1000, gap))
                        .unwrap();
                }
            });
        }
    });

    for id in &ids {
        let records = engine
            .history_window(
                id,
                &HistoryQuery {
                    since: 0,
                    until: NOW,
                    quality: None,
                    limit: 1000,
                },
            )
            .unwrap();
        assert_eq!(records.len(), 50);
        // Newest first, strictly ordered: the per-tank critical section
        // never interleaved
        assert!(records.windows(2).all(|w| w[0].timestamp > w[1].timestamp));

        let hourly = engine.analytics(id, PeriodType::Hourly).unwrap();
        assert_eq!(hourly[0].reading_count, 50);
    }
}
