//! Replay feeds from disk through the estimator.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveDateTime};
use hv_ambient::{AmbientEstimator, Freshness, ReplayDust, ReplayForecast};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[test]
fn replayed_feeds_drive_estimate() {
    let dir = unique_temp_dir("hv_ambient_replay");
    fs::write(
        dir.join("temperature.json"),
        r#"{"times": ["2024-03-01T06:00:00", "2024-03-01T12:00:00"], "data": [280.15, 286.15]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("precipitation.json"),
        r#"{"times": ["2024-03-01 06:00", "2024-03-01 12:00"], "data": [0.0, 0.72]}"#,
    )
    .unwrap();
    // No solar.json: that quantity stays missing.
    fs::write(
        dir.join("dust.json"),
        r#"{"times": ["2024-03-01 09:00", "2024-03-01 08:00", "2024-03-01 07:00"], "data": [null, 14.0, 10.0]}"#,
    )
    .unwrap();

    let mut est = AmbientEstimator::new(273.15);
    let mut forecast = ReplayForecast::new(&dir);
    let mut dust = ReplayDust::new(dir.join("dust.json"));
    assert_eq!(est.refresh_forecasts(&mut forecast), 2);
    assert!(est.refresh_dust(&mut dust));

    let report = est.estimate(at(9, 30));
    assert!((report.conditions.temperature - 10.5).abs() < 1e-9);
    assert!((report.conditions.precipitation - 0.42).abs() < 1e-9);
    assert_eq!(report.conditions.solar, 0.0);
    assert_eq!(report.freshness.solar, Freshness::Missing);
    // Anchor 14.0 is an hour old: 14 + (30 + 60) / 60 * (14 - 10).
    assert!((report.conditions.dust - 20.0).abs() < 1e-9);
    assert_eq!(report.freshness.dust, Freshness::Stale { hours: 1 });

    let degraded: Vec<_> = report.degraded().into_iter().map(|(name, _)| name).collect();
    assert_eq!(degraded, vec!["solar", "dust"]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_refresh_keeps_last_good_series() {
    let dir = unique_temp_dir("hv_ambient_corrupt");
    fs::write(
        dir.join("temperature.json"),
        r#"{"times": ["2024-03-01 06:00", "2024-03-01 12:00"], "data": [280.15, 286.15]}"#,
    )
    .unwrap();

    let mut est = AmbientEstimator::new(273.15);
    let mut forecast = ReplayForecast::new(&dir);
    assert_eq!(est.refresh_forecasts(&mut forecast), 1);

    fs::write(dir.join("temperature.json"), "{not json").unwrap();
    assert_eq!(est.refresh_forecasts(&mut forecast), 0);

    let report = est.estimate(at(6, 0));
    assert!((report.conditions.temperature - 7.0).abs() < 1e-9);
    assert!(report.freshness.temperature.is_fresh());

    let _ = fs::remove_dir_all(&dir);
}
