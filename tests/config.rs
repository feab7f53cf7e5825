use std::time::Duration;

use tracer::{Delimiter, RefreshSettings, SeriesLayout, TracerConfig, TracerError};

#[test]
fn defaults() {
    let cfg = TracerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.delimiter(), Delimiter::Whitespace);
    let s = cfg.refresh_settings().unwrap();
    assert_eq!(s.band, None);
    assert_eq!(s.rate, Duration::from_secs_f64(tracer::config::DEFAULT_RATE_SECS));
}

#[test]
fn load_json_with_partial_keys() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"{ "sep": ";", "columns": "1,2/4", "band": 100, "quiet": true }"#,
    )
    .unwrap();

    let cfg = TracerConfig::load_json(file.path()).unwrap();
    assert_eq!(cfg.delimiter(), Delimiter::Exact(";".to_string()));
    assert_eq!(cfg.columns, Some("1,2/4".parse::<SeriesLayout>().unwrap()));
    assert_eq!(cfg.band, Some(100));
    assert!(cfg.quiet);
    assert_eq!(cfg.rate, tracer::config::DEFAULT_RATE_SECS);
}

#[test]
fn load_json_rejects_bad_columns() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{ "columns": "0,1" }"#).unwrap();
    assert!(matches!(
        TracerConfig::load_json(file.path()),
        Err(TracerError::Json(_))
    ));
}

#[test]
fn zero_values_are_rejected() {
    for cfg in [
        TracerConfig { band: Some(0), ..Default::default() },
        TracerConfig { offset: Some(0), ..Default::default() },
        TracerConfig { ncolumns: Some(0), ..Default::default() },
        TracerConfig { rate: -0.5, ..Default::default() },
        TracerConfig { rate: 1e20, ..Default::default() },
    ] {
        assert!(matches!(cfg.validate(), Err(TracerError::Config(_))), "{cfg:?}");
    }
}

#[test]
fn abscissa_needs_two_series() {
    let single = TracerConfig {
        abscissa: true,
        columns: Some("3".parse().unwrap()),
        ..Default::default()
    };
    assert!(single.validate().is_err());

    let narrow = TracerConfig {
        abscissa: true,
        ncolumns: Some(1),
        ..Default::default()
    };
    assert!(narrow.validate().is_err());

    let ok = TracerConfig {
        abscissa: true,
        columns: Some("1,2/3".parse().unwrap()),
        ..Default::default()
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn ncolumns_must_cover_selected_columns() {
    let cfg = TracerConfig {
        columns: Some("1,5".parse().unwrap()),
        ncolumns: Some(4),
        ..Default::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn refresh_settings_from_raw() {
    assert!(RefreshSettings::from_raw(Some(0), 0.1).is_err());
    assert!(RefreshSettings::from_raw(None, f64::NAN).is_err());
    let s = RefreshSettings::from_raw(Some(7), 0.0).unwrap();
    assert_eq!(s.band, Some(7));
    assert_eq!(s.rate, Duration::ZERO);
}
