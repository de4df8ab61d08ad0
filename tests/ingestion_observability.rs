use std::sync::{Arc, Mutex};

use dashboard_data_engine::EngineError;
use dashboard_data_engine::ingestion::{
    CompositeObserver, IngestionContext, IngestionFormat, IngestionObserver, IngestionOptions, IngestionSeverity,
    IngestionStats, ingest_from_path,
};
use dashboard_data_engine::types::{Column, DataType, Schema};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &EngineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &EngineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn schema_id_only() -> Schema {
    Schema::new(vec![Column::new("order_id", DataType::Int64)])
}

fn schema_missing_col() -> Schema {
    Schema::new(vec![Column::new("definitely_missing", DataType::Utf8)])
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
    };

    // Missing file -> Io error -> Critical
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &schema_id_only(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Critical]);
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(IngestionFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
    };

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_path("tests/fixtures/sales.csv", &schema_missing_col(), &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn composite_observer_fans_out_success_stats() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        a.clone() as Arc<dyn IngestionObserver>,
        b.clone() as Arc<dyn IngestionObserver>,
    ]);
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    ingest_from_path("tests/fixtures/sales.csv", &schema_id_only(), &opts).unwrap();

    let expected = vec![IngestionStats { rows: 5, columns: 1 }];
    assert_eq!(*a.successes.lock().unwrap(), expected);
    assert_eq!(*b.successes.lock().unwrap(), expected);
}

#[test]
fn alert_threshold_can_be_lowered() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };

    let _ = ingest_from_path("tests/fixtures/sales.csv", &schema_missing_col(), &opts).unwrap_err();
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Error]);
}
