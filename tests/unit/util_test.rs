//! Tests for utility modules

use task_sim::core::LedgerSnapshot;
use task_sim::util::{now_ms, ResourceKind, ResourceQuote, TaskHandle};

#[test]
fn test_now_ms_is_monotone_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_quote_accessors() {
    let quote = ResourceQuote::new(50, 5, 1);
    assert_eq!(quote.get(ResourceKind::Ram), 50);
    assert_eq!(quote.get(ResourceKind::Disk), 5);
    assert_eq!(quote.get(ResourceKind::Cores), 1);
    assert_eq!(quote.to_string(), "50 MB RAM, 5 MB disk, 1 cores");
}

#[test]
fn test_quote_serde_shape() {
    let json = serde_json::to_value(ResourceQuote::new(1, 2, 3)).unwrap();
    assert_eq!(json, serde_json::json!({ "ram": 1, "disk": 2, "cores": 3 }));
    assert_eq!(serde_json::to_value(TaskHandle(7)).unwrap(), serde_json::json!(7));
}

#[test]
fn test_snapshot_usage() {
    let snap = LedgerSnapshot {
        total: ResourceQuote::new(200, 100, 0),
        available: ResourceQuote::new(150, 100, 0),
    };
    assert_eq!(snap.used(), ResourceQuote::new(50, 0, 0));
    assert!((snap.used_percent(ResourceKind::Ram) - 25.0).abs() < f64::EPSILON);
    assert!(snap.used_percent(ResourceKind::Cores).abs() < f64::EPSILON);
}
