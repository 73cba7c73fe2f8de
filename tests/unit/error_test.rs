//! Tests for error types

use task_sim::core::SimError;
use task_sim::util::{ResourceKind, ResourceQuote};

#[test]
fn test_resource_exhausted_error() {
    let err = SimError::ResourceExhausted {
        short: ResourceKind::Ram,
        requested: ResourceQuote::new(60, 10, 2),
        available: ResourceQuote::new(10, 10, 1),
    };
    assert_eq!(
        format!("{err}"),
        "not enough RAM: requested 60 MB RAM, 10 MB disk, 2 cores, \
         available 10 MB RAM, 10 MB disk, 1 cores"
    );
    assert!(err.is_recoverable());
}

#[test]
fn test_capacity_exceeded_error() {
    let err = SimError::CapacityExceeded { max: 50 };
    assert_eq!(format!("{err}"), "maximum number of tasks reached (50)");
    assert!(err.is_recoverable());
}

#[test]
fn test_invalid_index_error() {
    let err = SimError::InvalidIndex(3);
    assert_eq!(format!("{err}"), "invalid task index: 3");
    assert!(err.is_recoverable());
}

#[test]
fn test_runner_errors_are_not_recoverable() {
    assert_eq!(
        format!("{}", SimError::Spawn("no threads".into())),
        "spawn failed: no threads"
    );
    assert!(!SimError::Spawn(String::new()).is_recoverable());
    assert!(!SimError::Terminate(String::new()).is_recoverable());
    assert!(!SimError::SessionClosed.is_recoverable());
}

#[test]
fn test_errors_convert_into_anyhow() {
    let result: task_sim::core::AppResult<()> = Err(SimError::SessionClosed.into());
    assert_eq!(result.unwrap_err().to_string(), "session is shut down");
}
