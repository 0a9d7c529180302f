use super::*;
use crate::util::test::assert_send_sync;

#[test]
fn gate_is_send_and_sync() {
    assert_send_sync::<Gate>();
}

#[test]
fn timed_out_is_send_and_sync() {
    assert_send_sync::<TimedOut>();
}

#[test]
fn timeout_conversions() {
    assert_eq!(Timeout::default(), Timeout::Indefinite);
    assert_eq!(
        Timeout::from(Duration::from_secs(1)),
        Timeout::After(Duration::from_secs(1))
    );
    assert_eq!(
        Timeout::from(Some(Duration::ZERO)),
        Timeout::After(Duration::ZERO)
    );
    assert_eq!(Timeout::from(None), Timeout::Indefinite);
}

#[test]
fn wait_outcome_predicates() {
    assert!(WaitOutcome::Signalled.is_signalled());
    assert!(!WaitOutcome::Signalled.is_timed_out());
    assert!(WaitOutcome::TimedOut.is_timed_out());
    assert!(!WaitOutcome::TimedOut.is_signalled());
}

#[test]
fn timed_out_display() {
    assert_eq!(TimedOut::new().to_string(), "timed out");
}
