#![cfg(not(loom))]
//! Property tests for signal banking across the public API.
use proptest::{collection::vec, prop_oneof, strategy::Strategy};
use std::{thread, time::Duration};
use sync_gate::{Gate, WaitOutcome};

#[derive(Debug, Clone, Copy)]
enum Action {
    Signal,
    TryWait,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        proptest::strategy::Just(Action::Signal),
        proptest::strategy::Just(Action::TryWait),
    ]
}

proptest::proptest! {
    #[test]
    fn n_signals_release_n_waits(n in 0usize..64) {
        let gate = Gate::new();
        for _ in 0..n {
            gate.signal();
        }
        proptest::prop_assert_eq!(gate.pending_signals(), n);

        for _ in 0..n {
            proptest::prop_assert_eq!(gate.wait(Duration::ZERO), WaitOutcome::Signalled);
        }
        proptest::prop_assert_eq!(gate.wait(Duration::ZERO), WaitOutcome::TimedOut);
    }

    #[test]
    fn count_matches_model(actions in vec(action_strategy(), 0..100)) {
        let gate = Gate::new();
        let mut expected = 0usize;

        for action in actions {
            match action {
                Action::Signal => {
                    gate.signal();
                    expected += 1;
                }
                Action::TryWait => {
                    let consumed = gate.try_wait();
                    proptest::prop_assert_eq!(consumed, expected > 0);
                    expected = expected.saturating_sub(1);
                }
            }
            proptest::prop_assert_eq!(gate.pending_signals(), expected);
        }
    }

    #[test]
    fn signals_from_many_threads_are_not_lost(threads in 1usize..8) {
        let gate = Gate::new();
        let handles = (0..threads)
            .map(|_| {
                let gate = gate.clone();
                thread::spawn(move || gate.signal())
            })
            .collect::<Vec<_>>();

        for _ in 0..threads {
            proptest::prop_assert_eq!(gate.wait(Duration::from_secs(5)), WaitOutcome::Signalled);
        }
        for handle in handles {
            handle.join().unwrap();
        }
        proptest::prop_assert_eq!(gate.pending_signals(), 0);
    }
}

#[test]
fn free_run_with_callback_thread() {
    let (tx, rx) = std::sync::mpsc::channel();
    sync_gate::run(|gate| {
        let gate = gate.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.send("done").unwrap();
            gate.signal();
        });
    });
    assert_eq!(rx.try_recv(), Ok("done"));
}
