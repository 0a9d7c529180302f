//! A blocking [`Gate`] for waiting on callback-driven operations.
//!
//! See the [`Gate`] type's documentation for details.
use crate::{
    loom::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    TimedOut,
};
use core::fmt;
use std::time::{Duration, Instant};

#[cfg(test)]
mod tests;

/// A blocking [counting semaphore] for bridging callback-based asynchronous
/// code and synchronous callers.
///
/// A `Gate` holds a count of pending _signals_. Calling [`signal`] adds a
/// signal and wakes at most one thread blocked in [`wait`]. Calling [`wait`]
/// consumes one pending signal, blocking the calling thread until one is
/// available (or until a [`Timeout`] elapses).
///
/// Signals are never lost: if [`signal`] is called before anyone is waiting,
/// the signal is _banked_, and a later call to [`wait`] returns immediately.
/// This means there is no race between an asynchronous operation completing
/// and the synchronous side beginning to wait for it.
///
/// A `Gate` is a handle to shared, reference-counted state. [`Clone`]ing it
/// produces another handle to the _same_ gate, which may be moved into a
/// completion callback running on another thread. The gate's state lives as
/// long as any handle to it, so a callback that fires after the waiting side
/// has timed out and returned may still signal it safely.
///
/// Any writes performed by a thread before it calls [`signal`] are visible
/// to the thread whose [`wait`] consumes that signal.
///
/// # Examples
///
/// Waiting for a callback that fires on another thread:
///
/// ```
/// use sync_gate::Gate;
/// use std::thread;
///
/// fn fetch_with_callback(on_done: impl FnOnce() + Send + 'static) {
///     thread::spawn(move || {
///         // ... do some work ...
///         on_done();
///     });
/// }
///
/// let gate = Gate::new();
/// fetch_with_callback({
///     let gate = gate.clone();
///     move || gate.signal()
/// });
///
/// // Blocks until the callback has fired.
/// gate.wait_forever();
/// ```
///
/// The same thing, using [`Gate::run`]:
///
/// ```
/// # use std::thread;
/// # fn fetch_with_callback(on_done: impl FnOnce() + Send + 'static) {
/// #     thread::spawn(move || on_done());
/// # }
/// sync_gate::run(|gate| {
///     let gate = gate.clone();
///     fetch_with_callback(move || gate.signal());
/// });
/// ```
///
/// [counting semaphore]: https://en.wikipedia.org/wiki/Semaphore_(programming)
/// [`signal`]: Gate::signal
/// [`wait`]: Gate::wait
#[derive(Clone)]
pub struct Gate {
    inner: Arc<Inner>,
}

/// How long [`Gate::wait`] may block before giving up.
///
/// A `Timeout` can be constructed from a [`Duration`] (producing
/// [`Timeout::After`]) or from an [`Option`]`<`[`Duration`]`>` (where [`None`]
/// produces [`Timeout::Indefinite`]).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Timeout {
    /// Block until a signal is available, however long that takes.
    #[default]
    Indefinite,

    /// Block for at most the given [`Duration`].
    ///
    /// A zero duration does not mean "forever": it polls the gate without
    /// blocking.
    After(Duration),
}

/// The reason a call to [`Gate::wait`] returned.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WaitOutcome {
    /// A signal was consumed.
    Signalled,

    /// The [`Timeout`] elapsed before a signal became available. No signal
    /// was consumed.
    TimedOut,
}

struct Inner {
    /// The number of signals that have been sent but not yet consumed by a
    /// waiter.
    signals: Mutex<usize>,
    /// Notified once per signal.
    condvar: Condvar,
}

// === impl Gate ===

impl Gate {
    /// The maximum number of unconsumed signals a `Gate` may hold.
    pub const MAX_SIGNALS: usize = usize::MAX;

    /// Returns a new `Gate` with no pending signals.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                signals: Mutex::new(0),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Blocks the current thread until this gate is signalled, or until
    /// `timeout` elapses.
    ///
    /// If a signal is already pending, it is consumed and this method returns
    /// immediately. Otherwise, the thread is parked until a call to
    /// [`signal`](Self::signal) makes one available. Spurious wakeups are
    /// handled internally and never cause an early return.
    ///
    /// `timeout` may be a [`Timeout`], a [`Duration`], or an
    /// [`Option`]`<`[`Duration`]`>`.
    ///
    /// # Returns
    ///
    /// - [`WaitOutcome::Signalled`] if a signal was consumed.
    /// - [`WaitOutcome::TimedOut`] if the timeout elapsed first.
    ///
    /// Timing out is not an error. Callers that only care about getting out of
    /// the wait may ignore the returned value.
    ///
    /// # Examples
    ///
    /// ```
    /// use sync_gate::{Gate, WaitOutcome};
    /// use std::time::Duration;
    ///
    /// let gate = Gate::new();
    /// assert_eq!(gate.wait(Duration::from_millis(10)), WaitOutcome::TimedOut);
    ///
    /// gate.signal();
    /// assert_eq!(gate.wait(Duration::from_millis(10)), WaitOutcome::Signalled);
    /// ```
    pub fn wait(&self, timeout: impl Into<Timeout>) -> WaitOutcome {
        let timeout = timeout.into();
        enter_test_debug_span!("Gate::wait", gate = ?crate::util::fmt::ptr(&*self.inner), ?timeout);

        // a deadline too far in the future to represent is as good as none.
        let deadline = match timeout {
            Timeout::Indefinite => None,
            Timeout::After(duration) => Instant::now().checked_add(duration),
        };

        let mut signals = self.inner.lock();
        loop {
            if test_dbg!(*signals) > 0 {
                *signals -= 1;
                trace!(
                    gate = ?crate::util::fmt::ptr(&*self.inner),
                    remaining = *signals,
                    "Gate::wait -> signalled",
                );
                return WaitOutcome::Signalled;
            }

            signals = match deadline {
                None => self
                    .inner
                    .condvar
                    .wait(signals)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        trace!(
                            gate = ?crate::util::fmt::ptr(&*self.inner),
                            ?timeout,
                            "Gate::wait -> timed out",
                        );
                        return WaitOutcome::TimedOut;
                    }

                    let (signals, _) = self
                        .inner
                        .condvar
                        .wait_timeout(signals, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    signals
                }
            };
            test_debug!("Gate::wait: woke up");
        }
    }

    /// Blocks the current thread until this gate is signalled.
    ///
    /// This is equivalent to `gate.wait(Timeout::Indefinite)`.
    ///
    /// # Deadlocks
    ///
    /// If nothing ever calls [`signal`](Self::signal) on this gate (or a clone
    /// of it), this method never returns.
    pub fn wait_forever(&self) {
        let outcome = self.wait(Timeout::Indefinite);
        debug_assert_eq!(outcome, WaitOutcome::Signalled);
    }

    /// Consumes a pending signal without blocking.
    ///
    /// Returns `true` if a signal was pending (and has now been consumed), or
    /// `false` if the gate was not signalled.
    pub fn try_wait(&self) -> bool {
        let mut signals = self.inner.lock();
        if *signals == 0 {
            return false;
        }

        *signals -= 1;
        true
    }

    /// Signals the gate, waking at most one thread blocked in
    /// [`wait`](Self::wait).
    ///
    /// If no thread is currently waiting, the signal is stored, and the next
    /// call to [`wait`](Self::wait) will consume it and return immediately.
    /// Each call adds exactly one signal, so `n` calls release `n` waits.
    ///
    /// This may be called from any thread, including from inside a completion
    /// callback invoked by some other runtime.
    ///
    /// # Panics
    ///
    /// If the gate already holds [`MAX_SIGNALS`](Self::MAX_SIGNALS)
    /// unconsumed signals. With `MAX_SIGNALS` equal to [`usize::MAX`], this
    /// cannot happen in practical use.
    pub fn signal(&self) {
        enter_test_debug_span!("Gate::signal", gate = ?crate::util::fmt::ptr(&*self.inner));

        let mut signals = self.inner.lock();
        let Some(next) = signals.checked_add(1) else {
            drop(signals);
            panic!("a gate may not hold more than Gate::MAX_SIGNALS unconsumed signals");
        };
        *signals = next;
        trace!(
            gate = ?crate::util::fmt::ptr(&*self.inner),
            signals = next,
            "Gate::signal",
        );
        drop(signals);

        self.inner.condvar.notify_one();
    }

    /// Returns the number of signals that have been sent to this gate but not
    /// yet consumed.
    ///
    /// This is a snapshot: by the time it returns, another thread may have
    /// signalled or waited on the gate.
    #[must_use]
    pub fn pending_signals(&self) -> usize {
        *self.inner.lock()
    }

    /// Returns `true` if `this` and `other` are handles to the same gate.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Calls `f` with a handle to this gate, then blocks until the gate is
    /// signalled.
    ///
    /// `f` runs to completion on the calling thread before the wait begins.
    /// It is expected to start some asynchronous operation and arrange for
    /// [`signal`](Self::signal) to be called when that operation completes,
    /// typically by moving a [`clone`](Clone::clone) of the gate into the
    /// operation's completion callback. If `f` signals the gate synchronously,
    /// the signal is stored and `run` returns without blocking.
    ///
    /// # Deadlocks
    ///
    /// If `f` never arranges for the gate to be signalled, `run` blocks
    /// forever. This is not detected. Use [`run_timeout`](Self::run_timeout)
    /// to bound the wait.
    ///
    /// # Examples
    ///
    /// ```
    /// use sync_gate::Gate;
    /// use std::{sync::mpsc, thread};
    ///
    /// let (tx, rx) = mpsc::channel();
    /// Gate::new().run(|gate| {
    ///     let gate = gate.clone();
    ///     thread::spawn(move || {
    ///         tx.send(42).unwrap();
    ///         gate.signal();
    ///     });
    /// });
    ///
    /// assert_eq!(rx.try_recv(), Ok(42));
    /// ```
    pub fn run(&self, f: impl FnOnce(&Gate)) {
        f(self);
        self.wait_forever();
    }

    /// Calls `f` with a handle to this gate, then blocks until the gate is
    /// signalled or `timeout` elapses.
    ///
    /// This behaves like [`run`](Self::run), but reports a timeout to the
    /// caller rather than potentially blocking forever.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the gate was signalled.
    /// - `Err(`[`TimedOut`]`)` if `timeout` elapsed first. The operation
    ///   started by `f` is not cancelled; if it signals the gate later, the
    ///   signal is stored.
    pub fn run_timeout(
        &self,
        timeout: impl Into<Timeout>,
        f: impl FnOnce(&Gate),
    ) -> Result<(), TimedOut> {
        f(self);
        match self.wait(timeout) {
            WaitOutcome::Signalled => Ok(()),
            WaitOutcome::TimedOut => Err(TimedOut::new()),
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Gate");
        match self.inner.signals.try_lock() {
            Ok(signals) => s.field("signals", &*signals),
            Err(_) => s.field("signals", &format_args!("<locked>")),
        };
        s.finish()
    }
}

// === impl Inner ===

impl Inner {
    /// Locks the signal count.
    ///
    /// The count is only modified by single, non-panicking assignments, so it
    /// is always consistent and a poisoned lock can be used as-is.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// === impl Timeout ===

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::After(duration)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(duration: Option<Duration>) -> Self {
        match duration {
            Some(duration) => Timeout::After(duration),
            None => Timeout::Indefinite,
        }
    }
}

// === impl WaitOutcome ===

impl WaitOutcome {
    /// Returns `true` if a signal was consumed.
    #[must_use]
    pub fn is_signalled(self) -> bool {
        matches!(self, WaitOutcome::Signalled)
    }

    /// Returns `true` if the wait timed out.
    #[must_use]
    pub fn is_timed_out(self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// Calls `f` with a handle to a new [`Gate`], then blocks until that gate is
/// signalled.
///
/// This is shorthand for `Gate::new().run(f)`. See [`Gate::run`] for details,
/// including the deadlock hazard if `f` never signals the gate.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// sync_gate::run(|gate| {
///     let gate = gate.clone();
///     thread::spawn(move || gate.signal());
/// });
/// ```
pub fn run(f: impl FnOnce(&Gate)) {
    Gate::new().run(f)
}

/// Calls `f` with a handle to a new [`Gate`], then blocks until that gate is
/// signalled or `timeout` elapses.
///
/// This is shorthand for `Gate::new().run_timeout(timeout, f)`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// // Nothing signals the gate, so this times out.
/// let res = sync_gate::run_timeout(Duration::from_millis(10), |_gate| {});
/// assert!(res.is_err());
/// ```
pub fn run_timeout(timeout: impl Into<Timeout>, f: impl FnOnce(&Gate)) -> Result<(), TimedOut> {
    Gate::new().run_timeout(timeout, f)
}
