#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, doc(cfg_hide(docsrs, loom)))]
#![warn(missing_docs, missing_debug_implementations)]

pub(crate) mod loom;

#[macro_use]
pub(crate) mod util;

pub mod gate;

#[doc(inline)]
pub use self::gate::{run, run_timeout, Gate, Timeout, WaitOutcome};

/// An error indicating that a [`Gate`] was not signalled before a timeout
/// elapsed.
///
/// This error is returned by the [`Gate::run_timeout`] method and the
/// [`run_timeout`] function.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimedOut(());

impl TimedOut {
    pub(crate) const fn new() -> Self {
        Self(())
    }
}

impl core::fmt::Display for TimedOut {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad("timed out")
    }
}

impl std::error::Error for TimedOut {}
