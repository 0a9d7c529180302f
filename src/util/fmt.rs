pub use core::fmt::*;

/// A wrapper type that formats the wrapped value using a provided function.
///
/// This is used to implement the `ptr` util function.
pub(crate) struct FormatWith<T, F = fn(&T, &mut Formatter<'_>) -> Result>
where
    F: Fn(&T, &mut Formatter<'_>) -> Result,
{
    value: T,
    fmt: F,
}

// === impl FormatWith ===

/// Formats a pointer's address, for identifying a gate in trace events.
#[inline]
#[must_use]
pub(crate) fn ptr<T: Pointer>(value: T) -> FormatWith<T> {
    FormatWith {
        value,
        fmt: Pointer::fmt,
    }
}

impl<T, F> Debug for FormatWith<T, F>
where
    F: Fn(&T, &mut Formatter<'_>) -> Result,
{
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        (self.fmt)(&self.value, f)
    }
}
