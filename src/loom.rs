#[allow(unused_imports)]
pub(crate) use self::inner::*;

#[cfg(loom)]
mod inner {
    #![allow(dead_code)]
    #![allow(unused_imports)]

    pub(crate) use loom::thread;

    pub(crate) mod sync {
        pub(crate) use loom::sync::*;
        pub(crate) use std::sync::PoisonError;
    }

    #[cfg(test)]
    pub(crate) mod model {
        use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

        #[non_exhaustive]
        #[derive(Default)]
        pub(crate) struct Builder {
            pub(crate) preemption_bound: Option<usize>,
        }

        impl Builder {
            pub(crate) fn new() -> Self {
                Self::default()
            }

            /// Explores every interleaving of `f`, with tracing output
            /// filtered by `LOOM_LOG`.
            pub(crate) fn check(&self, f: impl Fn() + Sync + Send + 'static) {
                let _trace = crate::util::test::trace_init();
                let _span = tracing::info_span!(
                    "test",
                    message = std::thread::current().name().unwrap_or("<unnamed>")
                )
                .entered();

                let mut builder = loom::model::Builder::new();
                builder.preemption_bound = self.preemption_bound;

                let iteration = AtomicUsize::new(1);
                tracing::info!("started test...");
                builder.check(move || {
                    let iteration = iteration.fetch_add(1, Relaxed);
                    let _span = tracing::info_span!("iteration", iteration).entered();
                    f();
                });
                tracing::info!("test completed successfully!");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn model(f: impl Fn() + Sync + Send + 'static) {
        model::Builder::new().check(f)
    }
}

#[cfg(not(loom))]
mod inner {
    #![allow(dead_code, unused_imports)]
    pub(crate) mod sync {
        pub(crate) use std::sync::*;
    }


    /// Runs `f` once, with tracing enabled.
    ///
    /// Without `--cfg loom`, there is no model checker, so the test body is
    /// simply executed on the real `std` primitives.
    #[cfg(test)]
    pub(crate) fn model(f: impl FnOnce()) {
        let _trace = crate::util::trace_init();
        let _span = tracing::info_span!(
            "test",
            message = std::thread::current().name().unwrap_or("<unnamed>")
        )
        .entered();

        tracing::info!("started test...");
        f();
        tracing::info!("test completed successfully!");
    }
}
