//! Policies for emitting errors at application boundaries.
//!
//! The library never logs an error on its own; callers hand it to an
//! `ErrorPolicy` where it leaves their control (a request handler, a worker
//! loop). Emission can be anything:
//! - tracing logs
//! - UI event bus
//! - custom telemetry
//!
//! Example
//! ```rust,ignore
//! use exterr::{ErrorPolicy, ExtError};
//!
//! struct PrintPolicy;
//! impl ErrorPolicy for PrintPolicy {
//!     fn emit(&self, e: &ExtError) { eprintln!("{e} at {}", e.trace_raw()); }
//! }
//! ```

use super::ExtError;

pub trait ErrorPolicy: Send + Sync {
    /// Emit the error according to the policy (e.g., log, send to UI, etc.)
    fn emit(&self, error: &ExtError);
}

/// A no-operation policy that does nothing
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn emit(&self, _error: &ExtError) {}
}

/// Emits an `ERROR` event with the error's fields and tagged trace.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn emit(&self, error: &ExtError) {
        use tracing::{Level, event};

        event!(
            Level::ERROR,
            error = %error.message(),
            alt_message = %error.alt_message(),
            code = error.code(),
            trace = %error.trace_tagged(),
            "extended error"
        );
    }
}

/// A composite policy that delegates to multiple policies.
///
/// Emission is delegated to all inner policies in insertion order.
///
/// Example
/// ```rust,ignore
/// use exterr::policy::{CombinedPolicy, NoopPolicy};
/// let policy = CombinedPolicy::new()
///     .push(NoopPolicy::default());
/// // with the `tracing` feature:
/// // let policy = policy.push(exterr::policy::TracingPolicy::default());
/// ```
#[derive(Default)]
pub struct CombinedPolicy {
    policies: Vec<Box<dyn ErrorPolicy>>,
}

impl CombinedPolicy {
    /// Create an empty CombinedPolicy.
    pub fn new() -> Self {
        Self { policies: Vec::new() }
    }

    /// Add a policy by value (boxed internally). Consumes and returns Self for
    /// builder-style chaining.
    pub fn push<P: ErrorPolicy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    /// Add an already boxed policy.
    pub fn add_boxed(mut self, policy: Box<dyn ErrorPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl ErrorPolicy for CombinedPolicy {
    fn emit(&self, error: &ExtError) {
        for p in &self.policies {
            p.emit(error);
        }
    }
}
