//! Extended errors with call-site traces.
//!
//! An [`ExtError`] carries a primary message, an alternate message that is
//! safe to show to end users, an optional classification code, and the
//! ordered list of call sites ([`Frame`]s) it was created at and observed at
//! while travelling up the call chain.
//!
//! - Construction seeds the trace with the creating call site.
//! - [`ExtError::add_trace`] (or [`add_trace!`]) records an intermediate site,
//!   skipping it when it is the same function as the most recent frame.
//! - [`ExtError::wrap`] folds a lower-level error into a higher-level one.
//! - The trace renders as a `/`-joined string, a tagged string, a flat JSON
//!   array or a nested JSON chain; [`ExtError::front_payload`] renders only
//!   what an untrusted caller may see.
//!
//! Call sites are resolved either at run time through a [`CallSiteResolver`]
//! (a stack walk with the `backtrace` feature) or at compile time by the
//! macros, which need neither debug info nor a stack walk.
//!
//! Quick start
//! ```rust
//! use exterr::{ExtError, ResultExt, ext_err};
//!
//! fn query() -> Result<u32, ExtError> {
//!     Err(ext_err!(alt = "user not found", code = 1, "sql: no rows"))
//! }
//!
//! fn handler() -> Result<u32, ExtError> {
//!     query().add_trace()
//! }
//!
//! let err = handler().unwrap_err();
//! assert_eq!(err.message(), "sql: no rows");
//! assert_eq!(err.front_json(), r#"{"error":"user not found","code":1}"#);
//! assert_eq!(err.trace_frames()[0].function, "query");
//! ```
//!
//! Feature flags
//! - `backtrace` (default): runtime stack walk for the plain constructors and
//!   `add_trace`. Without it those record a zero frame; the macros still work.
//! - `tracing`: debug events from the library, [`policy::TracingPolicy`] and
//!   [`PrettyDebug::emit_tracing`].

#[macro_use]
mod macros;

pub mod error;
pub mod frame;
pub mod policy;
pub mod pretty;
pub mod record;
pub mod render;
pub mod resolver;
pub mod result_ext;
pub mod trace;

// public exports
pub use error::TraceError;
pub use frame::Frame;
pub use policy::{CombinedPolicy, ErrorPolicy, NoopPolicy};
pub use pretty::PrettyDebug;
pub use record::ExtError;
pub use render::{
    DEFAULT_FRONT_CODE, DEFAULT_FRONT_MESSAGE, FrontDefaults, FrontPayload, NestedFrame,
};
pub use resolver::{CallSiteResolver, NullResolver, default_resolver};
#[cfg(feature = "backtrace")]
pub use resolver::BacktraceResolver;
pub use result_ext::{IntoExtError, ResultExt};
pub use trace::Trace;

/// Convenience Result alias.
pub type Result<T, E = ExtError> = std::result::Result<T, E>;
