use crate::ExtError;
use crate::policy::ErrorPolicy;

/// Propagation helpers on `Result<T, ExtError>`.
///
/// These keep `?` chains readable: the error arm is transformed in place, the
/// `Ok` arm passes through untouched.
///
/// Example
/// ```rust,ignore
/// use exterr::{ExtError, ResultExt};
///
/// fn load_profile(id: u64) -> Result<Profile, ExtError> {
///     let row = query_user(id).add_trace()?;
///     decode(row).prefix_err("decode profile")
/// }
/// ```
pub trait ResultExt<T> {
    /// Record the caller's site on the error, see [`ExtError::add_trace`].
    fn add_trace(self) -> Self;

    /// Prefix the error's message, see [`ExtError::add_message_prefix`].
    fn prefix_err(self, text: &str) -> Self;

    /// Fold the error into an outer one built lazily, see [`ExtError::wrap`].
    fn wrap_err<F>(self, outer: F) -> Self
    where
        F: FnOnce() -> ExtError;

    /// Emit the error through `policy` and return the result unchanged.
    fn emit_error(self, policy: &impl ErrorPolicy) -> Self;
}

impl<T> ResultExt<T> for Result<T, ExtError> {
    // no map_err here: a closure frame would be reported as the call site
    #[inline(never)]
    fn add_trace(self) -> Self {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.add_trace()),
        }
    }

    fn prefix_err(self, text: &str) -> Self {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.add_message_prefix(text)),
        }
    }

    fn wrap_err<F>(self, outer: F) -> Self
    where
        F: FnOnce() -> ExtError,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(outer().wrap(err)),
        }
    }

    fn emit_error(self, policy: &impl ErrorPolicy) -> Self {
        if let Err(ref err) = self {
            policy.emit(err);
        }
        self
    }
}

/// Lift foreign errors into [`ExtError`] at the boundary where they appear.
///
/// Example
/// ```rust,ignore
/// use exterr::IntoExtError;
///
/// let text = std::fs::read_to_string(path).ext_context("read config")?;
/// ```
pub trait IntoExtError<T> {
    /// Convert the error with [`ExtError::from_error`]: the message becomes
    /// `"{message}: {err}"` and the trace starts at the caller.
    ///
    /// An `ExtError` keeps its alternate message, code and trace; its message
    /// is prefixed and the caller's site is recorded as with
    /// [`ExtError::add_trace`].
    fn ext_context(self, message: &str) -> Result<T, ExtError>;
}

impl<T, E> IntoExtError<T> for Result<T, E>
where
    E: std::error::Error + 'static,
{
    #[inline(never)]
    fn ext_context(self, message: &str) -> Result<T, ExtError> {
        let err = match self {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        match boxed.downcast::<ExtError>() {
            Ok(ext) => Err((*ext).add_message_prefix(message).add_trace()),
            Err(foreign) => Err(ExtError::from_error(message, foreign)),
        }
    }
}
