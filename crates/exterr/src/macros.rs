/// Capture the current call site as a [`Frame`](crate::Frame) at compile time.
///
/// The enclosing function's path comes from the type name of a nested item,
/// so the result matches what the runtime resolver reports for the same
/// function and does not depend on debug info or inlining.
///
/// ```
/// let site = exterr::here!();
/// assert_eq!(site.line, line!() - 1);
/// ```
#[macro_export]
macro_rules! here {
    () => {{
        fn __exterr_site() {}
        fn __exterr_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __exterr_name_of(__exterr_site);
        $crate::Frame::from_qualified(
            name.strip_suffix("::__exterr_site").unwrap_or(name),
            ::core::file!(),
            ::core::line!(),
        )
    }};
}

/// Build an [`ExtError`](crate::ExtError) whose creation frame is captured
/// with [`here!`].
///
/// # Forms
///
/// ```ignore
/// // Formatted message
/// ext_err!("port {} already in use", port)
///
/// // With alternate message
/// ext_err!(alt = "service unavailable", "bind failed on {}", port)
///
/// // With alternate message and classification code
/// ext_err!(alt = "user not found", code = 1, "sql: no rows")
/// ```
#[macro_export]
macro_rules! ext_err {
    (alt = $alt:expr, code = $code:expr, $($fmt:tt)+) => {
        $crate::ExtError::from_parts(
            ::std::format!($($fmt)+),
            $alt,
            $code,
            $crate::here!(),
        )
    };
    (alt = $alt:expr, $($fmt:tt)+) => {
        $crate::ExtError::from_parts(::std::format!($($fmt)+), $alt, 0, $crate::here!())
    };
    ($($fmt:tt)+) => {
        $crate::ExtError::from_parts(
            ::std::format!($($fmt)+),
            ::std::string::String::new(),
            0,
            $crate::here!(),
        )
    };
}

/// Record the current call site on an error, see
/// [`ExtError::add_trace`](crate::ExtError::add_trace).
///
/// ```ignore
/// fn load() -> Result<Config, ExtError> {
///     parse().map_err(|e| add_trace!(e))
/// }
/// ```
#[macro_export]
macro_rules! add_trace {
    ($err:expr) => {
        $err.add_trace_at($crate::here!())
    };
}

/// Early-return an [`ext_err!`] from the enclosing function.
///
/// ```ignore
/// bail_ext!(alt = "not allowed", code = 403, "user {} lacks role", id);
/// ```
#[macro_export]
macro_rules! bail_ext {
    ($($arg:tt)+) => {
        return ::core::result::Result::Err($crate::ext_err!($($arg)+).into())
    };
}

#[cfg(test)]
mod tests {
    use crate::{ExtError, Frame};

    fn creates() -> ExtError {
        ext_err!("boom {}", 7)
    }

    fn propagates() -> ExtError {
        add_trace!(add_trace!(creates()))
    }

    fn bails(fail: bool) -> Result<u8, ExtError> {
        if fail {
            bail_ext!(alt = "nope", code = 403, "denied for {}", "bob");
        }
        Ok(1)
    }

    #[test]
    fn here_names_enclosing_function() {
        let site = here!();
        assert_eq!(site.package, "exterr::macros::tests");
        assert_eq!(site.function, "here_names_enclosing_function");
        assert_eq!(site.file, "macros.rs");
        assert!(site.line > 0);
    }

    #[test]
    fn here_inside_closure_marks_closure() {
        let site = (|| here!())();
        assert_eq!(site.package, "exterr::macros::tests");
        assert!(
            site.function.starts_with("here_inside_closure_marks_closure::{{closure}}"),
            "unexpected function: {}",
            site.function
        );
    }

    #[test]
    fn ext_err_forms() {
        let plain = creates();
        assert_eq!(plain.message(), "boom 7");
        assert_eq!(plain.alt_message(), "");
        assert_eq!(plain.code(), 0);
        assert_eq!(plain.trace_frames()[0].function, "creates");

        let alt = ext_err!(alt = "shown", "hidden");
        assert_eq!((alt.message(), alt.alt_message()), ("hidden", "shown"));

        let typed = ext_err!(alt = "user not found", code = 1, "sql no rows");
        assert_eq!(typed.code(), 1);
    }

    #[test]
    fn add_trace_macro_dedups_same_function() {
        let err = propagates();
        let functions: Vec<_> = err.trace_frames().iter().map(|f| f.function.as_str()).collect();
        assert_eq!(functions, ["creates", "propagates"]);
    }

    #[test]
    fn bail_returns_error() {
        let err = bails(true).unwrap_err();
        assert_eq!(err.message(), "denied for bob");
        assert_eq!(err.alt_message(), "nope");
        assert_eq!(err.code(), 403);
        assert_eq!(bails(false).unwrap(), 1);
    }

    #[test]
    fn macro_and_manual_frames_share_site_identity() {
        let manual = Frame::from_qualified(
            "exterr::macros::tests::macro_and_manual_frames_share_site_identity",
            "macros.rs",
            1,
        );
        assert!(here!().same_site(&manual));
    }
}
