//! Call-site resolution.
//!
//! Everything that depends on how the runtime exposes caller information lives
//! behind [`CallSiteResolver`]. The rest of the crate only ever sees [`Frame`]s.

use crate::Frame;

/// Produces the [`Frame`] of an application call site.
///
/// Resolution is best-effort: an implementation that cannot identify a frame
/// returns [`Frame::default()`] instead of failing.
pub trait CallSiteResolver: Send + Sync {
    /// Resolve the current application call site, skipping `frames_to_skip`
    /// further application frames above it.
    fn resolve(&self, frames_to_skip: usize) -> Frame;
}

/// A pre-captured site, typically produced by [`here!`](crate::here).
impl CallSiteResolver for Frame {
    fn resolve(&self, _frames_to_skip: usize) -> Frame {
        self.clone()
    }
}

/// Always resolves to the zero frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl CallSiteResolver for NullResolver {
    fn resolve(&self, _frames_to_skip: usize) -> Frame {
        Frame::default()
    }
}

/// The resolver used by the plain constructors and `add_trace`.
///
/// [`BacktraceResolver`] with the `backtrace` feature, [`NullResolver`] otherwise.
pub fn default_resolver() -> &'static dyn CallSiteResolver {
    &DEFAULT
}

#[cfg(feature = "backtrace")]
static DEFAULT: BacktraceResolver = BacktraceResolver;

#[cfg(not(feature = "backtrace"))]
static DEFAULT: NullResolver = NullResolver;

#[cfg(feature = "backtrace")]
pub use walk::BacktraceResolver;

#[cfg(feature = "backtrace")]
mod walk {
    use super::CallSiteResolver;
    use crate::Frame;

    const CRATE_PATH: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    const AS_CRATE_PATH: &str = concat!(" as ", env!("CARGO_CRATE_NAME"), "::");

    /// Walks the live stack with the `backtrace` crate.
    ///
    /// Frames belonging to the stack walker and to this crate are skipped, so
    /// the first frame considered is the application code that called into the
    /// library. File and line need debug info (`line-tables-only` is enough);
    /// without it they come back empty and `0`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BacktraceResolver;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Phase {
        /// Still inside the stack walker itself.
        Walker,
        /// Inside library frames that called the resolver.
        Library,
        /// Counting down application frames.
        Application,
    }

    impl CallSiteResolver for BacktraceResolver {
        #[inline(never)]
        fn resolve(&self, frames_to_skip: usize) -> Frame {
            let mut phase = Phase::Walker;
            let mut remaining = frames_to_skip;
            let mut found: Option<Frame> = None;

            backtrace::trace(|raw| {
                backtrace::resolve_frame(raw, |symbol| {
                    if found.is_some() {
                        return;
                    }
                    let name = symbol
                        .name()
                        .map(|n| format!("{n:#}"))
                        .unwrap_or_default();
                    let internal = is_library_frame(&name);

                    match phase {
                        Phase::Walker if internal => phase = Phase::Library,
                        Phase::Walker => {}
                        Phase::Library if internal => {}
                        Phase::Library | Phase::Application => {
                            phase = Phase::Application;
                            if remaining == 0 {
                                let file = symbol
                                    .filename()
                                    .map(|p| p.to_string_lossy().into_owned())
                                    .unwrap_or_default();
                                let line = symbol.lineno().unwrap_or(0);
                                found = Some(Frame::from_qualified(&name, &file, line));
                            } else {
                                remaining -= 1;
                            }
                        }
                    }
                });
                found.is_none()
            });

            match found {
                Some(frame) => frame,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(frames_to_skip, "call site not resolvable; using zero frame");
                    Frame::default()
                }
            }
        }
    }

    fn is_library_frame(name: &str) -> bool {
        if name.contains("::tests::") {
            return false;
        }
        name.trim_start_matches('<').starts_with(CRATE_PATH) || name.contains(AS_CRATE_PATH)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn library_frames_are_recognised() {
            assert!(is_library_frame("exterr::record::ExtError::new"));
            assert!(is_library_frame("<exterr::record::ExtError as core::fmt::Display>::fmt"));
            assert!(is_library_frame(
                "<core::result::Result<T, E> as exterr::result_ext::ResultExt<T>>::add_trace"
            ));
            assert!(!is_library_frame("exterr::record::tests::builds"));
            assert!(!is_library_frame("app::handlers::load"));
            assert!(!is_library_frame("exterr_demo::main"));
            assert!(!is_library_frame(""));
        }
    }
}
