use crate::resolver::{CallSiteResolver, default_resolver};
use crate::{Frame, Trace};

/// An error value carrying a message, an alternate user-facing message, a
/// classification code and the trail of call sites it passed through.
///
/// Every constructor seeds the trace with exactly one frame: the call site
/// that built the error. `Display` prints the primary message only.
///
/// ```rust,ignore
/// use exterr::ExtError;
///
/// fn find_user(id: u64) -> Result<String, ExtError> {
///     Err(ExtError::with_type("sql: no rows in result set", "user not found", 404))
/// }
///
/// let err = find_user(7).unwrap_err().add_trace();
/// assert_eq!(err.alt_message(), "user not found");
/// println!("{}", err.trace_tagged());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExtError {
    message: String,
    alt_message: String,
    code: i64,
    trace: Trace,
}

impl ExtError {
    /// Message only; no alternate message, unclassified code.
    #[inline(never)]
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_parts(message, String::new(), 0, default_resolver().resolve(0))
    }

    #[inline(never)]
    pub fn with_alt(message: impl Into<String>, alt_message: impl Into<String>) -> Self {
        Self::from_parts(message, alt_message, 0, default_resolver().resolve(0))
    }

    #[inline(never)]
    pub fn with_type(
        message: impl Into<String>,
        alt_message: impl Into<String>,
        code: i64,
    ) -> Self {
        Self::from_parts(message, alt_message, code, default_resolver().resolve(0))
    }

    /// Lift a foreign error: the message becomes `"{message}: {err}"` and the
    /// trace starts fresh at this call site.
    #[inline(never)]
    pub fn from_error(message: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::from_parts(
            format!("{message}: {err}"),
            String::new(),
            0,
            default_resolver().resolve(0),
        )
    }

    /// Lift a foreign error using its own `Display` as the message.
    ///
    /// An `ExtError` behind the reference is returned as is, trace included.
    #[inline(never)]
    pub fn lift(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(ext) = err.downcast_ref::<ExtError>() {
            return ext.clone();
        }
        Self::from_parts(
            err.to_string(),
            String::new(),
            0,
            default_resolver().resolve(0),
        )
    }

    /// Build a new error on top of an existing one.
    ///
    /// The message is `"{message}: {other.message}"`, the alternate message
    /// and code are inherited, and the trace is this call site followed by
    /// `other`'s frames.
    #[inline(never)]
    pub fn from_ext(message: impl std::fmt::Display, other: ExtError) -> Self {
        let mut trace = Trace::with_origin(default_resolver().resolve(0));
        trace.append(other.trace);
        Self {
            message: format!("{message}: {}", other.message),
            alt_message: other.alt_message,
            code: other.code,
            trace,
        }
    }

    /// Construct with an explicit creation site.
    ///
    /// This is what [`ext_err!`](crate::ext_err) expands to, and the entry
    /// point for callers that bring their own [`CallSiteResolver`].
    pub fn from_parts(
        message: impl Into<String>,
        alt_message: impl Into<String>,
        code: i64,
        origin: Frame,
    ) -> Self {
        Self {
            message: message.into(),
            alt_message: alt_message.into(),
            code,
            trace: Trace::with_origin(origin),
        }
    }
}

impl ExtError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn alt_message(&self) -> &str {
        &self.alt_message
    }

    /// The classification code; `0` means unclassified.
    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn trace_frames(&self) -> &[Frame] {
        self.trace.frames()
    }
}

impl ExtError {
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    pub fn set_alt_message(&mut self, alt_message: impl Into<String>) -> &mut Self {
        self.alt_message = alt_message.into();
        self
    }

    pub fn set_code(&mut self, code: i64) -> &mut Self {
        self.code = code;
        self
    }

    pub fn with_alt_message(mut self, alt_message: impl Into<String>) -> Self {
        self.alt_message = alt_message.into();
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Rewrite the message as `"{text}: {message}"`.
    pub fn add_message_prefix(mut self, text: impl std::fmt::Display) -> Self {
        self.message = format!("{text}: {}", self.message);
        self
    }

    /// Rewrite the alternate message as `"{text}: {alt_message}"`.
    pub fn add_alt_message_prefix(mut self, text: impl std::fmt::Display) -> Self {
        self.alt_message = format!("{text}: {}", self.alt_message);
        self
    }
}

impl ExtError {
    /// Record the caller's site unless it matches the most recent frame.
    ///
    /// Calling this repeatedly from the same function leaves one entry.
    #[inline(never)]
    pub fn add_trace(self) -> Self {
        self.add_trace_with(default_resolver())
    }

    #[inline(never)]
    pub fn add_trace_with(mut self, resolver: &dyn CallSiteResolver) -> Self {
        self.record(resolver.resolve(0));
        self
    }

    /// Record a pre-captured site, see [`add_trace!`](crate::add_trace).
    pub fn add_trace_at(mut self, frame: Frame) -> Self {
        self.record(frame);
        self
    }

    /// In-place form of [`add_trace_at`](Self::add_trace_at).
    ///
    /// Returns `true` when the frame was appended.
    pub fn record(&mut self, frame: Frame) -> bool {
        #[cfg(feature = "tracing")]
        let site = frame.to_string();
        let recorded = self.trace.push(frame);
        #[cfg(feature = "tracing")]
        if !recorded {
            tracing::trace!(%site, "same site as latest frame; trace unchanged");
        }
        recorded
    }

    /// Fold `other` into this error.
    ///
    /// Messages and alternate messages are joined with `": "` even when a
    /// side is empty. This error's code is kept. `other`'s frames follow this
    /// error's frames unchanged, with no dedup at the join.
    pub fn wrap(mut self, other: ExtError) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            base = %self.message,
            wrapped = %other.message,
            frames = other.trace.len(),
            "wrapping error"
        );
        self.message = format!("{}: {}", self.message, other.message);
        self.alt_message = format!("{}: {}", self.alt_message, other.alt_message);
        self.trace.append(other.trace);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(function: &str, line: u32) -> Frame {
        Frame::new("app", "lib.rs", function, line)
    }

    fn at(message: &str, alt: &str, code: i64, function: &str) -> ExtError {
        ExtError::from_parts(message, alt, code, site(function, 1))
    }

    #[test]
    fn constructors_keep_fields() {
        let plain = ExtError::new("Error");
        assert_eq!(plain.message(), "Error");
        assert_eq!(plain.alt_message(), "");
        assert_eq!(plain.code(), 0);
        assert_eq!(plain.trace_frames().len(), 1);

        let alt = ExtError::with_alt("Error", "AltError");
        assert_eq!(alt.message(), "Error");
        assert_eq!(alt.alt_message(), "AltError");

        for code in [0, 1, -100, i64::MAX] {
            assert_eq!(ExtError::with_type("Error", "AltError", code).code(), code);
        }
    }

    #[test]
    fn empty_messages_round_trip() {
        assert_eq!(ExtError::new("").message(), "");
        assert_eq!(ExtError::with_alt("Error", "").alt_message(), "");
    }

    #[test]
    fn from_error_joins_description() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ExtError::from_error("open config", &io);
        assert_eq!(err.message(), "open config: no such file");
        assert_eq!(err.trace_frames().len(), 1);

        let lifted = ExtError::lift(&io);
        assert_eq!(lifted.message(), "no such file");
    }

    #[test]
    fn lift_keeps_extended_errors_intact() {
        let original =
            at("sql no rows", "user not found", 1, "query").add_trace_at(site("load", 4));
        let boxed: Box<dyn std::error::Error> = Box::new(original.clone());

        let lifted = ExtError::lift(boxed.as_ref());
        assert_eq!(lifted, original);
        assert_eq!(lifted.alt_message(), "user not found");
        assert_eq!(lifted.code(), 1);
        assert_eq!(lifted.trace_frames().len(), 2);
    }

    #[test]
    fn from_ext_inherits_alt_and_code() {
        let inner = at("Error2", "alt", 7, "inner");
        let outer = ExtError::from_ext("Error1", inner);
        assert_eq!(outer.message(), "Error1: Error2");
        assert_eq!(outer.alt_message(), "alt");
        assert_eq!(outer.code(), 7);
        assert_eq!(outer.trace_frames().len(), 2);
        assert_eq!(outer.trace_frames()[1], site("inner", 1));
    }

    #[test]
    fn setters_overwrite() {
        let mut err = at("a", "b", 1, "f");
        err.set_message("x").set_alt_message("y").set_code(-3);
        assert_eq!((err.message(), err.alt_message(), err.code()), ("x", "y", -3));

        let built = at("a", "", 0, "f").with_alt_message("shown").with_code(42);
        assert_eq!(built.alt_message(), "shown");
        assert_eq!(built.code(), 42);
    }

    #[test]
    fn prefixes_prepend() {
        let err = at("disk full", "try later", 0, "f")
            .add_message_prefix("save")
            .add_message_prefix("request")
            .add_alt_message_prefix("upload");
        assert_eq!(err.message(), "request: save: disk full");
        assert_eq!(err.alt_message(), "upload: try later");
    }

    #[test]
    fn prefixes_leave_trace_and_code_alone() {
        let err = at("m", "a", 9, "f");
        let before = err.trace().clone();
        let err = err.add_message_prefix("p").add_alt_message_prefix("q");
        assert_eq!(err.trace(), &before);
        assert_eq!(err.code(), 9);
    }

    #[test]
    fn add_trace_at_dedups_against_latest() {
        let err = at("m", "", 0, "load")
            .add_trace_at(site("load", 5))
            .add_trace_at(site("handle", 9))
            .add_trace_at(site("handle", 12));
        let functions: Vec<_> = err.trace_frames().iter().map(|f| f.function.as_str()).collect();
        assert_eq!(functions, ["load", "handle"]);
    }

    #[test]
    fn add_trace_with_uses_injected_resolver() {
        let err = at("m", "", 0, "load").add_trace_with(&site("serve", 3));
        assert_eq!(err.trace().latest(), Some(&site("serve", 3)));
    }

    #[test]
    fn wrap_concatenates_messages() {
        for (a, b, expected) in [
            ("Error1", "Error2", "Error1: Error2"),
            ("", "", ": "),
            ("Error", "", "Error: "),
            ("", "Error", ": Error"),
        ] {
            let wrapped = at(a, "", 0, "f").wrap(at(b, "", 0, "g"));
            assert_eq!(wrapped.message(), expected);
        }
    }

    #[test]
    fn wrap_concatenates_alt_messages_even_when_empty() {
        let wrapped = at("m", "AltMsg1", 0, "f").wrap(at("m", "", 0, "g"));
        assert_eq!(wrapped.alt_message(), "AltMsg1: ");
        let both_empty = at("m", "", 0, "f").wrap(at("m", "", 0, "g"));
        assert_eq!(both_empty.alt_message(), ": ");
    }

    #[test]
    fn wrap_keeps_base_code() {
        let wrapped = at("a", "", 1, "f").wrap(at("b", "", 2, "g"));
        assert_eq!(wrapped.code(), 1);

        let mut overwritten = wrapped;
        overwritten.set_code(2);
        assert_eq!(overwritten.code(), 2);
    }

    #[test]
    fn wrap_appends_frames_without_dedup() {
        let base = at("a", "", 0, "same").add_trace_at(site("outer", 2));
        let other = at("b", "", 0, "outer").add_trace_at(site("top", 3));
        let base_frames = base.trace_frames().to_vec();
        let other_frames = other.trace_frames().to_vec();

        let wrapped = base.wrap(other);
        let frames = wrapped.trace_frames();
        assert_eq!(frames.len(), base_frames.len() + other_frames.len());
        assert_eq!(&frames[..base_frames.len()], base_frames.as_slice());
        assert_eq!(&frames[base_frames.len()..], other_frames.as_slice());
        // "outer" appears twice in a row across the join
        assert!(frames[1].same_site(&frames[2]));
    }

    #[test]
    fn display_is_primary_message() {
        let err = at("sql no rows", "user not found", 1, "f");
        assert_eq!(err.to_string(), "sql no rows");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
