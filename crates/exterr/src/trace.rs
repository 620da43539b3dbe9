use serde::{Deserialize, Serialize};

use crate::Frame;

/// Ordered call-site frames, creation site first.
///
/// `trace[0]` is where the error was built; the last frame is the most recent
/// observation. Frames are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace(Vec<Frame>);

impl Trace {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_origin(origin: Frame) -> Self {
        Self(vec![origin])
    }

    /// Append `frame` unless it is dedup-equivalent to the last frame.
    ///
    /// Returns `true` when the frame was recorded.
    pub fn push(&mut self, frame: Frame) -> bool {
        if self.0.last().is_some_and(|last| last.same_site(&frame)) {
            return false;
        }
        self.0.push(frame);
        true
    }

    /// Append every frame of `other` in order. No dedup across the boundary.
    pub fn append(&mut self, other: Trace) {
        self.0.extend(other.0);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The creation site.
    pub fn origin(&self) -> Option<&Frame> {
        self.0.first()
    }

    /// The most recently observed site.
    pub fn latest(&self) -> Option<&Frame> {
        self.0.last()
    }

    pub fn into_vec(self) -> Vec<Frame> {
        self.0
    }
}

impl From<Vec<Frame>> for Trace {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames)
    }
}

impl FromIterator<Frame> for Trace {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Trace {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(function: &str, line: u32) -> Frame {
        Frame::new("app", "lib.rs", function, line)
    }

    #[test]
    fn push_suppresses_consecutive_same_site() {
        let mut trace = Trace::with_origin(frame("load", 10));
        assert!(!trace.push(frame("load", 14)));
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.frames()[0].line, 10);
    }

    #[test]
    fn push_only_checks_last_frame() {
        let mut trace = Trace::with_origin(frame("load", 10));
        assert!(trace.push(frame("handle", 20)));
        assert!(trace.push(frame("load", 30)));
        let functions: Vec<_> = trace.iter().map(|f| f.function.as_str()).collect();
        assert_eq!(functions, ["load", "handle", "load"]);
    }

    #[test]
    fn push_onto_empty_trace_records() {
        let mut trace = Trace::new();
        assert!(trace.push(frame("load", 1)));
        assert_eq!(trace.origin(), trace.latest());
    }

    #[test]
    fn append_keeps_order_without_dedup() {
        let mut base = Trace::from(vec![frame("a", 1), frame("b", 2)]);
        let other = Trace::from(vec![frame("b", 3), frame("c", 4)]);
        base.append(other);
        let lines: Vec<_> = base.iter().map(|f| f.line).collect();
        assert_eq!(lines, [1, 2, 3, 4]);
    }

    #[test]
    fn different_package_same_function_is_distinct() {
        let mut trace = Trace::with_origin(Frame::new("app::db", "db.rs", "load", 1));
        assert!(trace.push(Frame::new("app::api", "api.rs", "load", 1)));
        assert_eq!(trace.len(), 2);
    }
}
