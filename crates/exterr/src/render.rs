//! Output forms of a trace and the front-facing payload of an error.
//!
//! All renderings are pure and never fail: if JSON encoding errors, the empty
//! representation of that form is returned instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ExtError, Frame, Trace, TraceError};

const SEPARATOR: &str = "/";

/// Alternate message shown to untrusted callers when none was set.
pub const DEFAULT_FRONT_MESSAGE: &str = "internal error";
/// Code shown to untrusted callers when the error is unclassified.
pub const DEFAULT_FRONT_CODE: i64 = 500;

/// One frame of the nested rendering, linking to the next observation.
///
/// Dropping a chain releases it node by node, so arbitrarily long chains are
/// safe to build and discard. Serializing one directly through serde recurses
/// per node; [`Trace::to_nested_json`] does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedFrame {
    pub package: String,
    pub file: String,
    pub function: String,
    pub line: u32,
    #[serde(default)]
    pub child: Option<Box<NestedFrame>>,
}

impl Drop for NestedFrame {
    fn drop(&mut self) {
        let mut next = self.child.take();
        while let Some(mut node) = next {
            next = node.child.take();
        }
    }
}

impl Trace {
    /// `package:file:function:line` per frame, joined by `/`.
    pub fn raw(&self) -> String {
        self.iter()
            .map(Frame::to_string)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Like [`raw`](Self::raw) with every field labelled:
    /// `{pkg}app:{file}main.rs:{function}run:{line}12`.
    pub fn tagged(&self) -> String {
        self.iter()
            .map(|f| {
                format!(
                    "{{pkg}}{}:{{file}}{}:{{function}}{}:{{line}}{}",
                    f.package, f.file, f.function, f.line
                )
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// JSON array of `{package, file, function, line}` objects in trace order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// The frames as a linked chain rooted at the creation site.
    pub fn to_nested(&self) -> Option<NestedFrame> {
        let mut node: Option<Box<NestedFrame>> = None;
        for frame in self.iter().rev() {
            node = Some(Box::new(NestedFrame {
                package: frame.package.clone(),
                file: frame.file.clone(),
                function: frame.function.clone(),
                line: frame.line,
                child: node,
            }));
        }
        node.map(|mut root| NestedFrame {
            package: std::mem::take(&mut root.package),
            file: std::mem::take(&mut root.file),
            function: std::mem::take(&mut root.function),
            line: root.line,
            child: root.child.take(),
        })
    }

    /// Nested JSON chain rooted at the creation site; the last frame has
    /// `"child":null`, an empty trace renders as `null`.
    ///
    /// Written frame by frame, so trace length is bounded by memory only.
    pub fn to_nested_json(&self) -> String {
        let mut out = String::new();
        for frame in self.iter() {
            let Ok(fields) = serde_json::to_string(frame) else {
                return "null".to_string();
            };
            out.push_str(fields.strip_suffix('}').unwrap_or(&fields));
            out.push_str(",\"child\":");
        }
        out.push_str("null");
        out.extend(std::iter::repeat_n('}', self.len()));
        out
    }

    pub fn from_json(json: &str) -> Result<Trace, TraceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode the nested form. Parsing grows the stack on demand and the
    /// chain is then unlinked in a loop, so deep chains decode like flat ones.
    pub fn from_nested_json(json: &str) -> Result<Trace, TraceError> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let root = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        let mut chain = ValueChain(root);
        de.end()?;

        let mut frames: Vec<Frame> = Vec::new();
        loop {
            match chain.0.take() {
                Value::Null => break,
                Value::Object(mut fields) => {
                    chain.0 = fields.remove("child").unwrap_or(Value::Null);
                    frames.push(serde_json::from_value(Value::Object(fields))?);
                }
                other => return Err(TraceError::NestedShape(json_kind(&other))),
            }
        }
        Ok(Trace::from(frames))
    }
}

/// Owns a decoded nested chain and releases it one `child` at a time.
struct ValueChain(Value);

impl Drop for ValueChain {
    fn drop(&mut self) {
        let mut node = self.0.take();
        while let Value::Object(mut fields) = node {
            node = fields.remove("child").unwrap_or(Value::Null);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<Option<NestedFrame>> for Trace {
    fn from(root: Option<NestedFrame>) -> Self {
        let mut frames = Vec::new();
        let mut node = root.map(Box::new);
        while let Some(mut current) = node {
            node = current.child.take();
            frames.push(Frame {
                package: std::mem::take(&mut current.package),
                file: std::mem::take(&mut current.file),
                function: std::mem::take(&mut current.function),
                line: current.line,
            });
        }
        Trace::from(frames)
    }
}

/// What an untrusted caller gets to see: the alternate message and code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontPayload {
    pub error: String,
    pub code: i64,
}

impl FrontPayload {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Fallbacks used by [`ExtError::front_payload_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontDefaults {
    pub message: String,
    pub code: i64,
}

impl Default for FrontDefaults {
    fn default() -> Self {
        Self {
            message: DEFAULT_FRONT_MESSAGE.to_string(),
            code: DEFAULT_FRONT_CODE,
        }
    }
}

impl ExtError {
    pub fn trace_raw(&self) -> String {
        self.trace().raw()
    }

    pub fn trace_tagged(&self) -> String {
        self.trace().tagged()
    }

    pub fn trace_json(&self) -> String {
        self.trace().to_json()
    }

    pub fn trace_nested_json(&self) -> String {
        self.trace().to_nested_json()
    }

    /// Alternate message and code with the default fallbacks. The primary
    /// message and the trace are never included.
    pub fn front_payload(&self) -> FrontPayload {
        self.front_payload_with(&FrontDefaults::default())
    }

    pub fn front_payload_with(&self, defaults: &FrontDefaults) -> FrontPayload {
        let error = match self.alt_message() {
            "" => defaults.message.clone(),
            alt => alt.to_string(),
        };
        let code = match self.code() {
            0 => defaults.code,
            code => code,
        };
        FrontPayload { error, code }
    }

    pub fn front_json(&self) -> String {
        self.front_payload().to_json()
    }

    /// `(code, payload)` for a response encoder; the code matches the payload's.
    pub fn response(&self) -> (i64, FrontPayload) {
        let payload = self.front_payload();
        (payload.code, payload)
    }
}
