//! A single call-site observation and the symbol normalisation that produces it.
//!
//! Frames are built either at compile time by [`here!`](crate::here) or at run
//! time by a [`CallSiteResolver`](crate::CallSiteResolver). Both paths funnel
//! through [`Frame::from_qualified`] so that the same function yields the same
//! `package`/`function` pair regardless of how it was observed.

use serde::{Deserialize, Serialize};

/// One recorded call site: `package`, base `file` name, `function` and `line`.
///
/// Equality (`==`) compares every field. Trace deduplication uses the looser
/// [`Frame::same_site`], which ignores `file` and `line`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub package: String,
    pub file: String,
    pub function: String,
    pub line: u32,
}

impl Frame {
    pub fn new(
        package: impl Into<String>,
        file: impl Into<String>,
        function: impl Into<String>,
        line: u32,
    ) -> Self {
        let file: String = file.into();
        Self {
            package: package.into(),
            file: base_name(&file).to_string(),
            function: function.into(),
            line,
        }
    }

    /// Build a frame from a fully qualified function path such as
    /// `app::db::Repo::find::{{closure}}` plus the source location.
    ///
    /// The path is split into the module path (`package`, here `app::db`) and
    /// the item path inside it (`function`, here `Repo::find::{{closure}}`).
    /// Symbol hashes, generic argument lists and `<impl ..>` / `<T as Trait>`
    /// qualifiers are removed first. Directory components of `file` are
    /// discarded.
    pub fn from_qualified(qualified: &str, file: &str, line: u32) -> Self {
        let (package, function) = split_qualified(qualified);
        Self {
            package,
            file: base_name(file).to_string(),
            function,
            line,
        }
    }

    /// Dedup-equivalence: same `package` and `function`, any file or line.
    pub fn same_site(&self, other: &Frame) -> bool {
        self.package == other.package && self.function == other.function
    }

    /// True for the zero frame substituted when no call site could be resolved.
    pub fn is_unresolved(&self) -> bool {
        self.package.is_empty()
            && self.file.is_empty()
            && self.function.is_empty()
            && self.line == 0
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}:{}", self.package, self.file, self.function, self.line)
    }
}

pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn split_qualified(qualified: &str) -> (String, String) {
    let normalized = normalize_symbol(qualified);
    let segments: Vec<&str> = normalized.split("::").filter(|s| !s.is_empty()).collect();

    let Some(last_named) = segments.iter().rposition(|s| !is_closure_marker(s)) else {
        return (String::new(), segments.join("::"));
    };
    let split = segments[..last_named]
        .iter()
        .position(|s| starts_uppercase(s) || is_closure_marker(s))
        .unwrap_or(last_named);

    (segments[..split].join("::"), segments[split..].join("::"))
}

fn is_closure_marker(segment: &str) -> bool {
    segment.starts_with('{')
}

fn starts_uppercase(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

/// Strip everything from a symbol that is not a plain `a::b::c` path.
fn normalize_symbol(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.rsplit('/').next().unwrap_or(raw);
    let raw = strip_hash(raw);

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let Some(close) = matching_angle(&rest[open..]) else {
            // unbalanced, keep what we have
            rest = "";
            break;
        };
        let group = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let self_qualifier =
            out.is_empty() || group.starts_with("impl ") || group.contains(" as ");
        if self_qualifier {
            let ty = qualified_self_type(group);
            if out.is_empty() {
                out.push_str(&ty);
            } else {
                out.push_str(ty.rsplit("::").next().unwrap_or(&ty));
            }
        } else if out.ends_with("::") {
            // turbofish on a path segment
            out.truncate(out.len() - 2);
        }
    }
    out.push_str(rest);

    while out.ends_with("::") {
        out.truncate(out.len() - 2);
    }
    out
}

/// `impl Trait for Ty` / `impl Ty` / `Ty as Trait` -> `Ty` without generics.
fn qualified_self_type(group: &str) -> String {
    let ty = match group.strip_prefix("impl ") {
        Some(imp) => imp.rsplit(" for ").next().unwrap_or(imp),
        None => group.split(" as ").next().unwrap_or(group),
    };
    let ty = ty.trim_start_matches('&').trim_start_matches("dyn ").trim();
    strip_generics(ty)
}

fn strip_generics(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim_end_matches("::").to_string()
}

/// Index of the `>` closing the `<` at position 0.
fn matching_angle(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Legacy mangling appends `::h` followed by 16 hex digits.
fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head
        }
        _ => symbol,
    }
}
