use std::fmt;

use serde::Serialize;

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The value's type does not match what the rule expects.
    ShapeMismatch,
    /// A length or numeric value is outside a configured inclusive bound.
    Bound,
    /// A string does not match a pattern, or the pattern is malformed.
    Pattern,
    /// A required field is absent.
    Presence,
    /// The document being validated is not an object.
    RootShape,
    /// Every alternative of a disjunction failed.
    Aggregate,
    /// The document nests deeper than the configured depth budget.
    DepthExceeded,
    /// Failure produced by a caller-supplied predicate.
    Custom,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::ShapeMismatch => "shape_mismatch",
            ViolationKind::Bound => "bound",
            ViolationKind::Pattern => "pattern",
            ViolationKind::Presence => "presence",
            ViolationKind::RootShape => "root_shape",
            ViolationKind::Aggregate => "aggregate",
            ViolationKind::DepthExceeded => "depth_exceeded",
            ViolationKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a rule against a document value.
///
/// `kind`, `message`, `path` and `causes` only carry meaning when the outcome
/// is a failure. Paths are built innermost-first while a failure unwinds
/// through containers, see [`Outcome::with_prefix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ViolationKind>,
    message: String,
    path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<Outcome>,
}

impl Outcome {
    /// A successful outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            kind: None,
            message: String::new(),
            path: String::new(),
            causes: Vec::new(),
        }
    }

    /// A failure raised by a caller-supplied check.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::violation(ViolationKind::Custom, message)
    }

    /// A failure of the given kind with an empty path.
    pub fn violation(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: Some(kind),
            message: message.into(),
            path: String::new(),
            causes: Vec::new(),
        }
    }

    /// Replace the path of a failure. Successes are returned unchanged.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        if !self.success {
            self.path = path.into();
        }
        self
    }

    pub(crate) fn with_causes(mut self, causes: Vec<Outcome>) -> Self {
        if !self.success {
            self.causes = causes;
        }
        self
    }

    /// Prepend `prefix` to the path of a failure.
    ///
    /// Segments are joined with `.`; the separator is dropped when either
    /// side is empty or when the existing path starts with an index segment,
    /// so `"items"` + `"[1].name"` becomes `"items[1].name"`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        if self.success {
            return self;
        }
        let path = join_path(prefix, &self.path);
        Self { path, ..self }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn kind(&self) -> Option<ViolationKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Failures of the individual alternatives behind an aggregate failure.
    pub fn causes(&self) -> &[Outcome] {
        &self.causes
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            f.write_str("ok")
        } else if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Path segment for an array element.
pub fn index_segment(index: usize) -> String {
    format!("[{index}]")
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    if path.starts_with('[') {
        return format!("{prefix}{path}");
    }
    format!("{prefix}.{path}")
}
