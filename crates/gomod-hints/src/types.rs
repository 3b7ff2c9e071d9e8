//! Syntax types for go.mod files.

/// One directive line of a go.mod file.
///
/// `start` and `end` are byte offsets into the document. `end` is the end of
/// the last token: trailing whitespace and comments are not part of the line.
/// Tokens are stored raw, so quoted strings keep their quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub start: usize,
    pub end: usize,
    pub tokens: Vec<String>,
    /// 1-based line number in the document
    pub line_number: usize,
    /// Text of a trailing `//` comment, without the slashes
    pub comment: Option<String>,
}

impl Line {
    /// The trailing token, which holds the version for require, exclude,
    /// and versioned replace lines.
    pub fn last_token(&self) -> &str {
        self.tokens.last().map_or("", String::as_str)
    }

    /// Byte span of the trailing token.
    pub fn last_token_span(&self) -> (usize, usize) {
        (self.end - self.last_token().len(), self.end)
    }
}

/// A module path with an optional version (empty when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// `module` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDirective {
    pub path: String,
    pub syntax: Line,
}

/// `require` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: ModuleVersion,
    /// Marked with a `// indirect` comment
    pub indirect: bool,
    pub syntax: Line,
}

/// `replace` directive.
///
/// `old.version` is empty when the replacement applies to every version.
/// `new.version` is empty when `new.path` is a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
    pub syntax: Line,
}

/// `exclude` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclude {
    pub module: ModuleVersion,
    pub syntax: Line,
}

/// Parsed go.mod file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    pub module: Option<ModuleDirective>,
    /// Minimum Go version from `go` directive
    pub go: Option<String>,
    pub toolchain: Option<String>,
    pub require: Vec<Require>,
    pub exclude: Vec<Exclude>,
    pub replace: Vec<Replace>,
}
