//! Trace line classification
//!
//! Recognises the line shapes the analysis cares about in an strace-style build log:
//! - Syscall lines: a numeric token (pid or timestamp) followed by a syscall name,
//!   e.g. `12346 openat(AT_FDCWD, "sqlite3.h", O_RDONLY) = 3`
//! - Compiler invocations: an exec event naming a compiler and a quoted `.c` path
//! - Header opens: an open event with a quoted `.h`/`.inc` path
//!
//! Classification is stateless. Whether a header open actually produces a dependency
//! edge depends on the active compile target, which is tracked by
//! [`crate::dependency::ScanState`].

use crate::config::PatternConfig;
use crate::error::Result;
use regex::Regex;
use std::sync::LazyLock;

static SYSCALL_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d+\s+([a-zA-Z0-9_]+)(?:\(|\s|$)").ok());

/// Dependency-relevant shape of a single trace line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Compiler invocation; carries the basename of the compiled source
    CompileInvocation { target: &'a str },
    /// Open of a header/include file; carries its basename
    HeaderOpen { header: &'a str },
    /// Anything else, including malformed or unterminated quoted paths
    NoMatch,
}

/// A raw trace record with whatever could be parsed out of it
///
/// Borrowed from the line buffer and discarded once the line is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine<'a> {
    /// Raw line text (without the trailing newline)
    pub raw: &'a str,
    /// Syscall name if the line has the syscall shape
    pub syscall: Option<&'a str>,
    /// Dependency classification
    pub class: LineClass<'a>,
}

impl<'a> TraceLine<'a> {
    /// Extracted file path (basename) for compile and header lines
    pub fn path(&self) -> Option<&'a str> {
        match self.class {
            LineClass::CompileInvocation { target } => Some(target),
            LineClass::HeaderOpen { header } => Some(header),
            LineClass::NoMatch => None,
        }
    }
}

/// Pattern matcher for trace lines
#[derive(Debug, Clone)]
pub struct Classifier {
    exec_marker: String,
    compilers: Vec<String>,
    open_marker: String,
    source_path: Regex,
    header_path: Regex,
}

impl Classifier {
    /// Build a classifier from pattern configuration
    pub fn new(patterns: &PatternConfig) -> Result<Self> {
        patterns.validate()?;
        Ok(Self {
            exec_marker: patterns.exec_marker.clone(),
            compilers: patterns.compilers.clone(),
            open_marker: patterns.open_marker.clone(),
            source_path: quoted_path_regex(&patterns.source_suffixes)?,
            header_path: quoted_path_regex(&patterns.header_suffixes)?,
        })
    }

    /// Parse one raw line into a [`TraceLine`]
    pub fn inspect<'a>(&self, raw: &'a str) -> TraceLine<'a> {
        TraceLine {
            raw,
            syscall: syscall_name(raw),
            class: self.classify(raw),
        }
    }

    /// Classify one raw line for dependency purposes
    ///
    /// A line carrying the exec marker and a compiler name is only ever a compile
    /// candidate: without a quoted source path it is `NoMatch`, never a header open.
    pub fn classify<'a>(&self, raw: &'a str) -> LineClass<'a> {
        if self.is_compiler_exec(raw) {
            return match first_capture(&self.source_path, raw) {
                Some(path) => LineClass::CompileInvocation {
                    target: basename(path),
                },
                None => LineClass::NoMatch,
            };
        }

        if raw.contains(self.open_marker.as_str()) {
            if let Some(path) = first_capture(&self.header_path, raw) {
                return LineClass::HeaderOpen {
                    header: basename(path),
                };
            }
        }

        LineClass::NoMatch
    }

    fn is_compiler_exec(&self, raw: &str) -> bool {
        raw.contains(self.exec_marker.as_str())
            && self.compilers.iter().any(|c| raw.contains(c.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        // Default suffixes are escaped literals, so the patterns always compile.
        Self::new(&PatternConfig::default()).expect("default trace patterns are valid")
    }
}

/// Extract the syscall name from a line shaped `<number> <name>(...`
///
/// The name must be followed by `(`, whitespace or end of line.
pub fn syscall_name(raw: &str) -> Option<&str> {
    let re = SYSCALL_LINE.as_ref()?;
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Path component after the last `/`
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn quoted_path_regex(suffixes: &[String]) -> Result<Regex> {
    let alternation = suffixes
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r#""([^"]+(?:{}))""#, alternation))?)
}

fn first_capture<'a>(re: &Regex, raw: &'a str) -> Option<&'a str> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
