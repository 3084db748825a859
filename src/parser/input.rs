//! Low-level input handling for the markup scanner.
//!
//! [`MarkupInput`] wraps the source text and offers the primitives the scan
//! loop is built from: byte and substring search (via `memchr`), slicing,
//! line-number lookup, and the error/diagnostic constructors that stamp a
//! source location onto what they report.
//!
//! Every delimiter searched for is ASCII, so every offset returned by a
//! search is a valid `char` boundary and slicing between two of them cannot
//! split a code point.

use memchr::memmem;

use crate::error::{ErrorSeverity, ParseDiagnostic, ParseError, SourceLocation};

pub(crate) struct MarkupInput<'a> {
    text: &'a str,
    /// Diagnostics collected so far.
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl<'a> MarkupInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            diagnostics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    /// Offset of the next `byte` at or after `from`.
    pub fn find_byte(&self, byte: u8, from: usize) -> Option<usize> {
        let haystack = self.bytes().get(from..)?;
        memchr::memchr(byte, haystack).map(|i| from + i)
    }

    /// Offset of the next occurrence of `needle` at or after `from`.
    pub fn find_str(&self, needle: &str, from: usize) -> Option<usize> {
        let haystack = self.bytes().get(from..)?;
        memmem::find(haystack, needle.as_bytes()).map(|i| from + i)
    }

    /// Returns `true` if the input continues with `prefix` at `pos`.
    pub fn starts_with_at(&self, pos: usize, prefix: &str) -> bool {
        self.bytes()
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(prefix.as_bytes()))
    }

    /// The text between two offsets. Out-of-range bounds are clamped.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.text.get(start..end).unwrap_or("")
    }

    /// 1-based line of `offset`: the number of `\n` before it, plus one.
    pub fn line_at(&self, offset: usize) -> u32 {
        let end = offset.min(self.text.len());
        let newlines = memchr::memchr_iter(b'\n', &self.bytes()[..end]).count();
        u32::try_from(newlines).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        SourceLocation {
            line: self.line_at(offset),
            byte_offset: offset,
        }
    }

    /// Creates a fatal error at `offset`, carrying the diagnostics so far.
    pub fn fatal(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError {
            message: message.into(),
            location: Some(self.location(offset)),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Records a recovered condition at `offset`.
    pub fn push_diagnostic(
        &mut self,
        severity: ErrorSeverity,
        message: impl Into<String>,
        offset: usize,
    ) {
        let location = self.location(offset);
        let message = message.into();
        tracing::debug!(line = location.line, %severity, "{message}");
        self.diagnostics.push(ParseDiagnostic {
            severity,
            message,
            location,
        });
    }
}
