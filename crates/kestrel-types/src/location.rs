//! Source locations attached to references and diagnostics.
//!
//! The type core never reads source text itself; front ends hand it a
//! [`Location`] whenever a name is referenced so unresolved names can be
//! reported at every use site.
//!
//! # Examples
//!
//! ```
//! use kestrel_types::location::{Location, Position, Span};
//!
//! let span = Span::new(Position::new(10, 2, 5), Position::new(13, 2, 8));
//! let location = Location::new("main.kes", span);
//!
//! assert_eq!(location.to_string(), "main.kes:2:5");
//! assert_eq!(span.len(), 3);
//! ```

use std::fmt;

/// A point in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    /// Byte offset from the start of the file (0-indexed)
    pub byte_offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in bytes)
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(byte_offset: usize, line: usize, column: usize) -> Self {
        Self {
            byte_offset,
            line,
            column,
        }
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a span covering both `left` and `right`.
    #[must_use]
    pub const fn merge(left: Span, right: Span) -> Self {
        Self {
            start: left.start,
            end: right.end,
        }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.byte_offset.saturating_sub(self.start.byte_offset)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A span inside a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub span: Span,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span,
        }
    }

    /// Creates a zero-width location at `line:column`.
    ///
    /// ```
    /// use kestrel_types::location::Location;
    ///
    /// let loc = Location::at("lib.kes", 4, 12);
    /// assert_eq!(loc.span.start.line, 4);
    /// assert!(loc.span.is_empty());
    /// ```
    #[must_use]
    pub fn at(file: impl Into<String>, line: usize, column: usize) -> Self {
        let position = Position::new(0, line, column);
        Self::new(file, Span::new(position, position))
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.start.line
    }

    #[must_use]
    pub const fn column(&self) -> usize {
        self.span.start.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let left = Span::new(Position::new(0, 1, 1), Position::new(4, 1, 5));
        let right = Span::new(Position::new(10, 2, 1), Position::new(15, 2, 6));
        let merged = Span::merge(left, right);

        assert_eq!(merged.start.byte_offset, 0);
        assert_eq!(merged.end.byte_offset, 15);
        assert_eq!(merged.len(), 15);
    }

    #[test]
    fn test_inverted_span_has_zero_len() {
        let span = Span::new(Position::new(8, 1, 9), Position::new(2, 1, 3));
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn test_location_display() {
        let loc = Location::at("std/int.kes", 12, 3);
        assert_eq!(loc.to_string(), "std/int.kes:12:3");
        assert_eq!(loc.line(), 12);
        assert_eq!(loc.column(), 3);
    }
}
