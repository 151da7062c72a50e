//! Line/column source ranges.

use serde::{Deserialize, Serialize};

/// A range in a source file, expressed in 0-based line/column
/// coordinates, half-open at the end position.
///
/// Intersection follows the editor convention: ranges that merely touch
/// (one ends where the other starts) still intersect with an empty
/// overlap. Containment is inclusive on both endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    /// Starting line (0-based)
    pub start_line: u32,
    /// Starting column (0-based)
    pub start_col: u32,
    /// Ending line (0-based)
    pub end_line: u32,
    /// Ending column (0-based, exclusive)
    pub end_col: u32,
}

impl SourceRange {
    /// Create a new range.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create an empty range at a single position.
    pub fn at(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Start position as an ordered (line, column) pair.
    pub fn start(&self) -> (u32, u32) {
        (self.start_line, self.start_col)
    }

    /// End position as an ordered (line, column) pair.
    pub fn end(&self) -> (u32, u32) {
        (self.end_line, self.end_col)
    }

    /// Whether the range covers no text.
    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// Whether the ranges overlap or touch.
    pub fn intersects(&self, other: &SourceRange) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }

    /// Whether `other` lies fully inside this range (inclusive).
    pub fn contains(&self, other: &SourceRange) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Whether `other` lies inside this range and is strictly smaller.
    pub fn strictly_contains(&self, other: &SourceRange) -> bool {
        self.contains(other) && *self != *other
    }
}
