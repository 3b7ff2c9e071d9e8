//! Byte offset to LSP position mapping.
//!
//! LSP positions count characters in UTF-16 code units, while the go.mod
//! parser records byte offsets into the document text. [`PositionMapper`]
//! translates between the two for a single document snapshot.

use crate::error::{CoreError, Result};
use std::sync::Arc;
use tower_lsp_server::ls_types::{Position, Range};

/// Pre-computed line start byte offsets for O(log n) position lookups.
///
/// # Examples
///
/// ```
/// use gomod_core::PositionMapper;
/// use tower_lsp_server::ls_types::Position;
///
/// let mapper = PositionMapper::new("module example.com/app\n\ngo 1.21\n");
/// assert_eq!(mapper.offset_position(24).unwrap(), Position::new(2, 0));
/// assert_eq!(mapper.position_offset(Position::new(2, 3)).unwrap(), 27);
/// ```
#[derive(Debug, Clone)]
pub struct PositionMapper {
    content: Arc<str>,
    line_starts: Vec<usize>,
}

impl PositionMapper {
    pub fn new(content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let mut line_starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            content,
            line_starts,
        }
    }

    /// Document text this mapper is bound to.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to an LSP position (line, UTF-16 character).
    pub fn offset_position(&self, offset: usize) -> Result<Position> {
        if offset > self.content.len() {
            return Err(CoreError::OffsetOutOfRange {
                offset,
                len: self.content.len(),
            });
        }
        if !self.content.is_char_boundary(offset) {
            return Err(CoreError::NotCharBoundary { offset });
        }

        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];

        let character = self.content[line_start..offset]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();

        Ok(Position::new(line as u32, character))
    }

    /// Converts a half-open byte span to an LSP range.
    pub fn offset_range(&self, start: usize, end: usize) -> Result<Range> {
        if start > end {
            return Err(CoreError::InvertedRange { start, end });
        }
        Ok(Range::new(
            self.offset_position(start)?,
            self.offset_position(end)?,
        ))
    }

    /// Converts an LSP position back to a byte offset.
    ///
    /// A character index equal to the line length addresses the end of the
    /// line. Anything past it, or inside a surrogate pair, is rejected.
    pub fn position_offset(&self, position: Position) -> Result<usize> {
        let out_of_range = || CoreError::PositionOutOfRange {
            line: position.line,
            character: position.character,
        };

        let line = position.line as usize;
        let line_start = *self.line_starts.get(line).ok_or_else(out_of_range)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .map_or(self.content.len(), |next| next - 1);

        let mut units = 0u32;
        for (i, c) in self.content[line_start..line_end].char_indices() {
            if units == position.character {
                return Ok(line_start + i);
            }
            units += c.len_utf16() as u32;
            if units > position.character {
                return Err(out_of_range());
            }
        }

        if units == position.character {
            Ok(line_end)
        } else {
            Err(out_of_range())
        }
    }
}
