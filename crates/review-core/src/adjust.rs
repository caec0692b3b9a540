//! Mapping offsets and ranges through a single edit.

use crate::delta::TextEdit;
use crate::range::TextRange;

/// The length-only shape of an edit: `delete_count` characters removed at `offset`, then
/// `insert_len` characters inserted there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpan {
    /// Start character offset of the edit.
    pub offset: usize,
    /// Number of deleted characters.
    pub delete_count: usize,
    /// Number of inserted characters.
    pub insert_len: usize,
}

impl EditSpan {
    /// Create a new edit span.
    pub fn new(offset: usize, delete_count: usize, insert_len: usize) -> Self {
        Self {
            offset,
            delete_count,
            insert_len,
        }
    }

    /// Exclusive end of the deleted span in the pre-edit document.
    pub fn deleted_end(&self) -> usize {
        self.offset + self.delete_count
    }

    /// Net change in document length.
    pub fn delta(&self) -> isize {
        self.insert_len as isize - self.delete_count as isize
    }
}

impl From<&TextEdit> for EditSpan {
    fn from(edit: &TextEdit) -> Self {
        Self::new(edit.offset, edit.delete_count, edit.inserted_len())
    }
}

/// Map a single offset through `edit`.
///
/// Offsets at or before the edit are unchanged, offsets inside the deleted span collapse to the
/// edit offset, and offsets after it shift by the edit's delta.
pub fn adjust_offset(pos: usize, edit: EditSpan) -> usize {
    if pos <= edit.offset {
        pos
    } else if pos <= edit.deleted_end() {
        edit.offset
    } else {
        pos.saturating_add_signed(edit.delta())
    }
}

/// Map a range through `edit`.
///
/// Returns `None` when the edit consumes the whole range. A range that partially overlaps the
/// deleted span keeps only the part that survives outside of it.
pub fn adjust_range(range: TextRange, edit: EditSpan) -> Option<TextRange> {
    let offset = edit.offset;
    let del_end = edit.deleted_end();
    let delta = edit.delta();

    if edit.delete_count == 0 {
        return Some(if range.end() <= offset {
            range
        } else if range.start() >= offset {
            range.shifted(delta)
        } else {
            // Insertion strictly inside the range grows it.
            TextRange::new(range.start(), range.end() + edit.insert_len)
        });
    }

    if range.end() <= offset {
        return Some(range);
    }
    if range.start() >= del_end {
        return Some(range.shifted(delta));
    }
    if range.start() >= offset && range.end() <= del_end {
        return None;
    }

    if range.start() < offset {
        if range.end() > del_end {
            // The edit lies fully inside the range: only the tail moves.
            Some(TextRange::new(
                range.start(),
                range.end().saturating_add_signed(delta),
            ))
        } else {
            Some(TextRange::new(range.start(), offset))
        }
    } else {
        // Starts inside the deleted span, ends after it: keep the surviving tail, which now
        // begins right after the inserted text.
        Some(TextRange::new(
            offset + edit.insert_len,
            range.end().saturating_add_signed(delta),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_offset() {
        let edit = EditSpan::new(10, 5, 3);
        assert_eq!(adjust_offset(4, edit), 4);
        assert_eq!(adjust_offset(10, edit), 10);
        assert_eq!(adjust_offset(12, edit), 10);
        assert_eq!(adjust_offset(15, edit), 10);
        assert_eq!(adjust_offset(16, edit), 14);
    }

    #[test]
    fn test_range_contains_edit() {
        let edit = EditSpan::new(10, 5, 3);
        assert_eq!(
            adjust_range(TextRange::new(5, 20), edit),
            Some(TextRange::new(5, 18))
        );
    }

    #[test]
    fn test_range_before_and_after() {
        let edit = EditSpan::new(10, 5, 3);
        assert_eq!(
            adjust_range(TextRange::new(2, 10), edit),
            Some(TextRange::new(2, 10))
        );
        assert_eq!(
            adjust_range(TextRange::new(15, 20), edit),
            Some(TextRange::new(13, 18))
        );
    }

    #[test]
    fn test_range_consumed() {
        let edit = EditSpan::new(10, 5, 3);
        assert_eq!(adjust_range(TextRange::new(10, 15), edit), None);
        assert_eq!(adjust_range(TextRange::new(11, 13), edit), None);
    }

    #[test]
    fn test_range_truncated_at_edit() {
        let edit = EditSpan::new(10, 5, 0);
        assert_eq!(
            adjust_range(TextRange::new(6, 12), edit),
            Some(TextRange::new(6, 10))
        );
    }

    #[test]
    fn test_range_starting_inside_deletion() {
        // "0123456789ABCDEFGHIJ": delete "CDE" (12..15), insert "xy".
        let edit = EditSpan::new(12, 3, 2);
        assert_eq!(
            adjust_range(TextRange::new(13, 18), edit),
            Some(TextRange::new(14, 17))
        );
    }

    #[test]
    fn test_pure_insertion() {
        let edit = EditSpan::new(10, 0, 4);
        assert_eq!(
            adjust_range(TextRange::new(5, 10), edit),
            Some(TextRange::new(5, 10))
        );
        assert_eq!(
            adjust_range(TextRange::new(10, 12), edit),
            Some(TextRange::new(14, 16))
        );
        assert_eq!(
            adjust_range(TextRange::new(8, 12), edit),
            Some(TextRange::new(8, 16))
        );
    }
}
