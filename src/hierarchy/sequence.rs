//! Per-level sequence allocation.
//!
//! A new child's sequence number is one past the maximum currently in use
//! under its parent. Deleted siblings leave gaps that are never refilled.

use super::id::{Level, ID_LEN};
use crate::error::{Result, ServerError};

/// Highest sequence number a parent can hand out at any level.
pub const MAX_SEQ: u32 = 99;

/// Parse the 2-digit sequence owned by `level` out of a hierarchy ID.
/// Returns `None` for malformed values (wrong width, non-numeric slice)
/// so historical garbage is skipped rather than fatal.
pub fn parse_sequence(hierarchy_id: &str, level: Level) -> Option<u32> {
    if hierarchy_id.len() != ID_LEN {
        return None;
    }
    let offset = level.seq_offset();
    let slice = hierarchy_id.get(offset..offset + 2)?;
    if !slice.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    slice.parse().ok()
}

/// Compute the next sequence number for a new child at `level`, given the
/// hierarchy IDs of the parent's existing children.
pub fn next_sequence<'a, I>(level: Level, sibling_ids: I) -> Result<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let max_seq = sibling_ids
        .into_iter()
        .filter_map(|id| parse_sequence(id, level))
        .max()
        .unwrap_or(0);
    let next = max_seq + 1;
    if next > MAX_SEQ {
        return Err(ServerError::CapacityExceeded {
            children: level.children_label(),
            parent: level.parent_label(),
        });
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_child_gets_sequence_one() {
        assert_eq!(next_sequence(Level::KeyPlace, []).unwrap(), 1);
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let siblings = ["AYD010000", "AYD020000"];
        assert_eq!(next_sequence(Level::KeyPlace, siblings).unwrap(), 3);

        // A deleted sibling's number is skipped over, never reused.
        let after_delete = ["AYD020000"];
        assert_eq!(next_sequence(Level::KeyPlace, after_delete).unwrap(), 3);
    }

    #[test]
    fn test_level_offsets() {
        let ids = ["AYD010305"];
        assert_eq!(parse_sequence(ids[0], Level::KeyPlace), Some(1));
        assert_eq!(parse_sequence(ids[0], Level::KeySpot), Some(3));
        assert_eq!(parse_sequence(ids[0], Level::SubSpot), Some(5));
    }

    #[test]
    fn test_malformed_ids_skipped() {
        let siblings = ["garbage", "AYD0", "AYDXX0000", "", "AYD040000"];
        assert_eq!(next_sequence(Level::KeyPlace, siblings).unwrap(), 5);
    }

    #[test]
    fn test_capacity_boundary() {
        let at_98 = ["AYD980000"];
        assert_eq!(next_sequence(Level::KeyPlace, at_98).unwrap(), 99);

        let at_99 = ["AYD990000"];
        let err = next_sequence(Level::KeyPlace, at_99).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Maximum 99 Key Places per Dham reached"
        );
    }
}
