//! Hierarchy identifier composition.
//!
//! Every entity carries a fixed 9-character identifier `CCCPPSSTT`:
//! a 3-letter dham code followed by three 2-digit, parent-scoped sequence
//! numbers, one per nested level. Unused trailing positions are zero, so a
//! root is `CCC000000`, a key place `CCCPP0000`, a key spot `CCCPPSS00`
//! and a sub-spot `CCCPPSSTT`. Truncating any identifier to 3, 5 or 7
//! characters recovers the corresponding ancestor's prefix.

/// Length of the dham code.
pub const CODE_LEN: usize = 3;

/// Fixed width of every hierarchy identifier.
pub const ID_LEN: usize = 9;

/// The three child levels of the hierarchy (the root level owns no
/// sequence digits of its own).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    KeyPlace,
    KeySpot,
    SubSpot,
}

impl Level {
    /// Byte offset of this level's 2-digit sequence within the identifier.
    /// Everything before it is the parent's prefix.
    pub const fn seq_offset(self) -> usize {
        match self {
            Level::KeyPlace => 3,
            Level::KeySpot => 5,
            Level::SubSpot => 7,
        }
    }

    /// Length of the parent prefix this level anchors to (3, 5 or 7).
    pub const fn prefix_len(self) -> usize {
        self.seq_offset()
    }

    /// Plural label for capacity error messages.
    pub const fn children_label(self) -> &'static str {
        match self {
            Level::KeyPlace => "Key Places",
            Level::KeySpot => "Key Spots",
            Level::SubSpot => "Sub-Spots",
        }
    }

    /// Label of the parent level for capacity error messages.
    pub const fn parent_label(self) -> &'static str {
        match self {
            Level::KeyPlace => "Dham",
            Level::KeySpot => "Key Place",
            Level::SubSpot => "Key Spot",
        }
    }
}

/// Compose the root-level identifier: the dham code plus six zeros.
pub fn compose_root_id(code: &str) -> String {
    format!("{code}000000")
}

/// Compose a child identifier from the parent's prefix and this level's
/// sequence number, zero-padded out to the fixed width.
pub fn compose_child_id(parent_prefix: &str, level: Level, seq: u32) -> String {
    debug_assert_eq!(parent_prefix.len(), level.prefix_len());
    let mut id = format!("{parent_prefix}{seq:02}");
    while id.len() < ID_LEN {
        id.push('0');
    }
    id
}

/// The prefix a resolved identifier exposes to children at `child_level`,
/// or `None` if the identifier is not well-formed.
pub fn prefix_for(hierarchy_id: &str, child_level: Level) -> Option<&str> {
    if hierarchy_id.len() != ID_LEN {
        return None;
    }
    hierarchy_id.get(..child_level.prefix_len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_id_width() {
        let id = compose_root_id("AYD");
        assert_eq!(id, "AYD000000");
        assert_eq!(id.len(), ID_LEN);
    }

    #[test]
    fn test_child_id_widths() {
        let kp = compose_child_id("AYD", Level::KeyPlace, 1);
        assert_eq!(kp, "AYD010000");
        let ks = compose_child_id(&kp[..5], Level::KeySpot, 3);
        assert_eq!(ks, "AYD010300");
        let ss = compose_child_id(&ks[..7], Level::SubSpot, 12);
        assert_eq!(ss, "AYD010312");
        for id in [&kp, &ks, &ss] {
            assert_eq!(id.len(), ID_LEN);
        }
    }

    #[test]
    fn test_prefix_containment() {
        // Composing then truncating to an ancestor prefix reproduces it.
        let root = compose_root_id("VRN");
        let kp = compose_child_id(prefix_for(&root, Level::KeyPlace).unwrap(), Level::KeyPlace, 2);
        let ks = compose_child_id(prefix_for(&kp, Level::KeySpot).unwrap(), Level::KeySpot, 7);
        let ss = compose_child_id(prefix_for(&ks, Level::SubSpot).unwrap(), Level::SubSpot, 4);

        assert_eq!(&kp[..3], &root[..3]);
        assert_eq!(&ks[..5], &kp[..5]);
        assert_eq!(&ss[..7], &ks[..7]);
        assert_eq!(ss, "VRN020704");
    }

    #[test]
    fn test_prefix_for_rejects_malformed() {
        assert_eq!(prefix_for("AYD01", Level::KeySpot), None);
        assert_eq!(prefix_for("AYD0100000", Level::KeySpot), None);
        assert_eq!(prefix_for("AYD010000", Level::KeySpot), Some("AYD01"));
    }
}
