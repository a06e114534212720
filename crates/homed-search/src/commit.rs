//! When typed text becomes committed free text.
//!
//! Typing never changes the descriptor directly. The text is committed when
//! the user presses Enter, selects a suggestion, or stops typing for the idle
//! interval; the idle path only commits text that differs from what is
//! already committed.

use std::fmt;

use crate::descriptor::normalize_free_text;

/// What caused a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// Enter was pressed.
    Enter,
    /// A suggestion was selected.
    Selection,
    /// The input was idle for the commit interval.
    Idle,
}

impl fmt::Display for CommitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "enter",
            Self::Selection => "selection",
            Self::Idle => "idle",
        })
    }
}

/// Whether typed `text` differs from the `committed` free text.
#[must_use]
pub fn is_dirty(text: &str, committed: Option<&str>) -> bool {
    normalize_free_text(text).as_deref() != committed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_edits_are_not_dirty() {
        assert!(!is_dirty("  Leeds ", Some("Leeds")));
        assert!(!is_dirty("   ", None));
        assert!(is_dirty("Leed", Some("Leeds")));
        assert!(is_dirty("", Some("Leeds")));
    }
}
