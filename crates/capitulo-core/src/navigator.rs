//! Chapter navigation targets. Pure functions; the host does the actual push.

use crate::error::{ChapterError, Result};

pub fn previous_target(current: u32, _total: u32) -> Option<u32> {
    (current > 1).then(|| current - 1)
}

pub fn next_target(current: u32, total: u32) -> Option<u32> {
    (current < total).then(|| current + 1)
}

pub fn jump_target(_current: u32, selected: u32, total: u32) -> Result<u32> {
    if (1..=total).contains(&selected) {
        Ok(selected)
    } else {
        Err(ChapterError::InvalidNavigationTarget { selected, total })
    }
}
