//! Reordering helpers shared by the scene and source lists

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Anything addressable by a string id
pub trait Identified {
    fn id(&self) -> &str;
}

/// Swap the item with its neighbour in `direction`
///
/// Returns `None` for an unknown id, `Some(false)` when the item is already
/// at that end of the list.
pub fn move_item<T: Identified>(items: &mut [T], id: &str, direction: Direction) -> Option<bool> {
    let index = items.iter().position(|item| item.id() == id)?;
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&i| i < items.len()),
    };

    match target {
        Some(target) => {
            items.swap(index, target);
            Some(true)
        }
        None => Some(false),
    }
}
