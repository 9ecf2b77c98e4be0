//! Pure track-order edits applied to a freshly fetched remote order.

use cadence_core::{CadenceError, Result, TrackId};

/// Move the element at `from` to `to`, shifting the others
///
/// Both indices must be within `order`. Returns `None` when `from == to`.
pub fn move_track(order: &[TrackId], from: usize, to: usize) -> Result<Option<Vec<TrackId>>> {
    let len = order.len();
    if from >= len || to >= len {
        return Err(CadenceError::bad_request(format!(
            "track index out of range: from {from}, to {to}, length {len}"
        )));
    }

    if from == to {
        return Ok(None);
    }

    let mut moved = order.to_vec();
    let track = moved.remove(from);
    moved.insert(to, track);
    Ok(Some(moved))
}

/// Drop the first occurrence of `track_id`
///
/// Returns `None` when the track is not present.
pub fn remove_first(order: &[TrackId], track_id: &TrackId) -> Option<Vec<TrackId>> {
    let position = order.iter().position(|id| id == track_id)?;
    let mut removed = order.to_vec();
    removed.remove(position);
    Some(removed)
}

/// Append `track_id`; duplicates are allowed
pub fn append(order: &[TrackId], track_id: &TrackId) -> Vec<TrackId> {
    let mut appended = order.to_vec();
    appended.push(track_id.clone());
    appended
}
