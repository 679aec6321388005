//! Pure mapping between message indices and scrollbar coordinates.
//!
//! The handle and the tick marks deliberately use different denominators:
//! the handle maps a continuous reading position over `count - 1` gaps,
//! while ticks mark message boundaries at `index / count`. Keeping the two
//! apart is required for the control to line up visually.

/// Fraction of the track occupied by the handle for `active_index`.
/// Counts of zero or one collapse to the top of the track.
pub fn handle_fraction(active_index: usize, count: usize) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    (active_index as f64 / (count - 1) as f64).clamp(0.0, 1.0)
}

/// Fractional offset of the tick for `index`, measured over `count` slots.
pub fn tick_fraction(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (index as f64 / count as f64).clamp(0.0, 1.0)
}

/// Pixel offset of the handle's top edge for a given track fraction.
pub fn handle_top(fraction: f64, track_height: f64, handle_height: f64) -> f64 {
    let span = (track_height - handle_height).max(0.0);
    (fraction.clamp(0.0, 1.0) * span).max(0.0)
}

/// Handle top implied by a pointer at `pointer_y` (track-relative). The
/// handle centers on the pointer and is bounded to the track limits.
pub fn drag_handle_top(pointer_y: f64, track_height: f64, handle_height: f64) -> f64 {
    let span = (track_height - handle_height).max(0.0);
    (pointer_y - handle_height / 2.0).clamp(0.0, span)
}

/// Inverse of [`handle_top`]: progress in `[0, 1]` for a handle top edge.
pub fn progress_for_handle_top(top: f64, track_height: f64, handle_height: f64) -> f64 {
    let span = track_height - handle_height;
    if span <= 0.0 {
        return 0.0;
    }
    (top / span).clamp(0.0, 1.0)
}

/// Message index addressed by a progress fraction. Full progress lands on
/// the last message rather than one past it.
pub fn index_for_progress(progress: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let raw = (progress.clamp(0.0, 1.0) * count as f64).floor() as usize;
    raw.min(count - 1)
}

/// Moves an index by one step in `delta`'s direction, clamped to bounds.
/// Step size is always one regardless of the delta's magnitude.
pub fn step_index(index: usize, delta: i32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let stepped = if delta > 0 {
        index.saturating_add(1)
    } else {
        index.saturating_sub(1)
    };
    stepped.min(count - 1)
}
