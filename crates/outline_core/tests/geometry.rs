use std::sync::Once;

use outline_core::{
    drag_handle_top, handle_fraction, handle_top, index_for_progress, progress_for_handle_top,
    step_index, tick_fraction,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(outline_logging::initialize_for_tests);
}

#[test]
fn handle_and_tick_denominators_differ() {
    init_logging();
    // Five messages: the handle maps index 2 over four gaps, the tick over
    // five slots. The two fractions must not coincide.
    assert_eq!(handle_fraction(2, 5), 0.5);
    assert_eq!(tick_fraction(2, 5), 0.4);
    assert_ne!(handle_fraction(2, 5), tick_fraction(2, 5));
}

#[test]
fn tiny_counts_collapse_to_track_top() {
    init_logging();
    assert_eq!(handle_fraction(0, 0), 0.0);
    assert_eq!(handle_fraction(0, 1), 0.0);
    assert_eq!(tick_fraction(0, 0), 0.0);
}

#[test]
fn handle_top_spans_track_minus_handle() {
    init_logging();
    assert_eq!(handle_top(0.0, 800.0, 80.0), 0.0);
    assert_eq!(handle_top(0.5, 800.0, 80.0), 360.0);
    assert_eq!(handle_top(1.0, 800.0, 80.0), 720.0);
    // A handle taller than its track pins to the top.
    assert_eq!(handle_top(1.0, 50.0, 80.0), 0.0);
}

#[test]
fn dragging_centers_the_handle_on_the_pointer() {
    init_logging();
    assert_eq!(drag_handle_top(400.0, 800.0, 80.0), 360.0);
    assert_eq!(drag_handle_top(-50.0, 800.0, 80.0), 0.0);
    assert_eq!(drag_handle_top(10_000.0, 800.0, 80.0), 720.0);
}

#[test]
fn progress_inverts_handle_top() {
    init_logging();
    assert_eq!(progress_for_handle_top(360.0, 800.0, 80.0), 0.5);
    assert_eq!(progress_for_handle_top(0.0, 800.0, 80.0), 0.0);
    assert_eq!(progress_for_handle_top(720.0, 800.0, 80.0), 1.0);
    assert_eq!(progress_for_handle_top(10.0, 50.0, 80.0), 0.0);
}

#[test]
fn full_progress_lands_on_the_last_message() {
    init_logging();
    assert_eq!(index_for_progress(0.0, 5), 0);
    assert_eq!(index_for_progress(0.5, 5), 2);
    assert_eq!(index_for_progress(1.0, 5), 4);
    assert_eq!(index_for_progress(0.3, 0), 0);
}

#[test]
fn handle_position_round_trips_through_index() {
    init_logging();
    for count in [2usize, 5, 7] {
        for index in 0..count {
            let fraction = handle_fraction(index, count);
            assert_eq!(
                index_for_progress(fraction, count),
                index,
                "count={count} index={index}"
            );
        }
    }
}

#[test]
fn wheel_steps_clamp_at_both_ends() {
    init_logging();
    assert_eq!(step_index(0, -1, 5), 0);
    assert_eq!(step_index(4, 1, 5), 4);
    assert_eq!(step_index(2, 1, 5), 3);
    assert_eq!(step_index(2, -1, 5), 1);
    assert_eq!(step_index(0, 1, 0), 0);
}
