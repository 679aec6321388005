use std::sync::Once;

use chrono::Utc;
use outline_engine::{
    ElementData, MessageRecord, Page, PrecisionNavigator, Rect, Selector, PAGE_CLASS,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(outline_logging::initialize_for_tests);
}

fn page() -> Page {
    Page::new("https://chatgpt.com/c/abc")
}

fn records(page: &Page, count: usize) -> Vec<MessageRecord> {
    let root = page.root_id();
    (0..count)
        .map(|i| {
            let text = format!("question {i}");
            let anchor = page
                .insert_element(
                    root,
                    ElementData::new("div")
                        .with_text(&text)
                        .with_rect(Rect::new(0.0, i as f64 * 200.0, 600.0, 100.0)),
                )
                .unwrap();
            MessageRecord {
                id: format!("chatgpt-msg-{i}"),
                title: text.clone(),
                raw_text: text,
                anchor,
                extracted_at: Utc::now(),
            }
        })
        .collect()
}

#[test]
fn handle_and_tick_use_their_different_denominators() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));

    assert_eq!(nav.tick_click(2), Some(2));
    let state = nav.state();
    assert_eq!(state.active_index, 2);
    // Handle: 2 / (5 - 1). Tick: 2 / 5. Distinct by design.
    assert_eq!(state.handle_position, 0.5);
    let dots = page.query(&Selector::parse(".nav-dot").unwrap());
    assert_eq!(dots.len(), 5);
    assert_eq!(
        page.attr(dots[2], "data-top-percent").as_deref(),
        Some("40.0")
    );
}

#[test]
fn wheel_steps_one_message_and_clamps_at_both_ends() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));

    // Upward tick at the first message stays clamped.
    assert_eq!(nav.wheel(-3), None);
    assert_eq!(nav.state().active_index, 0);

    // A huge downward delta still moves exactly one step.
    assert_eq!(nav.wheel(250), Some(1));
    assert_eq!(nav.state().active_index, 1);

    nav.tick_click(4);
    assert_eq!(nav.wheel(1), None);
    assert_eq!(nav.state().active_index, 4);
}

#[test]
fn track_click_jumps_and_snaps_the_handle() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));

    // A click 62% down a five-slot track lands on index 3.
    assert_eq!(nav.track_click(0.62), Some(3));
    let state = nav.state();
    assert_eq!(state.active_index, 3);
    assert_eq!(state.handle_position, 0.75);
}

#[test]
fn dragging_scrubs_live_and_snaps_on_release() {
    init_logging();
    let page = page();
    page.set_viewport_height(800.0);
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));

    nav.begin_drag();
    assert!(nav.state().is_dragging);

    // Mid-track pointer: progress 0.5 over 5 messages means index 2, and
    // the move reports it immediately rather than waiting for release.
    assert_eq!(nav.drag_move(400.0), Some(2));
    assert_eq!(nav.state().active_index, 2);

    // A small wiggle that stays on the same index reports nothing.
    assert_eq!(nav.drag_move(405.0), None);

    nav.end_drag();
    let state = nav.state();
    assert!(!state.is_dragging);
    // Handle snapped back to the index-mapped fraction.
    assert_eq!(state.handle_position, 0.5);
}

#[test]
fn drag_is_inert_before_the_press() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));

    assert_eq!(nav.drag_move(700.0), None);
    assert_eq!(nav.state().active_index, 0);
}

#[test]
fn tooltip_is_replaced_not_stacked() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 3));

    nav.tick_hover("question 0");
    nav.tick_hover("question 1");
    let tooltips = page.query(&Selector::parse(".precision-tooltip").unwrap());
    assert_eq!(tooltips.len(), 1);
    assert_eq!(nav.tooltip_text().as_deref(), Some("question 1"));

    nav.tick_leave();
    assert!(page
        .query(&Selector::parse(".precision-tooltip").unwrap())
        .is_empty());
}

#[test]
fn recount_rebuilds_ticks_and_clamps_the_active_index() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 5));
    nav.tick_click(4);

    nav.render(&records(&page, 2));
    let state = nav.state();
    assert_eq!(state.active_index, 1);
    assert_eq!(page.query(&Selector::parse(".nav-dot").unwrap()).len(), 2);
}

#[test]
fn code_heavy_messages_get_marked_ticks() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);

    let mut recs = records(&page, 2);
    recs[1].raw_text =
        "```\nconst x = 1\n```\nfunction demo() { return x }".to_owned();
    nav.render(&recs);

    let dots = page.query(&Selector::parse(".nav-dot").unwrap());
    assert_eq!(page.attr(dots[0], "data-kind"), None);
    assert_eq!(page.attr(dots[1], "data-kind").as_deref(), Some("code"));
}

#[test]
fn teardown_restores_the_native_scroll_indicator() {
    init_logging();
    let page = page();
    let mut nav = PrecisionNavigator::build(&page, 80.0);
    nav.render(&records(&page, 3));
    nav.tick_hover("question 0");
    assert!(page.has_page_class(PAGE_CLASS));

    nav.destroy();
    assert!(!page.has_page_class(PAGE_CLASS));
    assert!(page
        .query(&Selector::parse(".precision-scrollbar").unwrap())
        .is_empty());
    assert!(page
        .query(&Selector::parse(".precision-tooltip").unwrap())
        .is_empty());
}
