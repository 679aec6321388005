use std::sync::Once;
use std::time::Duration;

use ego_tree::NodeId;
use outline_engine::{
    ChangeCause, ChangeWatcher, ElementData, Page, Selector, WatchTiming,
};
use tokio::time::{timeout, Instant};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(outline_logging::initialize_for_tests);
}

fn page_with_main() -> (Page, NodeId) {
    let page = Page::new("https://chatgpt.com/c/abc");
    let main = page
        .insert_element(page.root_id(), ElementData::new("main"))
        .unwrap();
    (page, main)
}

fn user_node(text: &str) -> ElementData {
    ElementData::new("div")
        .with_attr("data-message-author-role", "user")
        .with_text(text)
}

#[tokio::test(start_paused = true)]
async fn a_mutation_burst_coalesces_into_one_refresh() {
    init_logging();
    let (page, main) = page_with_main();
    let mut watcher = ChangeWatcher::new(&page, main, None, WatchTiming::default());

    for i in 0..10 {
        page.insert_element(main, user_node(&format!("burst {i}")));
    }

    let cause = timeout(Duration::from_secs(5), watcher.changed())
        .await
        .expect("refresh should fire after the quiet period");
    assert_eq!(cause, ChangeCause::Mutation);

    // The burst must not leave a second refresh queued behind it.
    assert!(timeout(Duration::from_secs(2), watcher.changed())
        .await
        .is_err());
}

#[tokio::test(start_paused = true)]
async fn each_new_trigger_replaces_the_pending_deadline() {
    init_logging();
    let (page, main) = page_with_main();
    let mut watcher = ChangeWatcher::new(&page, main, None, WatchTiming::default());

    // Re-trigger twice just before the 500ms deadline; the trailing call
    // keeps moving, so nothing fires inside either 400ms slice.
    page.insert_element(main, user_node("first"));
    assert!(timeout(Duration::from_millis(400), watcher.changed())
        .await
        .is_err());
    page.insert_element(main, user_node("second"));
    assert!(timeout(Duration::from_millis(400), watcher.changed())
        .await
        .is_err());

    let cause = timeout(Duration::from_secs(2), watcher.changed())
        .await
        .expect("trailing refresh");
    assert_eq!(cause, ChangeCause::Mutation);
}

#[tokio::test(start_paused = true)]
async fn signature_prefilter_ignores_non_message_mutations() {
    init_logging();
    let (page, main) = page_with_main();
    let signature = Selector::parse(r#"[data-message-author-role="user"]"#).ok();
    let mut watcher = ChangeWatcher::new(&page, main, signature, WatchTiming::default());

    // A spinner-ish node inside the container: no signature match.
    page.insert_element(main, ElementData::new("div").with_class("result-streaming"));
    assert!(timeout(Duration::from_secs(2), watcher.changed())
        .await
        .is_err());

    // A node that *contains* a signature match schedules a refresh.
    let wrapper = page.insert_element(main, ElementData::new("article")).unwrap();
    page.insert_element(wrapper, user_node("a new question"));
    let cause = timeout(Duration::from_secs(2), watcher.changed())
        .await
        .expect("signature match should refresh");
    assert_eq!(cause, ChangeCause::Mutation);
}

#[tokio::test(start_paused = true)]
async fn mutations_outside_the_container_are_ignored() {
    init_logging();
    let (page, main) = page_with_main();
    let sidebar = page
        .insert_element(page.root_id(), ElementData::new("nav"))
        .unwrap();
    let mut watcher = ChangeWatcher::new(&page, main, None, WatchTiming::default());

    page.insert_element(sidebar, ElementData::new("div").with_text("history entry"));
    assert!(timeout(Duration::from_secs(2), watcher.changed())
        .await
        .is_err());
}

#[tokio::test(start_paused = true)]
async fn address_change_refreshes_after_the_settle_delay() {
    init_logging();
    let (page, main) = page_with_main();
    let mut watcher = ChangeWatcher::new(&page, main, None, WatchTiming::default());
    let started = Instant::now();

    page.set_address("https://chatgpt.com/c/other");
    let cause = timeout(Duration::from_secs(5), watcher.changed())
        .await
        .expect("address change should refresh");
    assert_eq!(cause, ChangeCause::AddressChanged);
    // The 800ms settle delay must have elapsed on top of poll detection.
    assert!(started.elapsed() >= Duration::from_millis(800));
}

#[tokio::test(start_paused = true)]
async fn unchanged_address_never_fires() {
    init_logging();
    let (page, main) = page_with_main();
    let mut watcher = ChangeWatcher::new(&page, main, None, WatchTiming::default());

    assert!(timeout(Duration::from_secs(5), watcher.changed())
        .await
        .is_err());
}
