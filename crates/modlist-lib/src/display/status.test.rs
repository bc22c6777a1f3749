use super::*;
use crate::terminal::TerminalCapabilities;

fn create_test_styling() -> StyleManager {
    StyleManager::new(&TerminalCapabilities::minimal())
}

#[test]
fn test_status_messages_do_not_panic() {
    let styling = create_test_styling();
    let status = StatusDisplay::new(&styling);

    status.checking("fabric-api");
    status.success("fabric-api", "0.92.0");
    status.success("plain", "");
    status.error("sodium", "not found");
    status.warning("row hash changed");
    status.info("using cached responses");
    status.message("Plain message");
    status.subtle("Secondary info");
    status.list(&["one", "two"]);
    status.step(1, 2, "Loading database");
    status.complete("Done");
}

#[test]
fn test_join_details() {
    assert_eq!(join_details("item", ""), "item");
    assert_eq!(join_details("item", "detail"), "item: detail");
}

#[test]
fn test_render_counts_aligns_labels() {
    let rendered = render_counts(&[("Total", 3), ("Update available", 1)]);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "  Total             3");
    assert_eq!(lines[1], "  Update available  1");
}

#[test]
fn test_render_table_pads_columns() {
    let rows = vec![
        vec!["fabric-api".to_string(), "0.92.0".to_string()],
        vec!["sodium".to_string(), "".to_string()],
    ];
    let rendered = render_table(&["ID", "Version"], &rows);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "ID          Version");
    assert_eq!(lines[1], "fabric-api  0.92.0");
    assert_eq!(lines[2], "sodium");
}
