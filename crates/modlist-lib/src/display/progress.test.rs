use super::*;
use crate::terminal::TerminalCapabilities;

fn create_test_styling() -> StyleManager {
    StyleManager::new(&TerminalCapabilities::minimal())
}

#[test]
fn test_progress_bar_tracks_position() {
    let styling = create_test_styling();
    let progress = ProgressDisplay::new(&styling, false);

    let bar = progress.bar(50);
    assert_eq!(bar.bar().length(), Some(50));
    assert_eq!(bar.bar().position(), 0);

    bar.inc();
    bar.inc();
    assert_eq!(bar.bar().position(), 2);
}

#[test]
fn test_hidden_bar_finishes() {
    let styling = create_test_styling();
    let progress = ProgressDisplay::new(&styling, false);

    let bar = progress.bar(1);
    bar.tick("fabric-api");
    bar.inc();
    bar.finish("Resolved 1 record");
    assert!(bar.bar().is_finished());
}

#[test]
fn test_spinner_keeps_message() {
    let styling = create_test_styling();
    let progress = ProgressDisplay::new(&styling, false);

    let spinner = progress.spinner("Downloading");
    assert_eq!(spinner.bar().message(), "Downloading");
    spinner.abandon("failed");
    assert!(spinner.bar().is_finished());
}
