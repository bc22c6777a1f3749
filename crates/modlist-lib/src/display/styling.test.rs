use super::*;
use crate::primitives::TerminalColorCaps;

fn caps(color: TerminalColorCaps, unicode: bool) -> TerminalCapabilities {
    TerminalCapabilities {
        color,
        unicode,
        ..TerminalCapabilities::minimal()
    }
}

#[test]
fn test_plain_terminal_has_no_escape_codes() {
    let styling = StyleManager::new(&caps(TerminalColorCaps::None, false));
    assert_eq!(styling.format_success("done"), "+ done");
    assert_eq!(styling.format_error("failed"), "x failed");
    assert_eq!(styling.style_emphasis("title"), "title");
}

#[test]
fn test_color_terminal_emits_escape_codes() {
    let styling = StyleManager::new(&caps(TerminalColorCaps::Ansi16, true));
    let styled = styling.style_success("ok");
    assert!(styled.contains("\u{1b}["));
    assert_eq!(console::strip_ansi_codes(&styled), "ok");
}

#[test]
fn test_unicode_symbols_follow_capabilities() {
    let unicode = StyleManager::new(&caps(TerminalColorCaps::None, true));
    assert_eq!(unicode.symbols().checkmark, "✓");
    assert!(unicode.is_unicode());

    let ascii = StyleManager::new(&caps(TerminalColorCaps::None, false));
    assert_eq!(ascii.bullet(), "*");
}
