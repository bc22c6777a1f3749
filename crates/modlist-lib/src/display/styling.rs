//! Terminal-aware styling
//!
//! Semantic colors and symbols built on `console::Style`. Styling is forced
//! on or off from the detected capabilities so piped output stays plain.

use crate::terminal::TerminalCapabilities;
use console::Style;

/// Symbol set for one terminal class
#[derive(Debug, Clone, Copy)]
pub struct Symbols {
    pub checkmark: &'static str,
    pub cross: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub bullet: &'static str,
    pub arrow: &'static str,
}

const UNICODE_SYMBOLS: Symbols = Symbols {
    checkmark: "✓",
    cross: "✗",
    warning: "⚠",
    info: "·",
    bullet: "•",
    arrow: "→",
};

const ASCII_SYMBOLS: Symbols = Symbols {
    checkmark: "+",
    cross: "x",
    warning: "!",
    info: "-",
    bullet: "*",
    arrow: ">",
};

/// Style manager translating semantic intent into terminal output
#[derive(Debug, Clone)]
pub struct StyleManager {
    symbols: Symbols,
    unicode: bool,
    success: Style,
    error: Style,
    warning: Style,
    info: Style,
    emphasis: Style,
    subtle: Style,
}

impl StyleManager {
    pub fn new(capabilities: &TerminalCapabilities) -> Self {
        let color = capabilities.supports_color();
        let style = |s: Style| s.force_styling(color);

        Self {
            symbols: if capabilities.unicode {
                UNICODE_SYMBOLS
            } else {
                ASCII_SYMBOLS
            },
            unicode: capabilities.unicode,
            success: style(Style::new().green()),
            error: style(Style::new().red()),
            warning: style(Style::new().yellow()),
            info: style(Style::new().cyan()),
            emphasis: style(Style::new().bold()),
            subtle: style(Style::new().dim()),
        }
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Whether box drawing and braille spinners may be used
    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    pub fn style_success(&self, text: &str) -> String {
        self.success.apply_to(text).to_string()
    }

    pub fn style_error(&self, text: &str) -> String {
        self.error.apply_to(text).to_string()
    }

    pub fn style_warning(&self, text: &str) -> String {
        self.warning.apply_to(text).to_string()
    }

    pub fn style_info(&self, text: &str) -> String {
        self.info.apply_to(text).to_string()
    }

    /// Style text with emphasis (bold)
    pub fn style_emphasis(&self, text: &str) -> String {
        self.emphasis.apply_to(text).to_string()
    }

    /// Style text as subtle/muted
    pub fn style_subtle(&self, text: &str) -> String {
        self.subtle.apply_to(text).to_string()
    }

    /// Format success message with symbol and styling
    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_success(self.symbols.checkmark), message)
    }

    /// Format error message with symbol and styling
    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_error(self.symbols.cross), message)
    }

    /// Format warning message with symbol and styling
    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_warning(self.symbols.warning), message)
    }

    /// Format info message with symbol and styling
    pub fn format_info(&self, message: &str) -> String {
        format!("{} {}", self.style_info(self.symbols.info), message)
    }

    /// Format working/progress message
    pub fn format_working(&self, message: &str) -> String {
        format!("{} {}", self.style_info(self.symbols.arrow), message)
    }

    pub fn bullet(&self) -> &'static str {
        self.symbols.bullet
    }
}

#[cfg(test)]
mod tests {
    include!("styling.test.rs");
}
