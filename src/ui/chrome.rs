use crate::ui::ansi::{
    CLEAR_SCREEN, CURSOR_HOME, FG_LIGHT_GRAY, STYLE_BOLD, STYLE_ITALIC, STYLE_RESET,
};
use crate::ui::width_util::WidthUtil;
use std::io::{self, Write};

/// Screen-level helpers (banner, clearing).
#[derive(Debug, Default, Clone)]
pub struct UiChrome {
    util: WidthUtil,
}

impl UiChrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_banner(&self) {
        const INNER_WIDTH: usize = 54;
        let version = env!("CARGO_PKG_VERSION");
        let title = format!(
            "{STYLE_BOLD}A U T O S C H E D{STYLE_RESET} {FG_LIGHT_GRAY}(v{version}){STYLE_RESET}"
        );
        let subtitle = format!("{STYLE_ITALIC}Critical paths, from plain English{STYLE_RESET}");
        println!("╭{}╮", "─".repeat(INNER_WIDTH));
        println!("│{}│", " ".repeat(INNER_WIDTH));
        println!("│{}│", self.center_in_box(&title, INNER_WIDTH));
        println!("│{}│", self.center_in_box(&subtitle, INNER_WIDTH));
        println!("│{}│", " ".repeat(INNER_WIDTH));
        println!("╰{}╯", "─".repeat(INNER_WIDTH));
    }

    pub fn clear_screen(&self) {
        print!("{CLEAR_SCREEN}{CURSOR_HOME}");
        let _ = io::stdout().flush();
    }

    fn center_in_box(&self, content: &str, width: usize) -> String {
        let content_width = self.util.visible_width(content);
        if content_width >= width {
            return content.to_string();
        }
        let left = (width - content_width) / 2;
        let right = width - content_width - left;
        format!("{}{}{}", " ".repeat(left), content, " ".repeat(right))
    }
}
