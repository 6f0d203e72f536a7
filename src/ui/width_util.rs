use terminal_size::{Width, terminal_size};

use crate::ui::ascii::ESC_BYTE;

#[derive(Debug, Default, Clone)]
pub struct WidthUtil;

impl WidthUtil {
    /// Drop CSI sequences so styled text measures like its visible form.
    fn strip_ansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut bytes = s.bytes().peekable();

        while let Some(byte) = bytes.next() {
            if byte == ESC_BYTE && matches!(bytes.peek(), Some(b'[')) {
                let _ = bytes.next();
                for nb in bytes.by_ref() {
                    if (nb as char).is_ascii_alphabetic() {
                        break;
                    }
                }
                continue;
            }
            out.push(byte as char);
        }
        out
    }

    pub fn visible_width(&self, s: &str) -> usize {
        Self::strip_ansi(s).chars().count()
    }

    pub fn pad_visible(&self, s: &str, width: usize) -> String {
        let w = self.visible_width(s);
        if w >= width {
            s.to_string()
        } else {
            let mut out = String::with_capacity(s.len() + (width - w));
            out.push_str(s);
            for _ in 0..(width - w) {
                out.push(' ');
            }
            out
        }
    }

    /// Best-effort terminal width (defaults to 80).
    pub fn terminal_width(&self) -> usize {
        if let Some((Width(w), _)) = terminal_size() {
            w as usize
        } else {
            80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ansi::{STYLE_BOLD, STYLE_RESET};

    #[test]
    fn visible_width_ignores_ansi_sequences() {
        let util = WidthUtil;
        let styled = format!("{STYLE_BOLD}abc{STYLE_RESET}");
        assert_eq!(util.visible_width(&styled), 3);
        assert_eq!(util.visible_width("abc"), 3);
    }

    #[test]
    fn pad_visible_pads_to_target_width() {
        let util = WidthUtil;
        assert_eq!(util.pad_visible("ab", 4), "ab  ");
        assert_eq!(util.pad_visible("abcd", 2), "abcd");
    }
}
