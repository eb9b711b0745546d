//! Terminal display width helpers.
//!
//! Labels drawn over display tiles may carry ANSI styling, so widths are
//! measured after stripping escapes.

/// Compute the display width of a string after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(strip_ansi(text).as_str())
}

fn strip_ansi(text: &str) -> String {
    let clean = strip_ansi_escapes::strip(text);
    String::from_utf8_lossy(&clean).into_owned()
}

/// Truncate `text` to at most `max_width` columns, marking the cut with an
/// ellipsis. Styling is dropped from labels that need cutting.
pub fn truncate_display(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut width = 0usize;
    for ch in strip_ansi(text).chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w >= max_width {
            if width < max_width {
                result.push('…');
            }
            break;
        }
        width += w;
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_ansi() {
        assert_eq!(display_width("\x1b[31mcam\x1b[0m"), 3);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate_display("front-camera", 6), "front…");
        assert_eq!(truncate_display("arm", 6), "arm");
    }

    #[test]
    fn truncate_counts_only_visible_columns() {
        let styled = "\x1b[1;32mfront-camera\x1b[0m";
        assert_eq!(truncate_display(styled, 6), "front…");
        assert_eq!(truncate_display("\x1b[31mcam\x1b[0m", 3), "\x1b[31mcam\x1b[0m");
    }
}
