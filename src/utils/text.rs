use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate to a display width, appending an ellipsis when text is cut.
/// Width is measured in terminal columns, not bytes or chars.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        assert_eq!(truncate_text("Autapses", 20), "Autapses");
        assert_eq!(truncate_text("", 5), "");
    }

    #[test]
    fn test_long_text_gets_ellipsis() {
        assert_eq!(
            truncate_text("List all neurons in a region of interest", 20),
            "List all neurons ..."
        );
    }

    #[test]
    fn test_tiny_width() {
        assert_eq!(truncate_text("long enough", 2), "..");
    }
}
