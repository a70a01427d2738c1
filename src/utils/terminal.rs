//! Terminal output sanitization
//!
//! Converted content comes back from the server verbatim and may contain
//! escape sequences. Anything rendered to the terminal (previews, CLI
//! dumps, history names) goes through [`sanitize_for_terminal`] first.

/// Removes ANSI CSI and OSC escape sequences plus other control
/// characters, keeping tabs and line breaks.
///
/// # Examples
///
/// ```
/// use convert_desk::utils::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m"), "Red");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                // CSI: ESC [ params final-byte
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() || next == '~' {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... terminated by BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_colors() {
        assert_eq!(sanitize_for_terminal("\x1b[1m\x1b[31mBold\x1b[0m text"), "Bold text");
    }

    #[test]
    fn test_strips_cursor_movement() {
        assert_eq!(sanitize_for_terminal("\x1b[2J\x1b[H cleared"), " cleared");
        assert_eq!(sanitize_for_terminal("a\x1b[3~b"), "ab");
    }

    #[test]
    fn test_strips_osc_title_sequences() {
        assert_eq!(sanitize_for_terminal("\x1b]0;evil title\x07ok"), "ok");
        assert_eq!(sanitize_for_terminal("\x1b]8;;http://x\x1b\\link"), "link");
    }

    #[test]
    fn test_strips_control_chars() {
        assert_eq!(sanitize_for_terminal("bell\x07 back\x08"), "bell back");
    }

    #[test]
    fn test_keeps_whitespace_and_unicode() {
        let text = "Line 1\nLine 2\r\n\tTabbed 👋";
        assert_eq!(sanitize_for_terminal(text), text);
    }

    #[test]
    fn test_lone_escape_dropped() {
        assert_eq!(sanitize_for_terminal("a\x1bb"), "ab");
        assert_eq!(sanitize_for_terminal("\x1b"), "");
    }
}
