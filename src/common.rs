//! Line-level helpers shared by the extractor and matchers.

/// Words that open control flow and can look like `name(...) {` lines.
const CONTROL_WORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "match", "return", "fail", "catch",
];

pub fn is_control_word(name: &str) -> bool {
    CONTROL_WORDS.contains(&name)
}

/// Tracks `/* ... */` block comments across lines.
pub struct CommentTracker {
    in_block: bool,
}

impl CommentTracker {
    pub fn new() -> Self {
        Self { in_block: false }
    }

    /// True if the trimmed line is a `//` line, starts a block comment, or
    /// lies inside one. A line closing a block comment is still a comment
    /// unless code follows the `*/`.
    pub fn is_comment(&mut self, trimmed: &str) -> bool {
        if self.in_block {
            if let Some(pos) = trimmed.find("*/") {
                self.in_block = false;
                let rest = trimmed[pos + 2..].trim();
                return rest.is_empty() || rest.starts_with("//");
            }
            return true;
        }

        if trimmed.starts_with("/*") {
            if !trimmed[2..].contains("*/") {
                self.in_block = true;
            }
            return true;
        }

        trimmed.starts_with("//")
    }
}

impl Default for CommentTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte width of the leading whitespace of `line`.
pub fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_comment() {
        let mut ct = CommentTracker::new();
        assert!(ct.is_comment("// area(): float"));
    }

    #[test]
    fn code_is_not_comment() {
        let mut ct = CommentTracker::new();
        assert!(!ct.is_comment("area(): float"));
    }

    #[test]
    fn single_line_block_comment() {
        let mut ct = CommentTracker::new();
        assert!(ct.is_comment("/* Shape { */"));
        assert!(!ct.is_comment("Shape {"));
    }

    #[test]
    fn multi_line_block_comment() {
        let mut ct = CommentTracker::new();
        assert!(ct.is_comment("/* disabled:"));
        assert!(ct.is_comment("Circle : Shape {"));
        assert!(ct.is_comment("}"));
        assert!(ct.is_comment("*/"));
        assert!(!ct.is_comment("main() {"));
    }

    #[test]
    fn code_after_block_close_is_not_comment() {
        let mut ct = CommentTracker::new();
        assert!(ct.is_comment("/* note"));
        assert!(!ct.is_comment("*/ main() {"));
    }

    #[test]
    fn star_prefix_alone_is_code() {
        let mut ct = CommentTracker::new();
        assert!(!ct.is_comment("* factor"));
    }

    #[test]
    fn control_words() {
        assert!(is_control_word("if"));
        assert!(is_control_word("while"));
        assert!(!is_control_word("area"));
    }

    #[test]
    fn indent() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 1);
        assert_eq!(indent_width("x"), 0);
    }
}
