//! The single clipboard register shared by delete, yank and paste.

/// Clipboard content.
///
/// There is no stored mode flag: content whose last character is `\n` is linewise, anything
/// else is characterwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    text: String,
}

impl Register {
    /// Create a register holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw register content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the register content (last write wins).
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Returns `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` if the content ends with a newline.
    pub fn is_linewise(&self) -> bool {
        self.text.ends_with('\n')
    }

    /// For linewise content, the stored lines without the terminating newline.
    pub fn lines(&self) -> Option<Vec<&str>> {
        self.text
            .strip_suffix('\n')
            .map(|body| body.split('\n').collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_newline_marks_linewise() {
        assert!(Register::new("a\nb\n").is_linewise());
        assert!(!Register::new("a\nb").is_linewise());
        assert!(!Register::default().is_linewise());
    }

    #[test]
    fn test_lines_of_linewise_register() {
        assert_eq!(Register::new("one\ntwo\n").lines(), Some(vec!["one", "two"]));
        assert_eq!(Register::new("\n").lines(), Some(vec![""]));
        assert_eq!(Register::new("chars").lines(), None);
    }
}
