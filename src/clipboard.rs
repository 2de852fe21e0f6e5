use anyhow::Result;

/// Where published hex strings go.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// OS clipboard backed by arboard. The handle is opened per write; a
/// long-lived handle would hold clipboard ownership for the whole session
/// on X11.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string()))?;
        Ok(())
    }
}

/// Capture-only clipboard. Stands in for the OS clipboard in tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_records_last_write() {
        let mut cb = MemoryClipboard::new();
        assert_eq!(cb.contents(), None);
        cb.set_text("#aabbcc").unwrap();
        cb.set_text("#112233").unwrap();
        assert_eq!(cb.contents(), Some("#112233"));
    }
}
