use anyhow::Result;

use crate::clipboard::Clipboard;
use crate::color::Color;

/// The last published pick: the color and its canonical hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub color: Color,
    pub hex: String,
}

/// One publish, reported back to the UI. The selection updates even when
/// the clipboard write fails; the failure only travels along for the
/// status line.
#[derive(Debug)]
pub struct Published {
    pub selection: Selection,
    pub clipboard_error: Option<String>,
}

/// Turns picked colors into selections and pushes the hex text to the
/// clipboard.
pub struct Publisher<C> {
    clipboard: C,
}

impl<C: Clipboard> Publisher<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Publish a color as lowercase `#rrggbb`.
    pub fn publish(&mut self, color: Color) -> Published {
        let hex = color.to_hex();
        let clipboard_error = match self.clipboard.set_text(&hex) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("clipboard write failed: {err:#}");
                Some(format!("{err:#}"))
            }
        };
        log::debug!("published {hex}");
        Published {
            selection: Selection { color, hex },
            clipboard_error,
        }
    }

    /// Publish from hex text. Case and a leading `#` are accepted; the
    /// published form is always normalized to lowercase `#rrggbb`.
    pub fn publish_hex(&mut self, hex: &str) -> Result<Published> {
        Ok(self.publish(Color::from_hex(hex)?))
    }
}
