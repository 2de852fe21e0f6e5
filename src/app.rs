use std::path::Path;

use crate::clipboard::Clipboard;
use crate::color::Color;
use crate::image_store::LoadedImage;
use crate::palette::{self, PALETTE_SIZE};
use crate::publisher::{Publisher, Selection};
use crate::sampler::Sampler;

/// Whole application state, owned by the event loop and mutated only
/// through the handlers below. Coordinates are display-image pixels; the
/// terminal layer translates cells before calling in.
pub struct App<C> {
    image: Option<LoadedImage>,
    sampler: Sampler,
    palette: Vec<Color>,
    selection: Option<Selection>,
    status: String,
    publisher: Publisher<C>,
    should_quit: bool,
}

impl<C: Clipboard> App<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            image: None,
            sampler: Sampler::new(),
            palette: Vec::new(),
            selection: None,
            status: String::from("no image loaded (press o to open)"),
            publisher: Publisher::new(clipboard),
            should_quit: false,
        }
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Current palette swatches, dominance order. Empty when no palette is
    /// available.
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The injected clipboard, mostly useful to observers in tests.
    pub fn clipboard(&self) -> &C {
        self.publisher.clipboard()
    }

    /// Hover sample with its color, the input for both overlays. `None`
    /// unless armed with the pointer over a real pixel.
    pub fn hover_sample(&self) -> Option<(u32, u32, Color)> {
        let image = self.image.as_ref()?;
        let (x, y) = self.sampler.hover()?;
        let color = image.sample(x, y).ok()?;
        Some((x, y, color))
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Swap in a new image. On success the sampler disarms and the palette
    /// regenerates; on failure the previous image and palette stay as they
    /// were. The selection persists either way.
    pub fn load_image(&mut self, path: &Path) {
        match LoadedImage::open(path) {
            Ok(image) => {
                log::info!("loaded {}", path.display());
                self.sampler.cancel();
                let (w, h) = image.source_dimensions();
                self.status = format!("loaded {} ({w}x{h})", display_name(path));
                self.regenerate_palette(path);
                self.image = Some(image);
            }
            Err(err) => {
                log::error!("load failed: {err}");
                self.status = err.to_string();
            }
        }
    }

    fn regenerate_palette(&mut self, path: &Path) {
        match palette::extract(path, PALETTE_SIZE) {
            Ok(colors) => self.palette = colors,
            Err(err) => {
                log::error!("palette extraction failed for {}: {err}", path.display());
                self.palette.clear();
                self.status = format!("palette unavailable: {err}");
            }
        }
    }

    /// Start a pick. Needs an image; re-arming is harmless.
    pub fn arm_picker(&mut self) {
        if self.image.is_none() {
            self.status = String::from("no image loaded (press o to open)");
            return;
        }
        self.sampler.arm();
        self.status = String::from("pick a pixel: click or Enter to copy, arrows to nudge, Esc to cancel");
    }

    /// Abort an in-flight pick, keeping selection and palette.
    pub fn cancel_picker(&mut self) {
        if self.sampler.is_armed() {
            self.sampler.cancel();
            self.status = String::from("pick cancelled");
        }
    }

    pub fn pointer_moved(&mut self, x: u32, y: u32) {
        if let Some(image) = &self.image {
            self.sampler.pointer_moved(x, y, image);
        }
    }

    pub fn nudge(&mut self, dx: i32, dy: i32) {
        if let Some(image) = &self.image {
            self.sampler.nudge(dx, dy, image);
        }
    }

    /// Pointer click in display coordinates. Publishes only when an armed
    /// pick lands on a real pixel.
    pub fn click(&mut self, x: u32, y: u32) {
        let Some(image) = &self.image else { return };
        if let Some(color) = self.sampler.click(x, y, image) {
            self.publish(color);
        }
    }

    /// Keyboard confirmation of the current hover sample.
    pub fn confirm(&mut self) {
        let Some(image) = &self.image else { return };
        if let Some(color) = self.sampler.confirm(image) {
            self.publish(color);
        }
    }

    /// Publish palette swatch `idx` (0-based). Works whether or not a pick
    /// is in flight and never disturbs the sampler.
    pub fn select_swatch(&mut self, idx: usize) {
        if let Some(&color) = self.palette.get(idx) {
            self.publish(color);
        }
    }

    fn publish(&mut self, color: Color) {
        let published = self.publisher.publish(color);
        self.status = match &published.clipboard_error {
            None => format!("copied {} to clipboard", published.selection.hex),
            Some(err) => format!(
                "selected {} (clipboard unavailable: {err})",
                published.selection.hex
            ),
        };
        self.selection = Some(published.selection);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
