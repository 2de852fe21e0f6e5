use crate::color::Color;
use crate::image_store::LoadedImage;

/// Whether pointer movement and clicks are currently sampling pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PickerState {
    #[default]
    Idle,
    Armed,
}

/// One-shot pixel picker. Arming turns pointer motion into live hover
/// samples; a confirmed pick reports the color and returns to [`PickerState::Idle`].
/// All coordinates are display-image pixels.
#[derive(Debug, Default)]
pub struct Sampler {
    state: PickerState,
    hover: Option<(u32, u32)>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == PickerState::Armed
    }

    /// Current sample point, if the pointer has entered the image since arming.
    pub fn hover(&self) -> Option<(u32, u32)> {
        self.hover
    }

    /// Start sampling. Arming while already armed changes nothing.
    pub fn arm(&mut self) {
        self.state = PickerState::Armed;
    }

    /// Stop sampling without picking.
    pub fn cancel(&mut self) {
        self.state = PickerState::Idle;
        self.hover = None;
    }

    /// Track the pointer. Points outside the image keep the previous hover
    /// so the preview never shows a pixel that does not exist.
    pub fn pointer_moved(&mut self, x: u32, y: u32, image: &LoadedImage) {
        if !self.is_armed() {
            return;
        }
        if image.in_bounds(x, y) {
            self.hover = Some((x, y));
        } else {
            log::debug!("ignoring out-of-bounds motion to ({x}, {y})");
        }
    }

    /// Move the sample point one pixel at a time, clamped to the image.
    /// The first nudge after arming seeds the point at the image center.
    pub fn nudge(&mut self, dx: i32, dy: i32, image: &LoadedImage) {
        if !self.is_armed() {
            return;
        }
        match self.hover {
            None => {
                self.hover = Some((image.width() / 2, image.height() / 2));
            }
            Some((hx, hy)) => {
                let nx = (i64::from(hx) + i64::from(dx)).clamp(0, i64::from(image.width()) - 1);
                let ny = (i64::from(hy) + i64::from(dy)).clamp(0, i64::from(image.height()) - 1);
                self.hover = Some((nx as u32, ny as u32));
            }
        }
    }

    /// Pick the pixel under the pointer. Only an armed picker over a real
    /// pixel produces a color; clicks outside the image are ignored rather
    /// than sampling garbage. A successful pick disarms.
    pub fn click(&mut self, x: u32, y: u32, image: &LoadedImage) -> Option<Color> {
        if !self.is_armed() {
            return None;
        }
        let color = match image.sample(x, y) {
            Ok(color) => color,
            Err(err) => {
                log::debug!("ignoring click: {err}");
                return None;
            }
        };
        self.state = PickerState::Idle;
        self.hover = None;
        Some(color)
    }

    /// Pick at the current hover point (keyboard confirmation). Same
    /// semantics as [`Self::click`].
    pub fn confirm(&mut self, image: &LoadedImage) -> Option<Color> {
        let (x, y) = self.hover?;
        self.click(x, y, image)
    }
}
