use image::RgbImage;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::color::Color as AppColor;
use crate::magnifier;
use crate::publisher::Selection;

const HALF_BLOCK: char = '▀';
const OVERLAY_GAP: u16 = 2;

fn to_color(c: &AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: &AppColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

/// Where the display image lands in the terminal grid. Each cell column
/// shows one image column bucket; each cell row shows two image rows, upper
/// half-block over lower. The image is only ever scaled down, never up, and
/// is centered in the area it was fitted to.
///
/// `cell_to_pixel` and `pixel_to_cell` are mutual inverses at cell
/// granularity: any pixel maps to the cell that shows its bucket, and that
/// cell maps back to the bucket's representative pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FittedView {
    cells: Rect,
    image_w: u32,
    image_h: u32,
    shown_w: u32,
    shown_h: u32,
}

impl FittedView {
    pub fn fit(image_w: u32, image_h: u32, area: Rect) -> Option<Self> {
        if image_w == 0 || image_h == 0 || area.width == 0 || area.height == 0 {
            return None;
        }
        let max_w = u32::from(area.width);
        let max_h = u32::from(area.height) * 2;
        let (shown_w, shown_h) = if image_w <= max_w && image_h <= max_h {
            (image_w, image_h)
        } else if u64::from(max_w) * u64::from(image_h) <= u64::from(max_h) * u64::from(image_w) {
            // Width is the binding side.
            let h = (u64::from(image_h) * u64::from(max_w) / u64::from(image_w)) as u32;
            (max_w, h.max(1))
        } else {
            let w = (u64::from(image_w) * u64::from(max_h) / u64::from(image_h)) as u32;
            (w.max(1), max_h)
        };
        let cols = shown_w as u16;
        let rows = shown_h.div_ceil(2) as u16;
        let x = area.x + (area.width - cols) / 2;
        let y = area.y + (area.height - rows) / 2;
        Some(Self {
            cells: Rect::new(x, y, cols, rows),
            image_w,
            image_h,
            shown_w,
            shown_h,
        })
    }

    /// Terminal cells covered by the image.
    pub fn cells(&self) -> Rect {
        self.cells
    }

    /// Shown size in image pixels (columns, pixel rows).
    pub fn shown(&self) -> (u32, u32) {
        (self.shown_w, self.shown_h)
    }

    /// Source pixel rendered at shown coordinate `(u, v)`: the first pixel
    /// of the bucket that shown column/row stands for.
    pub fn source_pixel(&self, u: u32, v: u32) -> (u32, u32) {
        debug_assert!(u < self.shown_w && v < self.shown_h);
        let x = (u64::from(u) * u64::from(self.image_w)).div_ceil(u64::from(self.shown_w));
        let y = (u64::from(v) * u64::from(self.image_h)).div_ceil(u64::from(self.shown_h));
        (x as u32, y as u32)
    }

    /// Display pixel shown in the upper half of the cell, or `None` when
    /// the cell lies outside the fitted image.
    pub fn cell_to_pixel(&self, col: u16, row: u16) -> Option<(u32, u32)> {
        if !self.cells.contains(Position::new(col, row)) {
            return None;
        }
        let u = u32::from(col - self.cells.x);
        let v = u32::from(row - self.cells.y) * 2;
        Some(self.source_pixel(u, v))
    }

    /// Cell showing display pixel `(x, y)`.
    pub fn pixel_to_cell(&self, x: u32, y: u32) -> Option<(u16, u16)> {
        if x >= self.image_w || y >= self.image_h {
            return None;
        }
        let u = (u64::from(x) * u64::from(self.shown_w) / u64::from(self.image_w)) as u16;
        let v = (u64::from(y) * u64::from(self.shown_h) / u64::from(self.image_h)) as u32;
        Some((self.cells.x + u, self.cells.y + (v / 2) as u16))
    }
}

fn render_half_blocks(image: &RgbImage, view: &FittedView, buf: &mut Buffer) {
    let cells = view.cells();
    let (_, shown_h) = view.shown();
    for row in 0..cells.height {
        for col in 0..cells.width {
            let u = u32::from(col);
            let top_v = u32::from(row) * 2;
            let (sx, sy) = view.source_pixel(u, top_v);
            let top = image.get_pixel(sx, sy).0;
            let bottom = if top_v + 1 < shown_h {
                let (sx, sy) = view.source_pixel(u, top_v + 1);
                Some(image.get_pixel(sx, sy).0)
            } else {
                None
            };
            if let Some(cell) = buf.cell_mut((cells.x + col, cells.y + row)) {
                cell.set_char(HALF_BLOCK);
                cell.set_fg(Color::Rgb(top[0], top[1], top[2]));
                cell.set_bg(match bottom {
                    Some([r, g, b]) => Color::Rgb(r, g, b),
                    None => Color::Reset,
                });
            }
        }
    }
}

/// The display image as half-block cells, fitted and centered beforehand.
pub struct ImageCanvas<'a> {
    image: &'a RgbImage,
    view: FittedView,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a RgbImage, view: FittedView) -> Self {
        Self { image, view }
    }
}

impl Widget for ImageCanvas<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        render_half_blocks(self.image, &self.view, buf);
    }
}

/// Floating magnifier: the crosshair patch from [`magnifier::magnify`] with
/// a one-row indicator strip underneath showing the hover color and hex.
pub struct MagnifierWidget<'a> {
    patch: &'a RgbImage,
    color: AppColor,
}

impl<'a> MagnifierWidget<'a> {
    /// Overlay footprint in cells: the patch as half-blocks plus the strip.
    pub const CELL_SIZE: (u16, u16) =
        (magnifier::SIZE as u16, (magnifier::SIZE as u16).div_ceil(2) + 1);

    pub fn new(patch: &'a RgbImage, color: AppColor) -> Self {
        Self { patch, color }
    }
}

impl Widget for MagnifierWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let patch_area = Rect {
            height: area.height - 1,
            ..area
        };
        if let Some(view) = FittedView::fit(self.patch.width(), self.patch.height(), patch_area) {
            render_half_blocks(self.patch, &view, buf);
        }
        let strip = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
        let line = Line::from(vec![
            Span::styled("    ", Style::default().bg(to_color(&self.color))),
            Span::raw(format!(" {}", self.color.to_hex())),
        ]);
        Paragraph::new(line).render(strip, buf);
    }
}

/// Place an overlay beside a cursor cell: right of and below it when that
/// fits in `frame`, flipped to the other side when it does not.
pub fn anchor_overlay(cursor: (u16, u16), size: (u16, u16), frame: Rect) -> Rect {
    let (w, h) = size;
    let x = if cursor.0.saturating_add(OVERLAY_GAP + w) <= frame.right() {
        cursor.0 + OVERLAY_GAP
    } else {
        cursor.0.saturating_sub(OVERLAY_GAP + w).max(frame.x)
    };
    let y = if cursor.1.saturating_add(1 + h) <= frame.bottom() {
        cursor.1 + 1
    } else {
        cursor.1.saturating_sub(1 + h).max(frame.y)
    };
    Rect::new(x, y, w, h).intersection(frame)
}

/// Current selection: a color chip over its hex string.
pub struct SelectionPanel<'a> {
    selection: Option<&'a Selection>,
}

impl<'a> SelectionPanel<'a> {
    pub fn new(selection: Option<&'a Selection>) -> Self {
        Self { selection }
    }
}

impl Widget for SelectionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Selection");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = match self.selection {
            Some(sel) => vec![
                Line::from(Span::styled(
                    " ".repeat(inner.width as usize),
                    Style::default().bg(to_color(&sel.color)),
                )),
                Line::from(format!(" {}", sel.hex)),
            ],
            None => vec![Line::from(Span::styled(
                " nothing picked yet",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        Paragraph::new(lines).render(inner, buf);
    }
}

/// The palette swatches as a vertical stack, dominance order top to bottom,
/// each labelled with its key and hex.
pub struct PaletteWidget<'a> {
    colors: &'a [AppColor],
}

impl<'a> PaletteWidget<'a> {
    pub fn new(colors: &'a [AppColor]) -> Self {
        Self { colors }
    }
}

impl Widget for PaletteWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Palette");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.colors.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " no palette",
                Style::default().fg(Color::DarkGray),
            )))
            .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .colors
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Line::from(vec![
                    Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("{:^9}", c.to_hex()),
                        Style::default().bg(to_color(c)).fg(contrast_fg(c)),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

/// One single-row hit rect per swatch, matching [`PaletteWidget`] geometry.
pub fn swatch_rows(area: Rect, count: usize) -> Vec<Rect> {
    let inner = area.inner(Margin::new(1, 1));
    (0..count.min(inner.height as usize))
        .map(|i| Rect::new(inner.x, inner.y + i as u16, inner.width, 1))
        .collect()
}
