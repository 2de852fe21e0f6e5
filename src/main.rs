use std::path::Path;

use anyhow::Result;
use clap::Parser;

use pipette::app::App;
use pipette::cli::{Args, SamplePoint};
use pipette::clipboard::SystemClipboard;
use pipette::image_store::LoadedImage;
use pipette::palette;
use pipette::tui;

fn main() -> Result<()> {
    // Logging is opt-in via RUST_LOG; unsolicited stderr output would tear
    // up the alternate screen while the picker is running.
    env_logger::init();

    let args = Args::parse();

    if let Some(path) = &args.image {
        if args.palette {
            return print_palette(path);
        }
        if let Some(point) = args.sample {
            return print_sample(path, point);
        }
    }

    let mut app = App::new(SystemClipboard::new());
    if let Some(path) = &args.image {
        app.load_image(path);
    }
    tui::run(&mut app)
}

/// Headless mode: print the extracted palette, one hex value per line.
fn print_palette(path: &Path) -> Result<()> {
    let colors = palette::extract(path, palette::PALETTE_SIZE)?;
    for color in colors {
        println!("{}", color.to_hex());
    }
    Ok(())
}

/// Headless mode: print the color of one display pixel.
fn print_sample(path: &Path, point: SamplePoint) -> Result<()> {
    let image = LoadedImage::open(path)?;
    let color = image.sample(point.x, point.y)?;
    println!("{}", color.to_hex());
    Ok(())
}
