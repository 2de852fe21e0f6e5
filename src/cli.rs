use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

/// Pick pixel colors from an image and copy them as hex codes.
#[derive(Parser, Debug)]
#[command(name = "pipette", version, about)]
pub struct Args {
    /// Path to the image to open
    pub image: Option<PathBuf>,

    /// Print the extracted palette and exit instead of launching the picker
    #[arg(long, requires = "image", conflicts_with = "sample")]
    pub palette: bool,

    /// Print the color at display pixel X,Y and exit
    #[arg(long, value_name = "X,Y", requires = "image")]
    pub sample: Option<SamplePoint>,
}

/// Pixel position parsed from an `X,Y` command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePoint {
    pub x: u32,
    pub y: u32,
}

impl FromStr for SamplePoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| format!("invalid x coordinate {:?}", x.trim()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| format!("invalid y coordinate {:?}", y.trim()))?;
        Ok(SamplePoint { x, y })
    }
}
