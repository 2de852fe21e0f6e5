pub mod app;
pub mod cli;
pub mod clipboard;
pub mod color;
pub mod image_store;
pub mod magnifier;
pub mod palette;
pub mod publisher;
pub mod sampler;
pub mod tui;
