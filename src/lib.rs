#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use error::LayoutError;
pub use ir::{Dimensions, LayoutInput, load_input};
pub use layout::{Scene, compute_scene};
pub use render::render_svg;
