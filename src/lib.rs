mod cluster;
mod color;
mod error;
mod image;
mod options;
mod ord_float;
mod palette;
mod quantize;
mod stats;

#[cfg(feature = "capi")]
mod capi;

pub use cluster::{ClusterNode, ClusterTree, NodeId, ROOT};
pub use color::Color;
pub use error::Error;
pub use image::{Image, PixelFormat};
pub use options::Options;
pub use palette::{Palette, PaletteOrder, SwatchStrip};
pub use quantize::{QuantizeResult, extract_palette};
pub use stats::{ClusterStats, Moments, PrincipalAxis};
