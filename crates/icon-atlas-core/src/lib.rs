//! Core library for building inline-icon atlases.
//!
//! - Packing: icons go into a square power-of-two grid of fixed-size cells, row-major from the top-left
//! - Slicing: the persisted atlas is re-partitioned into the same cells and the icon names are re-attached
//! - Glyphs: a glyph table is compiled from the slices and given a fixed scale and baseline
//! - Collaborators (asset store, platform texture policy, sprite table, glyph compiler) are traits with
//!   file-system backed implementations.
//!
//! Quick example:
//! ```ignore
//! use icon_atlas_core::{IconAtlasTools, ToolConfig};
//! # fn main() -> anyhow::Result<()> {
//! let mut tools = IconAtlasTools::open("my-project", ToolConfig::default())?;
//! let report = tools.generate()?;
//! println!("{} slices -> {:?}", report.slices, report.glyph_asset);
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod encoder;
pub mod error;
pub mod fallback;
pub mod glyph;
pub mod grid;
pub mod loader;
pub mod metadata;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod platform;
pub mod scope;
pub mod slicer;
pub mod store;

pub use config::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `icon_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{ToolConfig, ToolConfigBuilder};
    pub use crate::encoder::{encode, EncodeReport, ImportScope};
    pub use crate::fallback::FallbackSettings;
    pub use crate::glyph::{
        adjust, glyph_asset_path, GlyphAssetCompiler, GlyphEntry, GlyphMetrics, GlyphTable,
        JsonGlyphCompiler,
    };
    pub use crate::grid::{grid_rects, AtlasGrid};
    pub use crate::loader::{collect_icon_paths, load_icon_set};
    pub use crate::metadata::apply;
    pub use crate::model::{
        AtlasImage, Border, IconImage, IdentityMap, Pivot, Rect, SliceRect, SpriteAlignment,
    };
    pub use crate::packer::pack;
    pub use crate::platform::{
        DefaultPlatformPolicy, PlatformTexturePolicy, PlatformTextureSettings, TextureFormat,
    };
    pub use crate::slicer::{slice, SliceOptions};
    pub use crate::store::{
        FilterMode, FsAssetStore, ImageAssetStore, ImportSettings, SpriteMetadataSink,
        SpriteMode, SpriteRecord, TextureType,
    };
    pub use crate::{CombineOutput, GenerateReport, IconAtlasError, IconAtlasTools};
}
