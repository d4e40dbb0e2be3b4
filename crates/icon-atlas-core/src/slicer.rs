use crate::compositing::region_is_transparent;
use crate::error::Result;
use crate::grid::grid_rects;
use crate::model::{Border, IdentityMap, Pivot, SliceRect, SpriteAlignment};
use crate::store::ImageAssetStore;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// Grid slicing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOptions {
    pub cell_edge: u32,
    pub offset: (u32, u32),
    pub padding: (u32, u32),
    pub alignment: SpriteAlignment,
    pub pivot: Pivot,
}

impl SliceOptions {
    /// Cells anchored top-left with pivot `(0, 1)`, no offset or padding.
    pub fn icons(cell_edge: u32) -> Self {
        Self {
            cell_edge,
            offset: (0, 0),
            padding: (0, 0),
            alignment: SpriteAlignment::TopLeft,
            pivot: Pivot::new(0.0, 1.0),
        }
    }
}

/// The persisted atlas at its true source resolution.
///
/// The imported texture may have been clamped by its max import size; it is scaled
/// back up to the dimensions of the stored file using the asset's filter mode.
pub fn texture_to_slice<S: ImageAssetStore + ?Sized>(
    store: &S,
    atlas_path: &Path,
) -> Result<RgbaImage> {
    let (width, height) = store.source_dimensions(atlas_path)?;
    let imported = store.load_texture(atlas_path)?;
    if imported.dimensions() == (width, height) {
        return Ok(imported);
    }
    let filter = store.import_settings(atlas_path)?.filter_mode;
    debug!(
        from_w = imported.width(),
        from_h = imported.height(),
        width,
        height,
        ?filter,
        "upscaling imported atlas to source size"
    );
    Ok(image::imageops::resize(
        &imported,
        width,
        height,
        filter.filter_type(),
    ))
}

#[instrument(skip_all, fields(atlas = ?atlas_path, cell_edge = options.cell_edge))]
/// Re-partitions the persisted atlas into cells and names them from `identity`.
///
/// Always yields one slice per grid cell. A cell without an identity entry is named
/// `Error{index}` and logged; slicing carries on.
pub fn slice<S: ImageAssetStore + ?Sized>(
    store: &S,
    atlas_path: &Path,
    options: &SliceOptions,
    identity: &IdentityMap,
) -> Result<Vec<SliceRect>> {
    let texture = texture_to_slice(store, atlas_path)?;
    let (width, height) = texture.dimensions();
    let rects = grid_rects(
        width,
        height,
        options.offset,
        options.cell_edge,
        options.padding,
    );

    let mut missing = 0usize;
    let mut empty = 0usize;
    let mut slices = Vec::with_capacity(rects.len());
    for (index, rect) in rects.into_iter().enumerate() {
        let name = match identity.get(index) {
            Some(n) => n.to_string(),
            None => {
                error!(index, "no icon name recorded for cell");
                missing += 1;
                format!("Error{index}")
            }
        };
        if region_is_transparent(&texture, rect) {
            empty += 1;
        }
        slices.push(SliceRect {
            rect,
            name,
            alignment: options.alignment,
            pivot: options.pivot,
            border: Border::ZERO,
            sprite_id: new_sprite_id(),
        });
    }

    info!(
        slices = slices.len(),
        missing, empty, width, height, "atlas sliced"
    );
    Ok(slices)
}

/// 32 lowercase hex digits, random per call.
pub fn new_sprite_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
