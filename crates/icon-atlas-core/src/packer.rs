use crate::compositing::blit_cell;
use crate::error::{IconAtlasError, Result};
use crate::grid::AtlasGrid;
use crate::model::{AtlasImage, IconImage, IdentityMap};
use image::RgbaImage;
use tracing::{debug, error, info, instrument};

#[instrument(skip_all, fields(icons = icons.len(), cell_edge = cell_edge))]
/// Packs `icons` into a transparent square atlas, one `cell_edge` cell per icon.
///
/// Notes:
/// - Icon `i` lands in cell `i`: row-major, top row first, leftmost column first.
/// - Unreadable icons keep their cell and their name; only the pixel copy is skipped,
///   leaving a blank but named cell.
/// - Readable icons are copied verbatim (clipped to the cell), never resampled.
pub fn pack(icons: &[IconImage], cell_edge: u32) -> Result<(AtlasImage, IdentityMap)> {
    if icons.is_empty() {
        return Err(IconAtlasError::Empty);
    }
    let grid = AtlasGrid::for_count(icons.len(), cell_edge)?;
    let mut canvas = RgbaImage::new(grid.edge, grid.edge);
    let mut identity = IdentityMap::new();
    let mut unreadable = 0usize;

    for (index, icon) in icons.iter().enumerate() {
        identity.insert(index, icon.name.clone());
        let Some(cell) = grid.cell_rect(index) else {
            // for_count guarantees enough cells
            return Err(IconAtlasError::InvalidInput(format!(
                "cell {index} outside {}x{} grid",
                grid.columns, grid.rows
            )));
        };
        let Some(pixels) = &icon.pixels else {
            error!(name = %icon.name, path = ?icon.path, index, "icon is not readable; cell left blank");
            unreadable += 1;
            continue;
        };
        if pixels.dimensions() != (cell_edge, cell_edge) {
            debug!(
                name = %icon.name,
                w = pixels.width(),
                h = pixels.height(),
                cell_edge,
                "icon size differs from cell size"
            );
        }
        blit_cell(pixels, &mut canvas, cell);
    }

    info!(
        icons = icons.len(),
        unreadable,
        columns = grid.columns,
        edge = grid.edge,
        "atlas packed"
    );
    Ok((
        AtlasImage {
            grid,
            pixels: canvas,
        },
        identity,
    ))
}
