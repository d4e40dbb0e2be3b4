use crate::error::{IconAtlasError, Result};
use crate::model::Rect;
use serde::{Deserialize, Serialize};

/// Square grid of fixed-size cells backing one atlas.
///
/// `columns == rows` and both are a power of two, so `edge` is a power of two
/// whenever `cell_edge` is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasGrid {
    pub cell_edge: u32,
    pub columns: u32,
    pub rows: u32,
    pub edge: u32,
}

impl AtlasGrid {
    /// Smallest power-of-two square grid holding `count` cells of `cell_edge` pixels.
    pub fn for_count(count: usize, cell_edge: u32) -> Result<Self> {
        if count == 0 {
            return Err(IconAtlasError::Empty);
        }
        if cell_edge == 0 {
            return Err(IconAtlasError::InvalidInput("cell edge must be non-zero".into()));
        }
        let count = u32::try_from(count)
            .map_err(|_| IconAtlasError::InvalidInput(format!("too many icons: {count}")))?;
        let columns = next_pow2(ceil_sqrt(count));
        let edge = columns.checked_mul(cell_edge).ok_or_else(|| {
            IconAtlasError::InvalidInput(format!(
                "atlas edge overflows: {columns} columns of {cell_edge}px"
            ))
        })?;
        Ok(Self {
            cell_edge,
            columns,
            rows: columns,
            edge,
        })
    }

    pub fn cell_count(&self) -> usize {
        (self.columns as usize) * (self.rows as usize)
    }

    /// Rectangle of cell `index`: row-major, top row first, leftmost column first.
    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        if index >= self.cell_count() {
            return None;
        }
        let col = (index % self.columns as usize) as u32;
        let row = (index / self.columns as usize) as u32;
        Some(Rect::new(
            col * self.cell_edge,
            row * self.cell_edge,
            self.cell_edge,
            self.cell_edge,
        ))
    }
}

/// Partition a `width x height` surface into `size x size` cells.
///
/// Cells start at `offset`, are separated by `padding`, and are returned row-major
/// with the top row first. Partial cells at the right/bottom edges are dropped;
/// empty (fully transparent) cells are kept. Offsets or paddings that push a cell
/// past `u32::MAX` end the row (or the grid) instead of wrapping.
pub fn grid_rects(
    width: u32,
    height: u32,
    offset: (u32, u32),
    size: u32,
    padding: (u32, u32),
) -> Vec<Rect> {
    let mut out = Vec::new();
    if size == 0 {
        return out;
    }
    let fits = |start: u32, limit: u32| start.checked_add(size).is_some_and(|end| end <= limit);
    let mut y = offset.1;
    while fits(y, height) {
        let mut x = offset.0;
        while fits(x, width) {
            out.push(Rect::new(x, y, size, size));
            match x.checked_add(size).and_then(|v| v.checked_add(padding.0)) {
                Some(next) => x = next,
                None => break,
            }
        }
        match y.checked_add(size).and_then(|v| v.checked_add(padding.1)) {
            Some(next) => y = next,
            None => break,
        }
    }
    out
}

pub fn next_pow2(mut v: u32) -> u32 {
    if v <= 1 {
        return 1;
    }
    v -= 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v + 1
}

/// `ceil(sqrt(n))` without going through floating point.
pub fn ceil_sqrt(n: u32) -> u32 {
    if n <= 1 {
        return n;
    }
    let n = n as u64;
    let mut r = (n as f64).sqrt() as u64;
    // fix up float rounding in either direction
    while r * r > n {
        r -= 1;
    }
    while r * r < n {
        r += 1;
    }
    r as u32
}
