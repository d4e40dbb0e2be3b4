//! Glyph tables built from atlas slices, and the fixed inline layout policy.

use crate::error::Result;
use crate::model::{Rect, SliceRect};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Code point assigned to sprite characters that have no natural mapping.
pub const UNASSIGNED_UNICODE: u32 = 0xFFFE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
    pub horizontal_bearing_x: f32,
    pub horizontal_bearing_y: f32,
    pub horizontal_advance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlyphEntry {
    pub index: u32,
    /// Name of the slice this glyph was built from.
    pub name: String,
    pub rect: Rect,
    pub metrics: GlyphMetrics,
    pub scale: f32,
    pub atlas_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpriteCharacter {
    pub name: String,
    pub unicode: u32,
    pub glyph_index: u32,
    pub scale: f32,
}

/// Compiled glyph asset for one atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlyphTable {
    pub name: String,
    pub atlas: PathBuf,
    pub glyphs: Vec<GlyphEntry>,
    pub characters: Vec<SpriteCharacter>,
}

impl GlyphTable {
    /// One glyph and one character per slice, in slice order.
    pub fn from_slices(name: impl Into<String>, atlas: &Path, slices: &[SliceRect]) -> Self {
        let mut glyphs = Vec::with_capacity(slices.len());
        let mut characters = Vec::with_capacity(slices.len());
        for (i, s) in slices.iter().enumerate() {
            let index = i as u32;
            let w = s.rect.w as f32;
            let h = s.rect.h as f32;
            glyphs.push(GlyphEntry {
                index,
                name: s.name.clone(),
                rect: s.rect,
                metrics: GlyphMetrics {
                    width: w,
                    height: h,
                    horizontal_bearing_x: -s.pivot.x * w,
                    horizontal_bearing_y: h - s.pivot.y * h,
                    horizontal_advance: w,
                },
                scale: 1.0,
                atlas_index: 0,
            });
            characters.push(SpriteCharacter {
                name: s.name.clone(),
                unicode: UNASSIGNED_UNICODE,
                glyph_index: index,
                scale: 1.0,
            });
        }
        Self {
            name: name.into(),
            atlas: atlas.to_path_buf(),
            glyphs,
            characters,
        }
    }
}

/// Overwrites `scale` and `horizontal_bearing_y` on every glyph.
///
/// The table keeps its length; entries are only mutated.
pub fn adjust(glyphs: &mut [GlyphEntry], scale: f32, bearing_y: f32) {
    for g in glyphs.iter_mut() {
        g.scale = scale;
        g.metrics.horizontal_bearing_y = bearing_y;
    }
}

/// `dir/<stem>.png` -> `dir/<stem>.asset`
pub fn glyph_asset_path(atlas_path: &Path) -> PathBuf {
    atlas_path.with_extension("asset")
}

/// Builds and stores glyph assets.
///
/// The atlas is passed explicitly; implementations must not depend on ambient
/// selection state.
pub trait GlyphAssetCompiler {
    fn compile(&mut self, atlas_path: &Path, slices: &[SliceRect], asset_path: &Path)
    -> Result<()>;
    /// `Ok(None)` when there is no asset at `asset_path`.
    fn load(&self, asset_path: &Path) -> Result<Option<GlyphTable>>;
    fn save(&mut self, asset_path: &Path, table: &GlyphTable) -> Result<()>;
    /// Removes the asset if present.
    fn delete(&mut self, asset_path: &Path) -> Result<()>;
}

/// Stores glyph tables as pretty JSON under a project root.
#[derive(Debug, Clone)]
pub struct JsonGlyphCompiler {
    root: PathBuf,
}

impl JsonGlyphCompiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl GlyphAssetCompiler for JsonGlyphCompiler {
    #[instrument(skip_all, fields(asset = ?asset_path))]
    fn compile(
        &mut self,
        atlas_path: &Path,
        slices: &[SliceRect],
        asset_path: &Path,
    ) -> Result<()> {
        let name = asset_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let table = GlyphTable::from_slices(name, atlas_path, slices);
        self.save(asset_path, &table)?;
        info!(glyphs = table.glyphs.len(), "glyph asset compiled");
        Ok(())
    }

    fn load(&self, asset_path: &Path) -> Result<Option<GlyphTable>> {
        let full = self.resolve(asset_path);
        if !full.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&full)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, asset_path: &Path, table: &GlyphTable) -> Result<()> {
        let full = self.resolve(asset_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, serde_json::to_string_pretty(table)?)?;
        Ok(())
    }

    fn delete(&mut self, asset_path: &Path) -> Result<()> {
        let full = self.resolve(asset_path);
        if full.is_file() {
            fs::remove_file(&full)?;
            debug!(asset = ?asset_path, "previous glyph asset removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Border, Pivot, SpriteAlignment};

    fn slice(name: &str, x: u32) -> SliceRect {
        SliceRect {
            rect: Rect::new(x, 0, 32, 32),
            name: name.into(),
            alignment: SpriteAlignment::TopLeft,
            pivot: Pivot::new(0.0, 1.0),
            border: Border::ZERO,
            sprite_id: String::new(),
        }
    }

    #[test]
    fn top_left_pivot_gives_zero_bearings() {
        let t = GlyphTable::from_slices("t", Path::new("t.png"), &[slice("a", 0), slice("b", 32)]);
        assert_eq!(t.glyphs.len(), 2);
        assert_eq!(t.characters[1].glyph_index, 1);
        assert_eq!(t.characters[1].unicode, UNASSIGNED_UNICODE);
        let m = t.glyphs[0].metrics;
        assert_eq!(m.horizontal_bearing_x, 0.0);
        assert_eq!(m.horizontal_bearing_y, 0.0);
        assert_eq!(m.horizontal_advance, 32.0);
    }

    #[test]
    fn asset_path_replaces_extension() {
        assert_eq!(
            glyph_asset_path(Path::new("Assets/TMPIcon/TMPIcon.png")),
            PathBuf::from("Assets/TMPIcon/TMPIcon.asset")
        );
    }
}
