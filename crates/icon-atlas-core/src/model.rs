use crate::grid::AtlasGrid;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Mirrors the rectangle vertically inside a surface of height `surface_h`.
    ///
    /// Converts between top-left and bottom-left origin conventions; applying it twice
    /// yields the original rectangle.
    pub fn flip_y(&self, surface_h: u32) -> Rect {
        Rect::new(self.x, surface_h.saturating_sub(self.y + self.h), self.w, self.h)
    }
}

/// One source icon as seen by the packer.
///
/// `pixels` is `None` when the asset store refused to expose the pixel data
/// (the icon is not readable). Unreadable icons still take part in packing.
#[derive(Debug, Clone)]
pub struct IconImage {
    pub name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Option<RgbaImage>,
}

impl IconImage {
    /// A readable icon backed by decoded pixels.
    pub fn readable(name: impl Into<String>, path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            name: name.into(),
            path: path.into(),
            width,
            height,
            pixels: Some(pixels),
        }
    }

    /// An icon whose pixels cannot be read; only its name and size are known.
    pub fn unreadable(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            width,
            height,
            pixels: None,
        }
    }

    pub fn is_readable(&self) -> bool {
        self.pixels.is_some()
    }
}

/// Packed atlas surface together with the grid it was laid out on.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    pub grid: AtlasGrid,
    pub pixels: RgbaImage,
}

impl AtlasImage {
    pub fn edge(&self) -> u32 {
        self.grid.edge
    }

    /// True if any pixel is not fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.pixels.pixels().any(|p| p[3] < u8::MAX)
    }
}

/// Cell index to icon name, in loader order.
///
/// Produced by [`crate::packer::pack`] and consumed by [`crate::slicer::slice`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityMap {
    names: BTreeMap<usize, String>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, index: usize, name: impl Into<String>) {
        self.names.insert(index, name.into());
    }
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(|(i, n)| (*i, n.as_str()))
    }
}

impl FromIterator<(usize, String)> for IdentityMap {
    fn from_iter<T: IntoIterator<Item = (usize, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Sprite anchor presets understood by the host sprite table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpriteAlignment {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    RightCenter,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Custom,
}

impl SpriteAlignment {
    /// Integer code stored in sprite records.
    pub fn code(self) -> i32 {
        match self {
            Self::Center => 0,
            Self::TopLeft => 1,
            Self::TopCenter => 2,
            Self::TopRight => 3,
            Self::LeftCenter => 4,
            Self::RightCenter => 5,
            Self::BottomLeft => 6,
            Self::BottomCenter => 7,
            Self::BottomRight => 8,
            Self::Custom => 9,
        }
    }

    /// Inverse of [`SpriteAlignment::code`]; unknown codes map to `Custom`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Center,
            1 => Self::TopLeft,
            2 => Self::TopCenter,
            3 => Self::TopRight,
            4 => Self::LeftCenter,
            5 => Self::RightCenter,
            6 => Self::BottomLeft,
            7 => Self::BottomCenter,
            8 => Self::BottomRight,
            _ => Self::Custom,
        }
    }
}

/// Pivot as a fraction of the sprite size, bottom-left origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Pivot {
    pub x: f32,
    pub y: f32,
}

impl Pivot {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Four-sided inset (left, bottom, right, top).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Border {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Border {
    pub const ZERO: Border = Border {
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
        top: 0.0,
    };
}

/// A named region of the atlas, one per grid cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SliceRect {
    /// Cell rectangle, top-left origin.
    pub rect: Rect,
    pub name: String,
    pub alignment: SpriteAlignment,
    pub pivot: Pivot,
    pub border: Border,
    pub sprite_id: String,
}
