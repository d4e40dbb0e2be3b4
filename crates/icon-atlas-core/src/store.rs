//! Asset store collaborators and their file-system implementation.
//!
//! - [`ImageAssetStore`]: pixel I/O, per-asset import settings, true source dimensions
//! - [`SpriteMetadataSink`]: the persisted sprite table of an atlas
//! - [`FsAssetStore`]: both of the above over a project directory, with import settings
//!   kept in a JSON `<asset>.meta` side-car next to each image

use crate::error::{IconAtlasError, Result};
use crate::model::{Border, IconImage, Pivot, Rect};
use crate::platform::PlatformTextureSettings;
use image::imageops::FilterType;
use image::{ImageFormat, ImageReader, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sampling used when the host resizes a texture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Point,
    #[default]
    Bilinear,
    Trilinear,
}

impl FilterMode {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Point => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
            Self::Trilinear => FilterType::CatmullRom,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextureType {
    #[default]
    Default,
    Sprite,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpriteMode {
    #[default]
    Single,
    Multiple,
}

/// One row of an atlas' persisted sprite table. `rect` is bottom-left origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpriteRecord {
    pub name: String,
    pub rect: Rect,
    pub border: Border,
    pub alignment: i32,
    pub pivot: Pivot,
    pub tessellation_detail: f32,
    pub sprite_id: String,
}

/// Import settings of one image asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportSettings {
    pub readable: bool,
    pub max_size: u32,
    pub filter_mode: FilterMode,
    pub texture_type: TextureType,
    pub sprite_mode: SpriteMode,
    pub platform_overrides: Vec<PlatformTextureSettings>,
    pub sprites: Vec<SpriteRecord>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            readable: false,
            max_size: 2048,
            filter_mode: FilterMode::default(),
            texture_type: TextureType::default(),
            sprite_mode: SpriteMode::default(),
            platform_overrides: Vec::new(),
            sprites: Vec::new(),
        }
    }
}

/// Image storage, import settings and import of image assets.
pub trait ImageAssetStore {
    fn exists(&self, path: &Path) -> bool;
    fn import_settings(&self, path: &Path) -> Result<ImportSettings>;
    fn set_import_settings(&mut self, path: &Path, settings: ImportSettings) -> Result<()>;
    /// Re-run import so later reads observe the current settings.
    fn reimport(&mut self, path: &Path) -> Result<()>;
    /// Texture as imported: clamped to the asset's `max_size`.
    fn load_texture(&self, path: &Path) -> Result<RgbaImage>;
    /// Pixel dimensions of the stored source file, before any import clamp.
    fn source_dimensions(&self, path: &Path) -> Result<(u32, u32)>;
    /// Encode `pixels` as PNG at `path`, creating parent directories.
    fn write_png(&mut self, path: &Path, pixels: &RgbaImage) -> Result<()>;

    /// Resolve `path` into an [`IconImage`].
    ///
    /// `Ok(None)` when no asset exists at `path`. Icons whose import settings are not
    /// readable, or whose pixels fail to decode, come back with `pixels == None`.
    fn load_icon(&self, path: &Path) -> Result<Option<IconImage>> {
        if !self.exists(path) {
            return Ok(None);
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let settings = self.import_settings(path)?;
        if settings.readable {
            match self.load_texture(path) {
                Ok(pixels) => return Ok(Some(IconImage::readable(name, path, pixels))),
                Err(e) => debug!(?path, error = %e, "icon pixels could not be decoded"),
            }
        }
        let (w, h) = match self.source_dimensions(path) {
            Ok(dims) => dims,
            Err(e) => {
                debug!(?path, error = %e, "icon dimensions could not be read");
                (0, 0)
            }
        };
        Ok(Some(IconImage::unreadable(name, path, w, h)))
    }
}

/// Persisted sprite table of an atlas asset.
pub trait SpriteMetadataSink {
    fn set_sprite_mode(&mut self, path: &Path, mode: SpriteMode) -> Result<()>;
    fn clear_sprites(&mut self, path: &Path) -> Result<()>;
    fn insert_sprite(&mut self, path: &Path, index: usize, record: SpriteRecord) -> Result<()>;
    fn sprites(&self, path: &Path) -> Result<Vec<SpriteRecord>>;
    /// Replaces the whole table with `records`, in order.
    fn replace_sprites(&mut self, path: &Path, records: Vec<SpriteRecord>) -> Result<()> {
        self.clear_sprites(path)?;
        for (i, record) in records.into_iter().enumerate() {
            self.insert_sprite(path, i, record)?;
        }
        Ok(())
    }
    /// Host preference that prompts before assets are written back.
    fn verify_saving_assets(&self) -> bool;
    fn set_verify_saving_assets(&mut self, enabled: bool);
    /// Rewrite the asset's persisted metadata in canonical form.
    fn reserialize(&mut self, path: &Path) -> Result<()>;
}

/// Asset store over a project directory.
///
/// Relative asset paths resolve against `root`. Import settings live in
/// `<asset>.meta` as pretty JSON; a missing side-car means default settings.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
    verify_saving_assets: bool,
    verification_prompts: usize,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verify_saving_assets: false,
            verification_prompts: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn meta_path(&self, path: &Path) -> PathBuf {
        let mut full = self.resolve(path).into_os_string();
        full.push(".meta");
        PathBuf::from(full)
    }

    /// Reserializations performed while the verification preference was on.
    pub fn verification_prompts(&self) -> usize {
        self.verification_prompts
    }

    fn write_settings(&self, path: &Path, settings: &ImportSettings) -> Result<()> {
        let meta = self.meta_path(path);
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&meta, json)?;
        Ok(())
    }

    fn update_settings(
        &mut self,
        path: &Path,
        f: impl FnOnce(&mut ImportSettings),
    ) -> Result<()> {
        let mut settings = self.import_settings(path)?;
        f(&mut settings);
        self.write_settings(path, &settings)
    }
}

impl ImageAssetStore for FsAssetStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn import_settings(&self, path: &Path) -> Result<ImportSettings> {
        if !self.exists(path) {
            return Err(IconAtlasError::MissingAsset(path.to_path_buf()));
        }
        let meta = self.meta_path(path);
        if !meta.is_file() {
            return Ok(ImportSettings::default());
        }
        let text = fs::read_to_string(&meta)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn set_import_settings(&mut self, path: &Path, settings: ImportSettings) -> Result<()> {
        if !self.exists(path) {
            return Err(IconAtlasError::MissingAsset(path.to_path_buf()));
        }
        self.write_settings(path, &settings)
    }

    fn reimport(&mut self, path: &Path) -> Result<()> {
        let settings = self.import_settings(path)?;
        // importing materializes the side-car for assets that never had one
        if !self.meta_path(path).is_file() {
            self.write_settings(path, &settings)?;
        }
        debug!(?path, readable = settings.readable, max_size = settings.max_size, "reimported");
        Ok(())
    }

    fn load_texture(&self, path: &Path) -> Result<RgbaImage> {
        let settings = self.import_settings(path)?;
        let full = self.resolve(path);
        let rgba = ImageReader::open(&full)?
            .with_guessed_format()?
            .decode()?
            .to_rgba8();
        let (w, h) = rgba.dimensions();
        let longest = w.max(h);
        if settings.max_size == 0 || longest <= settings.max_size {
            return Ok(rgba);
        }
        // clamp the longest side to max_size, keeping aspect
        let scale = settings.max_size as f64 / longest as f64;
        let nw = ((w as f64 * scale).round() as u32).max(1);
        let nh = ((h as f64 * scale).round() as u32).max(1);
        Ok(image::imageops::resize(
            &rgba,
            nw,
            nh,
            settings.filter_mode.filter_type(),
        ))
    }

    fn source_dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(IconAtlasError::MissingAsset(path.to_path_buf()));
        }
        Ok(image::image_dimensions(&full)?)
    }

    fn write_png(&mut self, path: &Path, pixels: &RgbaImage) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        pixels.save_with_format(&full, ImageFormat::Png)?;
        Ok(())
    }
}

impl SpriteMetadataSink for FsAssetStore {
    fn set_sprite_mode(&mut self, path: &Path, mode: SpriteMode) -> Result<()> {
        self.update_settings(path, |s| s.sprite_mode = mode)
    }

    fn clear_sprites(&mut self, path: &Path) -> Result<()> {
        self.update_settings(path, |s| s.sprites.clear())
    }

    fn insert_sprite(&mut self, path: &Path, index: usize, record: SpriteRecord) -> Result<()> {
        let mut settings = self.import_settings(path)?;
        if index > settings.sprites.len() {
            return Err(IconAtlasError::InvalidInput(format!(
                "sprite index {index} out of range ({} stored)",
                settings.sprites.len()
            )));
        }
        settings.sprites.insert(index, record);
        self.write_settings(path, &settings)
    }

    fn sprites(&self, path: &Path) -> Result<Vec<SpriteRecord>> {
        Ok(self.import_settings(path)?.sprites)
    }

    // one side-car rewrite for the whole table
    fn replace_sprites(&mut self, path: &Path, records: Vec<SpriteRecord>) -> Result<()> {
        self.update_settings(path, |s| s.sprites = records)
    }

    fn verify_saving_assets(&self) -> bool {
        self.verify_saving_assets
    }

    fn set_verify_saving_assets(&mut self, enabled: bool) {
        self.verify_saving_assets = enabled;
    }

    fn reserialize(&mut self, path: &Path) -> Result<()> {
        if self.verify_saving_assets {
            self.verification_prompts += 1;
        }
        let settings = self.import_settings(path)?;
        self.write_settings(path, &settings)
    }
}
