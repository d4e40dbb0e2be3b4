use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool configuration.
/// Key notes:
///   - `cell_edge` is the fixed icon size; every icon occupies one `cell_edge` square cell
///   - `glyph_scale` / `glyph_bearing_y` are written onto every glyph after compilation
///   - paths are relative to the project root handed to the asset store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Edge length of one icon cell in pixels.
    pub cell_edge: u32,
    /// Scale assigned to every glyph.
    pub glyph_scale: f32,
    /// Horizontal bearing Y assigned to every glyph (baseline at 3/4 of a 32px icon).
    pub glyph_bearing_y: f32,
    /// Max import size restored on source icons after packing.
    pub default_max_size: u32,

    /// Output directory for the one-click atlas.
    pub save_path: PathBuf,
    /// Source icon directory for the one-click atlas.
    pub source_path: PathBuf,
    /// Base name of the one-click atlas.
    pub atlas_name: String,
    /// Base name of atlases combined from an arbitrary directory.
    pub custom_name: String,
    /// JSON file holding the default sprite asset and its fallback list.
    pub fallback_settings_path: PathBuf,

    /// Include patterns (glob). If set, only matching icon files are considered.
    pub include: Vec<String>,
    /// Exclude patterns (glob).
    pub exclude: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cell_edge: 32,
            glyph_scale: 1.5,
            glyph_bearing_y: 24.0,
            default_max_size: 2048,
            save_path: PathBuf::from("Assets/TMPIcon/"),
            source_path: PathBuf::from("Assets/Sprites/1/"),
            atlas_name: "TMPIcon".into(),
            custom_name: "Default".into(),
            fallback_settings_path: PathBuf::from("ProjectSettings/IconFallbacks.json"),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl ToolConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `cell_edge` is zero, not a power of two, or larger than `default_max_size`
    /// - atlas names are empty
    /// - glyph scale is not a positive finite number
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::IconAtlasError;

        if self.cell_edge == 0 || !self.cell_edge.is_power_of_two() {
            return Err(IconAtlasError::InvalidConfig(format!(
                "cell_edge must be a non-zero power of two, got {}",
                self.cell_edge
            )));
        }
        if self.cell_edge > self.default_max_size {
            return Err(IconAtlasError::InvalidConfig(format!(
                "cell_edge ({}) exceeds default_max_size ({})",
                self.cell_edge, self.default_max_size
            )));
        }
        if self.atlas_name.trim().is_empty() || self.custom_name.trim().is_empty() {
            return Err(IconAtlasError::InvalidConfig(
                "atlas_name and custom_name must not be empty".into(),
            ));
        }
        if !(self.glyph_scale.is_finite() && self.glyph_scale > 0.0) {
            return Err(IconAtlasError::InvalidConfig(format!(
                "glyph_scale must be positive, got {}",
                self.glyph_scale
            )));
        }
        if !self.glyph_bearing_y.is_finite() {
            return Err(IconAtlasError::InvalidConfig(
                "glyph_bearing_y must be finite".into(),
            ));
        }
        Ok(())
    }

    /// `<save_path>/<atlas_name>.png`
    pub fn atlas_path(&self) -> PathBuf {
        self.save_path.join(format!("{}.png", self.atlas_name))
    }

    /// Create a fluent builder for `ToolConfig`.
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder::new()
    }
}

/// Builder for `ToolConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct ToolConfigBuilder {
    cfg: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: ToolConfig::default(),
        }
    }
    pub fn cell_edge(mut self, v: u32) -> Self {
        self.cfg.cell_edge = v;
        self
    }
    pub fn glyph_scale(mut self, v: f32) -> Self {
        self.cfg.glyph_scale = v;
        self
    }
    pub fn glyph_bearing_y(mut self, v: f32) -> Self {
        self.cfg.glyph_bearing_y = v;
        self
    }
    pub fn default_max_size(mut self, v: u32) -> Self {
        self.cfg.default_max_size = v;
        self
    }
    pub fn save_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.save_path = v.into();
        self
    }
    pub fn source_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.source_path = v.into();
        self
    }
    pub fn atlas_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.atlas_name = v.into();
        self
    }
    pub fn custom_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.custom_name = v.into();
        self
    }
    pub fn fallback_settings_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.fallback_settings_path = v.into();
        self
    }
    pub fn include(mut self, v: Vec<String>) -> Self {
        self.cfg.include = v;
        self
    }
    pub fn exclude(mut self, v: Vec<String>) -> Self {
        self.cfg.exclude = v;
        self
    }
    pub fn build(self) -> ToolConfig {
        self.cfg
    }
}
