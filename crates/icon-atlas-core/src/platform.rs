use serde::{Deserialize, Serialize};

/// Compressed texture formats a platform override can select.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    Rgba32,
    AstcRgb5x5,
    AstcRgba5x5,
    EtcRgb4,
    Etc2Rgba8,
}

/// Per-platform import override stored alongside an atlas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformTextureSettings {
    pub name: String,
    pub overridden: bool,
    pub max_size: u32,
    pub format: TextureFormat,
}

/// Chooses a compression format per target platform.
///
/// The only input is whether the atlas carries a non-opaque alpha channel.
pub trait PlatformTexturePolicy {
    fn select(&self, has_alpha: bool) -> Vec<PlatformTextureSettings>;
}

/// iPhone gets ASTC 5x5, Android gets ETC2 with alpha or ETC1 without.
#[derive(Debug, Clone)]
pub struct DefaultPlatformPolicy {
    pub max_size: u32,
}

impl Default for DefaultPlatformPolicy {
    fn default() -> Self {
        Self { max_size: 2048 }
    }
}

impl PlatformTexturePolicy for DefaultPlatformPolicy {
    fn select(&self, has_alpha: bool) -> Vec<PlatformTextureSettings> {
        let (ios, android) = if has_alpha {
            (TextureFormat::AstcRgba5x5, TextureFormat::Etc2Rgba8)
        } else {
            (TextureFormat::AstcRgb5x5, TextureFormat::EtcRgb4)
        };
        vec![
            PlatformTextureSettings {
                name: "iPhone".into(),
                overridden: true,
                max_size: self.max_size,
                format: ios,
            },
            PlatformTextureSettings {
                name: "Android".into(),
                overridden: true,
                max_size: self.max_size,
                format: android,
            },
        ]
    }
}
