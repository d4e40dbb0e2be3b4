use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default sprite asset and the glyph assets searched when it lacks an icon.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FallbackSettings {
    pub default_sprite_asset: Option<PathBuf>,
    pub fallback_sprite_assets: Vec<PathBuf>,
}

impl FallbackSettings {
    /// Reads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Appends `asset` to the fallback list.
    ///
    /// No-op without a default sprite asset. Entries for which `exists` is false are
    /// dropped; `asset` is not added twice. Returns true if the list changed.
    pub fn register(&mut self, asset: &Path, exists: impl Fn(&Path) -> bool) -> bool {
        if self.default_sprite_asset.is_none() {
            return false;
        }
        let before = self.fallback_sprite_assets.clone();
        self.fallback_sprite_assets.retain(|p| exists(p.as_path()));
        if !self.fallback_sprite_assets.iter().any(|p| p == asset) {
            self.fallback_sprite_assets.push(asset.to_path_buf());
        }
        self.fallback_sprite_assets != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_default_asset() {
        let mut s = FallbackSettings::default();
        assert!(!s.register(Path::new("a.asset"), |_| true));
        assert!(s.fallback_sprite_assets.is_empty());
    }

    #[test]
    fn register_dedups_and_drops_dangling() {
        let mut s = FallbackSettings {
            default_sprite_asset: Some("emoji.asset".into()),
            fallback_sprite_assets: vec!["gone.asset".into(), "a.asset".into()],
        };
        let exists = |p: &Path| p != Path::new("gone.asset");
        assert!(s.register(Path::new("a.asset"), exists));
        assert_eq!(s.fallback_sprite_assets, vec![PathBuf::from("a.asset")]);
        assert!(!s.register(Path::new("a.asset"), exists));
        assert!(s.register(Path::new("b.asset"), exists));
        assert_eq!(s.fallback_sprite_assets.len(), 2);
    }
}
