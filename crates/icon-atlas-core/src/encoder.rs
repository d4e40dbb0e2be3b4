use crate::error::Result;
use crate::model::AtlasImage;
use crate::platform::{PlatformTexturePolicy, PlatformTextureSettings};
use crate::store::{ImageAssetStore, SpriteMode, TextureType};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Source icons switched to `readable` with a `cell_edge` max size for the
/// lifetime of the guard.
///
/// Every icon that was switched is restored to non-readable with the default max
/// size when the guard drops, including when acquisition itself fails partway.
pub struct ImportScope<'a, S: ImageAssetStore + ?Sized> {
    store: &'a mut S,
    mutated: Vec<PathBuf>,
    default_max_size: u32,
}

impl<'a, S: ImageAssetStore + ?Sized> ImportScope<'a, S> {
    pub fn acquire(
        store: &'a mut S,
        paths: &[PathBuf],
        cell_edge: u32,
        default_max_size: u32,
    ) -> Result<Self> {
        let mut scope = Self {
            store,
            mutated: Vec::with_capacity(paths.len()),
            default_max_size,
        };
        for p in paths {
            if !scope.store.exists(p) {
                continue;
            }
            let mut settings = scope.store.import_settings(p)?;
            settings.readable = true;
            settings.max_size = cell_edge;
            scope.store.set_import_settings(p, settings)?;
            scope.mutated.push(p.clone());
            scope.store.reimport(p)?;
        }
        debug!(count = scope.mutated.len(), cell_edge, "icons made readable");
        Ok(scope)
    }

    fn restore(&mut self, path: &Path) -> Result<()> {
        let mut settings = self.store.import_settings(path)?;
        settings.readable = false;
        settings.max_size = self.default_max_size;
        self.store.set_import_settings(path, settings)?;
        self.store.reimport(path)
    }
}

impl<S: ImageAssetStore + ?Sized> Deref for ImportScope<'_, S> {
    type Target = S;
    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: ImageAssetStore + ?Sized> Drop for ImportScope<'_, S> {
    fn drop(&mut self) {
        let mutated = std::mem::take(&mut self.mutated);
        for p in &mutated {
            if let Err(e) = self.restore(p) {
                warn!(path = ?p, error = %e, "failed to restore import settings");
            }
        }
        debug!(count = mutated.len(), "icon import settings restored");
    }
}

/// What [`encode`] wrote.
#[derive(Debug, Clone)]
pub struct EncodeReport {
    pub path: PathBuf,
    pub edge: u32,
    pub has_alpha: bool,
    pub platforms: Vec<PlatformTextureSettings>,
}

#[instrument(skip_all, fields(dest = ?destination))]
/// Writes `atlas` as PNG, applies per-platform compression settings and sprite import
/// mode, then reimports so later reads see the persisted geometry.
pub fn encode<S, P>(
    store: &mut S,
    policy: &P,
    atlas: AtlasImage,
    destination: &Path,
) -> Result<EncodeReport>
where
    S: ImageAssetStore + ?Sized,
    P: PlatformTexturePolicy + ?Sized,
{
    let has_alpha = atlas.has_alpha();
    let edge = atlas.edge();
    store.write_png(destination, &atlas.pixels)?;
    drop(atlas);
    store.reimport(destination)?;

    let platforms = policy.select(has_alpha);
    let mut settings = store.import_settings(destination)?;
    for p in &platforms {
        settings.platform_overrides.retain(|o| o.name != p.name);
        settings.platform_overrides.push(p.clone());
    }
    settings.texture_type = TextureType::Sprite;
    settings.sprite_mode = SpriteMode::Multiple;
    store.set_import_settings(destination, settings)?;
    store.reimport(destination)?;

    info!(edge, has_alpha, platforms = platforms.len(), "atlas encoded");
    Ok(EncodeReport {
        path: destination.to_path_buf(),
        edge,
        has_alpha,
        platforms,
    })
}
