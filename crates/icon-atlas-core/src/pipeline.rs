use crate::config::ToolConfig;
use crate::encoder::{encode, EncodeReport, ImportScope};
use crate::error::{IconAtlasError, Result};
use crate::fallback::FallbackSettings;
use crate::glyph::{adjust, glyph_asset_path, GlyphAssetCompiler, JsonGlyphCompiler};
use crate::loader::{collect_icon_paths, load_icon_set};
use crate::metadata::{apply, slice_from_record};
use crate::model::{IdentityMap, SliceRect};
use crate::packer::pack;
use crate::platform::{DefaultPlatformPolicy, PlatformTexturePolicy};
use crate::slicer::{slice, SliceOptions};
use crate::store::{FsAssetStore, ImageAssetStore, SpriteMetadataSink};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Output of [`IconAtlasTools::combine`].
#[derive(Debug, Clone)]
pub struct CombineOutput {
    pub identity: IdentityMap,
    pub encoded: EncodeReport,
    pub icons: usize,
    pub unreadable: usize,
}

/// Output of the one-click [`IconAtlasTools::generate`] run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub atlas_path: PathBuf,
    pub identity: IdentityMap,
    pub slices: usize,
    pub glyph_asset: Option<PathBuf>,
    pub fallback_registered: bool,
}

/// The icon atlas pipeline over a project root and its collaborators.
///
/// Stages run strictly in order: pack, encode, slice, write metadata, compile glyphs,
/// adjust metrics, register fallback. A failing stage stops the run; completed stages
/// are not rolled back.
pub struct IconAtlasTools<S, P, G> {
    root: PathBuf,
    store: S,
    policy: P,
    compiler: G,
    cfg: ToolConfig,
}

impl IconAtlasTools<FsAssetStore, DefaultPlatformPolicy, JsonGlyphCompiler> {
    /// File-system backed tools rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, cfg: ToolConfig) -> Result<Self> {
        let root = root.into();
        Self::new(
            root.clone(),
            FsAssetStore::new(root.clone()),
            DefaultPlatformPolicy::default(),
            JsonGlyphCompiler::new(root),
            cfg,
        )
    }
}

impl<S, P, G> IconAtlasTools<S, P, G>
where
    S: ImageAssetStore + SpriteMetadataSink,
    P: PlatformTexturePolicy,
    G: GlyphAssetCompiler,
{
    pub fn new(root: PathBuf, store: S, policy: P, compiler: G, cfg: ToolConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            root,
            store,
            policy,
            compiler,
            cfg,
        })
    }

    pub fn config(&self) -> &ToolConfig {
        &self.cfg
    }
    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn compiler(&self) -> &G {
        &self.compiler
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    #[instrument(skip_all)]
    /// One-click run from `source_path` to a registered glyph asset at `save_path/atlas_name`.
    pub fn generate(&mut self) -> Result<GenerateReport> {
        let source = self.cfg.source_path.clone();
        let atlas_path = self.cfg.atlas_path();

        let combined = self.combine(&source, &atlas_path)?;
        let slices = self.slice_and_apply(&atlas_path, &combined.identity)?;
        let glyph_asset = self.build_glyph_asset(&atlas_path)?;
        let fallback_registered = match &glyph_asset {
            Some(asset) => self.register_fallback(asset)?,
            None => false,
        };

        info!(
            atlas = ?atlas_path,
            slices = slices.len(),
            ?glyph_asset,
            fallback_registered,
            "icon atlas generated"
        );
        Ok(GenerateReport {
            atlas_path,
            identity: combined.identity,
            slices: slices.len(),
            glyph_asset,
            fallback_registered,
        })
    }

    #[instrument(skip_all, fields(source = ?source_dir, atlas = ?atlas_path))]
    /// Packs every icon under `source_dir` into `atlas_path`.
    ///
    /// Source icons are readable (and clamped to the cell size) only while they are
    /// being packed; their import settings are restored even if packing fails.
    pub fn combine(&mut self, source_dir: &Path, atlas_path: &Path) -> Result<CombineOutput> {
        let paths =
            collect_icon_paths(&self.root, source_dir, &self.cfg.include, &self.cfg.exclude)?;
        if paths.is_empty() {
            return Err(IconAtlasError::Empty);
        }

        let (atlas, identity, icons, unreadable) = {
            let scope = ImportScope::acquire(
                &mut self.store,
                &paths,
                self.cfg.cell_edge,
                self.cfg.default_max_size,
            )?;
            let icons = load_icon_set(&*scope, &paths)?;
            let unreadable = icons.iter().filter(|i| !i.is_readable()).count();
            let (atlas, identity) = pack(&icons, self.cfg.cell_edge)?;
            (atlas, identity, icons.len(), unreadable)
        };

        let encoded = encode(&mut self.store, &self.policy, atlas, atlas_path)?;
        Ok(CombineOutput {
            identity,
            encoded,
            icons,
            unreadable,
        })
    }

    /// Atlas path for combining an arbitrary directory: `<parent>/<custom_name>.png`.
    pub fn custom_atlas_path(&self, dir: &Path) -> PathBuf {
        dir.parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("{}.png", self.cfg.custom_name))
    }

    /// [`Self::combine`] into [`Self::custom_atlas_path`].
    pub fn combine_custom(&mut self, dir: &Path) -> Result<(PathBuf, CombineOutput)> {
        let atlas_path = self.custom_atlas_path(dir);
        let out = self.combine(dir, &atlas_path)?;
        Ok((atlas_path, out))
    }

    /// Slices the persisted atlas with the icon slicing options and replaces its sprite table.
    pub fn slice_and_apply(
        &mut self,
        atlas_path: &Path,
        identity: &IdentityMap,
    ) -> Result<Vec<SliceRect>> {
        let options = SliceOptions::icons(self.cfg.cell_edge);
        let slices = slice(&self.store, atlas_path, &options, identity)?;
        apply(&mut self.store, atlas_path, &slices)?;
        Ok(slices)
    }

    #[instrument(skip_all, fields(atlas = ?atlas_path))]
    /// Compiles the glyph asset for `atlas_path` from its stored sprite table and applies
    /// the inline layout metrics.
    ///
    /// Returns `Ok(None)` when the compiler produced nothing at the expected path.
    pub fn build_glyph_asset(&mut self, atlas_path: &Path) -> Result<Option<PathBuf>> {
        let asset_path = glyph_asset_path(atlas_path);
        self.compiler.delete(&asset_path)?;

        let (_, atlas_h) = self.store.source_dimensions(atlas_path)?;
        let slices: Vec<SliceRect> = self
            .store
            .sprites(atlas_path)?
            .iter()
            .map(|r| slice_from_record(r, atlas_h))
            .collect();
        self.compiler.compile(atlas_path, &slices, &asset_path)?;

        let Some(mut table) = self.compiler.load(&asset_path)? else {
            warn!(asset = ?asset_path, "glyph compiler produced no asset; metrics untouched");
            return Ok(None);
        };
        adjust(
            &mut table.glyphs,
            self.cfg.glyph_scale,
            self.cfg.glyph_bearing_y,
        );
        self.compiler.save(&asset_path, &table)?;
        info!(
            glyphs = table.glyphs.len(),
            scale = self.cfg.glyph_scale,
            bearing_y = self.cfg.glyph_bearing_y,
            "glyph metrics adjusted"
        );
        Ok(Some(asset_path))
    }

    /// Appends `asset_path` to the fallback list of the default sprite asset.
    ///
    /// Returns whether the stored list changed; `false` without a default sprite asset.
    pub fn register_fallback(&mut self, asset_path: &Path) -> Result<bool> {
        let settings_path = self.resolve(&self.cfg.fallback_settings_path);
        let mut settings = FallbackSettings::load(&settings_path)?;
        if settings.default_sprite_asset.is_none() {
            info!("no default sprite asset configured; fallback not registered");
            return Ok(false);
        }
        let root = self.root.clone();
        let changed = settings.register(asset_path, |p| {
            if p.is_absolute() {
                p.is_file()
            } else {
                root.join(p).is_file()
            }
        });
        settings.save(&settings_path)?;
        info!(asset = ?asset_path, changed, "fallback registered");
        Ok(changed)
    }

    /// Side-car file used to hand an identity map from `combine` to a later `slice` run.
    pub fn identity_path(&self, atlas_path: &Path) -> PathBuf {
        self.resolve(&atlas_path.with_extension("identity.json"))
    }

    pub fn write_identity(&self, atlas_path: &Path, identity: &IdentityMap) -> Result<()> {
        let path = self.identity_path(atlas_path);
        fs::write(&path, serde_json::to_string_pretty(identity)?)?;
        Ok(())
    }

    /// Reads the side-car written by [`Self::write_identity`]; a missing file yields an
    /// empty map, so every slice gets a placeholder name.
    pub fn read_identity(&self, atlas_path: &Path) -> Result<IdentityMap> {
        let path = self.identity_path(atlas_path);
        if !path.is_file() {
            warn!(?path, "no identity side-car; slices will use placeholder names");
            return Ok(IdentityMap::new());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
