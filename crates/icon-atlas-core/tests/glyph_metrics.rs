use icon_atlas_core::prelude::*;
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

fn temp_project(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("icon-atlas-gm-{tag}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp project");
    dir
}

fn write_icons(root: &Path, dir: &str, names: &[&str]) {
    let d = root.join(dir);
    fs::create_dir_all(&d).unwrap();
    for (i, n) in names.iter().enumerate() {
        RgbaImage::from_pixel(32, 32, Rgba([i as u8 * 20, 90, 10, 255]))
            .save(d.join(format!("{n}.png")))
            .unwrap();
    }
}

fn glyph(index: u32, bearing_y: f32) -> GlyphEntry {
    GlyphEntry {
        index,
        name: format!("g{index}"),
        rect: Rect::new(index * 32, 0, 32, 32),
        metrics: GlyphMetrics {
            width: 32.0,
            height: 32.0,
            horizontal_bearing_x: 0.0,
            horizontal_bearing_y: bearing_y,
            horizontal_advance: 32.0,
        },
        scale: 1.0,
        atlas_index: 0,
    }
}

#[test]
fn adjust_sets_scale_and_bearing_on_every_glyph() {
    let mut glyphs: Vec<GlyphEntry> = (0..9).map(|i| glyph(i, i as f32 * 3.0)).collect();
    adjust(&mut glyphs, 1.5, 24.0);
    assert_eq!(glyphs.len(), 9);
    for (i, g) in glyphs.iter().enumerate() {
        assert_eq!(g.scale, 1.5);
        assert_eq!(g.metrics.horizontal_bearing_y, 24.0);
        // other metrics untouched
        assert_eq!(g.index, i as u32);
        assert_eq!(g.metrics.horizontal_advance, 32.0);
    }
}

#[test]
fn adjust_on_empty_table_is_a_no_op() {
    let mut glyphs: Vec<GlyphEntry> = Vec::new();
    adjust(&mut glyphs, 1.5, 24.0);
    assert!(glyphs.is_empty());
}

#[test]
fn glyph_asset_follows_sprite_table() {
    let root = temp_project("build");
    write_icons(&root, "icons", &["a", "b", "c"]);
    let mut t = IconAtlasTools::open(&root, ToolConfig::default()).unwrap();
    let atlas = Path::new("Assets/TMPIcon/TMPIcon.png");
    let combined = t.combine(Path::new("icons"), atlas).unwrap();
    t.slice_and_apply(atlas, &combined.identity).unwrap();

    let asset = t.build_glyph_asset(atlas).unwrap().expect("asset");
    assert_eq!(asset, PathBuf::from("Assets/TMPIcon/TMPIcon.asset"));
    let table = t.compiler().load(&asset).unwrap().expect("table");
    assert_eq!(table.glyphs.len(), 4);
    assert_eq!(table.characters.len(), 4);
    let names: Vec<&str> = table.glyphs.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "Error3"]);
    assert_eq!(table.glyphs[1].rect, Rect::new(32, 0, 32, 32));
    for g in &table.glyphs {
        assert_eq!(g.scale, 1.5);
        assert_eq!(g.metrics.horizontal_bearing_y, 24.0);
        assert_eq!(g.metrics.horizontal_bearing_x, 0.0);
    }
    assert!(table.characters.iter().all(|c| c.unicode == 0xFFFE));
}

#[test]
fn custom_scale_and_bearing_come_from_config() {
    let root = temp_project("custom-metrics");
    write_icons(&root, "icons", &["only"]);
    let cfg = ToolConfig::builder()
        .glyph_scale(2.0)
        .glyph_bearing_y(30.0)
        .build();
    let mut t = IconAtlasTools::open(&root, cfg).unwrap();
    let atlas = Path::new("out/atlas.png");
    let combined = t.combine(Path::new("icons"), atlas).unwrap();
    t.slice_and_apply(atlas, &combined.identity).unwrap();
    let asset = t.build_glyph_asset(atlas).unwrap().expect("asset");
    let table = t.compiler().load(&asset).unwrap().expect("table");
    assert_eq!(table.glyphs.len(), 1);
    assert_eq!(table.glyphs[0].scale, 2.0);
    assert_eq!(table.glyphs[0].metrics.horizontal_bearing_y, 30.0);
}

#[test]
fn one_click_generate_registers_fallback() {
    let root = temp_project("generate");
    write_icons(&root, "Assets/Sprites/1", &["heart", "star"]);
    let default_asset = root.join("Assets/Emoji/Default.asset");
    fs::create_dir_all(default_asset.parent().unwrap()).unwrap();
    fs::write(&default_asset, "{}").unwrap();
    let settings = FallbackSettings {
        default_sprite_asset: Some("Assets/Emoji/Default.asset".into()),
        fallback_sprite_assets: vec!["Assets/Gone.asset".into()],
    };
    settings
        .save(&root.join("ProjectSettings/IconFallbacks.json"))
        .unwrap();

    let mut t = IconAtlasTools::open(&root, ToolConfig::default()).unwrap();
    let report = t.generate().expect("generate");
    assert_eq!(report.atlas_path, PathBuf::from("Assets/TMPIcon/TMPIcon.png"));
    assert_eq!(report.slices, 4);
    assert_eq!(report.identity.len(), 2);
    assert_eq!(
        report.glyph_asset,
        Some(PathBuf::from("Assets/TMPIcon/TMPIcon.asset"))
    );
    assert!(report.fallback_registered);

    let stored = FallbackSettings::load(&root.join("ProjectSettings/IconFallbacks.json")).unwrap();
    assert_eq!(
        stored.fallback_sprite_assets,
        vec![PathBuf::from("Assets/TMPIcon/TMPIcon.asset")]
    );

    // a second run rebuilds in place and does not duplicate the fallback entry
    let again = t.generate().expect("generate again");
    assert!(!again.fallback_registered);
    let stored = FallbackSettings::load(&root.join("ProjectSettings/IconFallbacks.json")).unwrap();
    assert_eq!(stored.fallback_sprite_assets.len(), 1);
}

/// Compiler that never produces an asset and counts save calls.
#[derive(Default)]
struct EmptyCompiler {
    compiled: usize,
    saves: usize,
}

impl GlyphAssetCompiler for EmptyCompiler {
    fn compile(&mut self, _: &Path, _: &[SliceRect], _: &Path) -> icon_atlas_core::Result<()> {
        self.compiled += 1;
        Ok(())
    }
    fn load(&self, _: &Path) -> icon_atlas_core::Result<Option<GlyphTable>> {
        Ok(None)
    }
    fn save(&mut self, _: &Path, _: &GlyphTable) -> icon_atlas_core::Result<()> {
        self.saves += 1;
        Ok(())
    }
    fn delete(&mut self, _: &Path) -> icon_atlas_core::Result<()> {
        Ok(())
    }
}

#[test]
fn missing_compiler_output_skips_adjust_and_fallback() {
    let root = temp_project("no-output");
    write_icons(&root, "Assets/Sprites/1", &["heart"]);
    let default_asset = root.join("Assets/Emoji/Default.asset");
    fs::create_dir_all(default_asset.parent().unwrap()).unwrap();
    fs::write(&default_asset, "{}").unwrap();
    let settings_path = root.join("ProjectSettings/IconFallbacks.json");
    FallbackSettings {
        default_sprite_asset: Some("Assets/Emoji/Default.asset".into()),
        fallback_sprite_assets: Vec::new(),
    }
    .save(&settings_path)
    .unwrap();

    let mut t = IconAtlasTools::new(
        root.clone(),
        FsAssetStore::new(&root),
        DefaultPlatformPolicy::default(),
        EmptyCompiler::default(),
        ToolConfig::default(),
    )
    .unwrap();
    let report = t.generate().expect("generate");
    assert_eq!(report.slices, 1);
    assert_eq!(report.glyph_asset, None);
    assert!(!report.fallback_registered);
    assert_eq!(t.compiler().compiled, 1);
    assert_eq!(t.compiler().saves, 0);

    let stored = FallbackSettings::load(&settings_path).unwrap();
    assert!(stored.fallback_sprite_assets.is_empty());
}

#[test]
fn fallback_is_skipped_without_default_asset() {
    let root = temp_project("no-default");
    let mut t = IconAtlasTools::open(&root, ToolConfig::default()).unwrap();
    assert!(!t.register_fallback(Path::new("Assets/TMPIcon/TMPIcon.asset")).unwrap());
    assert!(!root.join("ProjectSettings/IconFallbacks.json").exists());
}
