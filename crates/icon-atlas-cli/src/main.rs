use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use icon_atlas_core::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "icon-atlas",
    about = "Combine icon folders into a power-of-two atlas and build inline glyph tables",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Project root; asset paths are relative to it
    #[arg(long, default_value = ".", global = true, help_heading = "Project")]
    root: PathBuf,
    /// YAML config file path (flags override its values)
    #[arg(long, global = true, help_heading = "Project")]
    config: Option<PathBuf>,
    /// Cell edge in pixels
    #[arg(long, global = true, help_heading = "Project")]
    cell_edge: Option<u32>,
    /// Include patterns (glob). If set, only icon files matching any pattern are considered
    #[arg(long, global = true, help_heading = "Project")]
    include: Vec<String>,
    /// Exclude patterns (glob). Icon files matching any pattern will be ignored
    #[arg(long, global = true, help_heading = "Project")]
    exclude: Vec<String>,
    /// Show a progress spinner (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// One-click: combine the configured source folder, slice, compile glyphs, register fallback
    Generate,
    /// Combine every icon under a folder into an atlas
    Combine {
        /// Icon folder
        dir: PathBuf,
        /// Atlas path (defaults to <dir>/../<custom_name>.png)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Slice an atlas into named cells and write its sprite table
    Slice {
        atlas: PathBuf,
        /// Identity map JSON (defaults to the side-car written by `combine`)
        #[arg(long)]
        identity: Option<PathBuf>,
    },
    /// Compile the glyph asset of a sliced atlas and apply the inline metrics
    Glyphs { atlas: PathBuf },
    /// Append a glyph asset to the default sprite asset's fallback list
    Fallback {
        asset: PathBuf,
        /// Set the default sprite asset before registering
        #[arg(long)]
        set_default: Option<PathBuf>,
    },
    /// Print the merged configuration (after YAML/flags) and exit
    PrintConfig {
        /// Output format: json|yaml
        #[arg(long, default_value = "json", value_parser = ["json", "yaml"])]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let cfg = load_config(&cli)?;
    if let Commands::PrintConfig { format } = &cli.command {
        match format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let mut tools = IconAtlasTools::open(&cli.root, cfg)
        .with_context(|| format!("open project {}", cli.root.display()))?;
    let spinner = Spinner::new(cli.progress && !cli.quiet)?;
    let result = run(&cli.command, &mut tools, &spinner);
    spinner.finish();
    result
}

fn run(
    command: &Commands,
    tools: &mut IconAtlasTools<FsAssetStore, DefaultPlatformPolicy, JsonGlyphCompiler>,
    spinner: &Spinner,
) -> anyhow::Result<()> {
    match command {
        Commands::Generate => {
            spinner.stage("generating icon atlas");
            let report = tools.generate().context("generate")?;
            tools
                .write_identity(&report.atlas_path, &report.identity)
                .context("write identity side-car")?;
            info!(
                atlas = ?report.atlas_path,
                icons = report.identity.len(),
                slices = report.slices,
                glyph_asset = ?report.glyph_asset,
                fallback_registered = report.fallback_registered,
                "done"
            );
        }
        Commands::Combine { dir, out } => {
            spinner.stage("combining icons");
            let (atlas_path, combined) = match out {
                Some(out) => (out.clone(), tools.combine(dir, out)?),
                None => tools.combine_custom(dir)?,
            };
            tools
                .write_identity(&atlas_path, &combined.identity)
                .context("write identity side-car")?;
            if combined.unreadable > 0 {
                warn!(
                    unreadable = combined.unreadable,
                    "some icons could not be read; their cells are blank"
                );
            }
            info!(
                atlas = ?atlas_path,
                icons = combined.icons,
                edge = combined.encoded.edge,
                has_alpha = combined.encoded.has_alpha,
                "atlas written"
            );
        }
        Commands::Slice { atlas, identity } => {
            spinner.stage("slicing atlas");
            let identity = match identity {
                Some(p) => read_identity_file(p)?,
                None => tools.read_identity(atlas)?,
            };
            let slices = tools
                .slice_and_apply(atlas, &identity)
                .with_context(|| format!("slice {}", atlas.display()))?;
            info!(atlas = ?atlas, slices = slices.len(), "sprite table written");
        }
        Commands::Glyphs { atlas } => {
            spinner.stage("compiling glyphs");
            match tools.build_glyph_asset(atlas)? {
                Some(asset) => info!(?asset, "glyph asset ready"),
                None => warn!(atlas = ?atlas, "no glyph asset was produced"),
            }
        }
        Commands::Fallback { asset, set_default } => {
            spinner.stage("registering fallback");
            if let Some(default) = set_default {
                set_default_sprite_asset(tools, default)?;
            }
            let changed = tools.register_fallback(asset)?;
            info!(?asset, changed, "fallback list updated");
        }
        // handled in main before the project is opened
        Commands::PrintConfig { .. } => {}
    }
    Ok(())
}

fn set_default_sprite_asset(
    tools: &IconAtlasTools<FsAssetStore, DefaultPlatformPolicy, JsonGlyphCompiler>,
    default: &Path,
) -> anyhow::Result<()> {
    let path = tools
        .store()
        .resolve(&tools.config().fallback_settings_path);
    let mut settings = FallbackSettings::load(&path)?;
    settings.default_sprite_asset = Some(default.to_path_buf());
    settings
        .save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    info!(default = ?default, "default sprite asset set");
    Ok(())
}

fn read_identity_file(p: &Path) -> anyhow::Result<IdentityMap> {
    let text = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let map = serde_json::from_str(&text).with_context(|| format!("parse {}", p.display()))?;
    Ok(map)
}

fn load_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let mut cfg = ToolConfig::default();
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_tool_config(cfg);
    }
    if let Some(v) = cli.cell_edge {
        cfg.cell_edge = v;
    }
    if !cli.include.is_empty() {
        cfg.include = cli.include.clone();
    }
    if !cli.exclude.is_empty() {
        cfg.exclude = cli.exclude.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Stage spinner on stderr; a no-op when progress is off.
struct Spinner(Option<ProgressBar>);

impl Spinner {
    fn new(enabled: bool) -> anyhow::Result<Self> {
        if !enabled {
            return Ok(Self(None));
        }
        let b = ProgressBar::new_spinner();
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_msg}",
        )?);
        b.enable_steady_tick(Duration::from_millis(100));
        Ok(Self(Some(b)))
    }

    fn stage(&self, msg: &str) {
        if let Some(b) = &self.0 {
            b.set_message(msg.to_string());
        }
    }

    fn finish(&self) {
        if let Some(b) = &self.0 {
            b.finish_and_clear();
        }
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    cell_edge: Option<u32>,
    glyph_scale: Option<f32>,
    glyph_bearing_y: Option<f32>,
    default_max_size: Option<u32>,
    save_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
    atlas_name: Option<String>,
    custom_name: Option<String>,
    fallback_settings_path: Option<PathBuf>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl YamlConfig {
    fn into_tool_config(self, mut cfg: ToolConfig) -> ToolConfig {
        if let Some(v) = self.cell_edge {
            cfg.cell_edge = v;
        }
        if let Some(v) = self.glyph_scale {
            cfg.glyph_scale = v;
        }
        if let Some(v) = self.glyph_bearing_y {
            cfg.glyph_bearing_y = v;
        }
        if let Some(v) = self.default_max_size {
            cfg.default_max_size = v;
        }
        if let Some(v) = self.save_path {
            cfg.save_path = v;
        }
        if let Some(v) = self.source_path {
            cfg.source_path = v;
        }
        if let Some(v) = self.atlas_name {
            cfg.atlas_name = v;
        }
        if let Some(v) = self.custom_name {
            cfg.custom_name = v;
        }
        if let Some(v) = self.fallback_settings_path {
            cfg.fallback_settings_path = v;
        }
        if let Some(v) = self.include {
            cfg.include = v;
        }
        if let Some(v) = self.exclude {
            cfg.exclude = v;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_only_given_keys() {
        let y: YamlConfig = serde_yaml::from_str("cell_edge: 64\natlas_name: Emoji\n").unwrap();
        let cfg = y.into_tool_config(ToolConfig::default());
        assert_eq!(cfg.cell_edge, 64);
        assert_eq!(cfg.atlas_name, "Emoji");
        assert_eq!(cfg.glyph_scale, 1.5);
        assert_eq!(cfg.atlas_path(), PathBuf::from("Assets/TMPIcon/Emoji.png"));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "icon-atlas",
            "--root",
            "proj",
            "combine",
            "Assets/Sprites/emoji",
            "--out",
            "Assets/emoji.png",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from("proj"));
        match cli.command {
            Commands::Combine { dir, out } => {
                assert_eq!(dir, PathBuf::from("Assets/Sprites/emoji"));
                assert_eq!(out, Some(PathBuf::from("Assets/emoji.png")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
