use crate::error::Result;
use crate::model::IconImage;
use crate::store::ImageAssetStore;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Recursively collect `*.png` files under `dir`, sorted by path.
///
/// Returned paths keep the prefix of `dir`, so relative directories yield paths the
/// asset store resolves against its root. `include`/`exclude` are glob patterns
/// matched against the `/`-separated path.
pub fn collect_icon_paths(
    store_root: &Path,
    dir: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let full = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        store_root.join(dir)
    };
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(&full).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() || !is_png(p) {
            continue;
        }
        let rel = p.strip_prefix(&full).map(|r| dir.join(r)).unwrap_or_else(|_| p.to_path_buf());
        if should_skip(&rel, inc_set.as_ref(), exc_set.as_ref()) {
            continue;
        }
        list.push(rel);
    }
    list.sort();
    Ok(list)
}

/// Resolve each path through the store, in order.
///
/// Paths without an asset are dropped; unreadable icons are kept so they still
/// occupy a cell.
#[instrument(skip_all, fields(paths = paths.len()))]
pub fn load_icon_set<S: ImageAssetStore + ?Sized>(
    store: &S,
    paths: &[PathBuf],
) -> Result<Vec<IconImage>> {
    let mut icons = Vec::with_capacity(paths.len());
    for p in paths {
        match store.load_icon(p)? {
            Some(icon) => {
                debug!(name = %icon.name, readable = icon.is_readable(), "icon loaded");
                icons.push(icon);
            }
            None => debug!(?p, "no asset at path, skipped"),
        }
    }
    Ok(icons)
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_png(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_wins_over_include() {
        let inc = build_globset(&["**/*.png".into()]).unwrap();
        let exc = build_globset(&["**/skip_*".into()]).unwrap();
        assert!(should_skip(Path::new("a/skip_me.png"), inc.as_ref(), exc.as_ref()));
        assert!(!should_skip(Path::new("a/keep.png"), inc.as_ref(), exc.as_ref()));
        assert!(should_skip(Path::new("a/keep.jpg"), inc.as_ref(), None));
    }

    #[test]
    fn png_extension_is_case_insensitive() {
        assert!(is_png(Path::new("x/Icon.PNG")));
        assert!(!is_png(Path::new("x/icon.png.meta")));
    }
}
