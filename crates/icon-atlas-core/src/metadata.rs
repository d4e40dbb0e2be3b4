use crate::error::Result;
use crate::model::{SliceRect, SpriteAlignment};
use crate::scope::ScopedSetting;
use crate::store::{ImageAssetStore, SpriteMetadataSink, SpriteMode, SpriteRecord};
use std::path::Path;
use tracing::{info, instrument};

/// Sprite table row for `slice` inside an atlas of height `atlas_h`.
///
/// The table uses a bottom-left origin, so the top-left slice rectangle is flipped.
pub fn sprite_record(slice: &SliceRect, atlas_h: u32) -> SpriteRecord {
    SpriteRecord {
        name: slice.name.clone(),
        rect: slice.rect.flip_y(atlas_h),
        border: slice.border,
        alignment: slice.alignment.code(),
        pivot: slice.pivot,
        tessellation_detail: 0.0,
        sprite_id: slice.sprite_id.clone(),
    }
}

/// Inverse of [`sprite_record`].
pub fn slice_from_record(record: &SpriteRecord, atlas_h: u32) -> SliceRect {
    SliceRect {
        rect: record.rect.flip_y(atlas_h),
        name: record.name.clone(),
        alignment: SpriteAlignment::from_code(record.alignment),
        pivot: record.pivot,
        border: record.border,
        sprite_id: record.sprite_id.clone(),
    }
}

#[instrument(skip_all, fields(atlas = ?atlas_path, slices = slices.len()))]
/// Replaces the atlas' stored sprite table with `slices`, in order.
///
/// The save-verification preference is off while the asset is reserialized and is
/// restored on every exit path. The table is replaced as a whole; a failure in a later
/// step leaves it written, and rerunning overwrites it.
pub fn apply<S>(store: &mut S, atlas_path: &Path, slices: &[SliceRect]) -> Result<()>
where
    S: ImageAssetStore + SpriteMetadataSink,
{
    let (_, atlas_h) = store.source_dimensions(atlas_path)?;
    store.set_sprite_mode(atlas_path, SpriteMode::Multiple)?;
    let records = slices.iter().map(|s| sprite_record(s, atlas_h)).collect();
    store.replace_sprites(atlas_path, records)?;

    {
        let mut quiet = ScopedSetting::acquire(
            store,
            false,
            <S as SpriteMetadataSink>::verify_saving_assets,
            <S as SpriteMetadataSink>::set_verify_saving_assets,
        );
        quiet.reserialize(atlas_path)?;
    }

    store.reimport(atlas_path)?;
    info!(count = slices.len(), "sprite table written");
    Ok(())
}
