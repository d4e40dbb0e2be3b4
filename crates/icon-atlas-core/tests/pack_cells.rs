use icon_atlas_core::compositing::region_is_transparent;
use icon_atlas_core::prelude::*;
use image::{Rgba, RgbaImage};

fn icon(name: &str, shade: u8) -> IconImage {
    let px = RgbaImage::from_pixel(32, 32, Rgba([shade, 255 - shade, 7, 255]));
    IconImage::readable(name, format!("{name}.png"), px)
}

#[test]
fn scenario_a_five_icons() {
    let icons: Vec<IconImage> = ["a", "b", "c", "d", "e"]
        .iter()
        .enumerate()
        .map(|(i, n)| icon(n, 10 + i as u8))
        .collect();
    let (atlas, identity) = pack(&icons, 32).expect("pack");
    assert_eq!(atlas.edge(), 128);
    assert_eq!(atlas.pixels.dimensions(), (128, 128));
    assert_eq!(identity.len(), 5);
    for (i, n) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        assert_eq!(identity.get(i), Some(*n));
    }
    assert_eq!(identity.get(5), None);

    // a..d fill the top row, e starts the second row
    assert_eq!(*atlas.pixels.get_pixel(0, 0), Rgba([10, 245, 7, 255]));
    assert_eq!(*atlas.pixels.get_pixel(96, 31), Rgba([13, 242, 7, 255]));
    assert_eq!(*atlas.pixels.get_pixel(0, 32), Rgba([14, 241, 7, 255]));
    // remaining cells stay transparent
    let grid = atlas.grid;
    for i in 5..16 {
        let cell = grid.cell_rect(i).unwrap();
        assert!(region_is_transparent(&atlas.pixels, cell), "cell {i}");
    }
}

#[test]
fn scenario_b_single_icon() {
    let (atlas, identity) = pack(&[icon("only", 1)], 32).expect("pack");
    assert_eq!(atlas.edge(), 32);
    assert_eq!(identity.get(0), Some("only"));
    assert!(!atlas.has_alpha());
}

#[test]
fn scenario_c_sixteen_icons_fill_grid() {
    let icons: Vec<IconImage> = (0..16).map(|i| icon(&format!("i{i}"), i as u8)).collect();
    let (atlas, identity) = pack(&icons, 32).expect("pack");
    assert_eq!(atlas.grid.columns, 4);
    assert_eq!(identity.len(), 16);
    assert!(atlas.pixels.pixels().all(|p| p[3] == 255));
}

#[test]
fn unreadable_icon_keeps_named_blank_cell() {
    let icons = vec![
        icon("first", 50),
        IconImage::unreadable("locked", "locked.png", 32, 32),
        icon("third", 60),
    ];
    let (atlas, identity) = pack(&icons, 32).expect("pack");
    assert_eq!(identity.get(1), Some("locked"));
    assert_eq!(identity.get(2), Some("third"));
    let grid = atlas.grid;
    assert!(region_is_transparent(&atlas.pixels, grid.cell_rect(1).unwrap()));
    // the icon after the unreadable one does not shift into its cell
    assert_eq!(*atlas.pixels.get_pixel(0, 32), Rgba([60, 195, 7, 255]));
}

#[test]
fn packing_is_deterministic() {
    let icons: Vec<IconImage> = (0..11).map(|i| icon(&format!("n{i}"), i as u8 * 9)).collect();
    let (a1, m1) = pack(&icons, 32).expect("pack");
    let (a2, m2) = pack(&icons, 32).expect("pack");
    assert_eq!(a1.grid, a2.grid);
    assert_eq!(m1, m2);
    assert_eq!(a1.pixels.as_raw(), a2.pixels.as_raw());
}

#[test]
fn oversized_icon_is_clipped_to_its_cell() {
    let big = IconImage::readable("big", "big.png", RgbaImage::from_pixel(40, 40, Rgba([1, 1, 1, 255])));
    let (atlas, _) = pack(&[big, icon("next", 200)], 32).expect("pack");
    assert_eq!(atlas.edge(), 64);
    assert_eq!(*atlas.pixels.get_pixel(32, 0), Rgba([200, 55, 7, 255]));
    assert_eq!(atlas.pixels.get_pixel(0, 32)[3], 0);
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(pack(&[], 32), Err(IconAtlasError::Empty)));
}
