use crate::model::Rect;
use image::RgbaImage;

/// Copy `src` verbatim into `canvas` with its top-left corner at the cell origin.
///
/// No resampling or blending; source pixels outside the cell (or the canvas) are
/// dropped. Returns the number of pixels written.
pub fn blit_cell(src: &RgbaImage, canvas: &mut RgbaImage, cell: Rect) -> u64 {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let w = sw.min(cell.w).min(cw.saturating_sub(cell.x));
    let h = sh.min(cell.h).min(ch.saturating_sub(cell.y));
    for yy in 0..h {
        for xx in 0..w {
            let px = *src.get_pixel(xx, yy);
            canvas.put_pixel(cell.x + xx, cell.y + yy, px);
        }
    }
    u64::from(w) * u64::from(h)
}

/// True if every pixel of `rect` (clipped to the image) has zero alpha.
pub fn region_is_transparent(img: &RgbaImage, rect: Rect) -> bool {
    let (w, h) = img.dimensions();
    let x_end = (rect.x + rect.w).min(w);
    let y_end = (rect.y + rect.h).min(h);
    (rect.y..y_end).all(|y| (rect.x..x_end).all(|x| img.get_pixel(x, y)[3] == 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn blit_clips_to_cell() {
        let src = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let mut canvas = RgbaImage::new(16, 16);
        let written = blit_cell(&src, &mut canvas, Rect::new(4, 4, 4, 4));
        assert_eq!(written, 16);
        assert_eq!(*canvas.get_pixel(7, 7), Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.get_pixel(8, 8)[3], 0);
        assert!(region_is_transparent(&canvas, Rect::new(8, 0, 8, 16)));
        assert!(!region_is_transparent(&canvas, Rect::new(4, 4, 1, 1)));
    }
}
