use image::imageops::FilterType;
use image::{GenericImageView, ImageError, ImageOutputFormat};
use std::io::Cursor;

/// Excel row heights are in points; images are measured in pixels at 96 dpi.
const POINTS_PER_PIXEL: f64 = 0.75;

/// A photo scaled to the photo sheet's column width, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct ResizedPhoto {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Height after scaling `width x height` to `target_width`, rounded down.
/// Never returns less than one pixel.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (height as u64 * target_width as u64) / width as u64;
    scaled.max(1) as u32
}

/// Decode `bytes` and scale to `target_width`, keeping the aspect ratio.
pub fn resize_photo(bytes: &[u8], target_width: u32) -> Result<ResizedPhoto, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    let height = scaled_height(width, height, target_width);
    let resized = img.resize_exact(target_width, height, FilterType::Triangle);

    let mut png = Cursor::new(Vec::new());
    resized.write_to(&mut png, ImageOutputFormat::Png)?;

    Ok(ResizedPhoto {
        png: png.into_inner(),
        width: target_width,
        height,
    })
}

/// Row height in points that fits an image of `pixel_height`, but not less
/// than `floor_points`.
pub fn row_height_points(pixel_height: u32, floor_points: f64) -> f64 {
    (pixel_height as f64 * POINTS_PER_PIXEL).max(floor_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn height_scales_with_floor() {
        assert_eq!(scaled_height(800, 600, 240), 180);
        assert_eq!(scaled_height(1000, 333, 240), 79);
        assert_eq!(scaled_height(3000, 1, 240), 1);
        assert_eq!(scaled_height(0, 100, 240), 1);
    }

    #[test]
    fn resize_keeps_aspect_ratio() {
        let resized = resize_photo(&png_bytes(640, 480), 240).unwrap();
        assert_eq!(resized.width, 240);
        assert_eq!(resized.height, 180);

        let decoded = image::load_from_memory(&resized.png).unwrap();
        assert_eq!(decoded.dimensions(), (240, 180));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(resize_photo(b"not an image", 240).is_err());
    }

    #[test]
    fn row_height_has_floor() {
        assert_eq!(row_height_points(180, 30.0), 135.0);
        assert_eq!(row_height_points(10, 30.0), 30.0);
    }
}
