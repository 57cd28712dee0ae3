use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let bmp = decode_image("dot.png", &png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!((bmp.width, bmp.height), (1, 1));
    assert_eq!(
        bmp.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn transparent_pixels_are_zeroed() {
    let bmp = decode_image("clear.png", &png_1x1([9, 9, 9, 0])).unwrap();
    assert_eq!(bmp.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_image("bad.png", b"not an image").unwrap_err();
    assert!(matches!(err, ResourceLoadError::Decode { .. }));
    assert_eq!(err.source_id(), "bad.png");
}

#[test]
fn key_tracks_content() {
    let a = Bitmap::solid(2, 2, [255, 0, 0, 255]);
    let b = Bitmap::solid(2, 2, [255, 0, 0, 255]);
    let c = Bitmap::solid(2, 2, [0, 255, 0, 255]);
    assert_eq!(a.key, b.key);
    assert_ne!(a.key, c.key);
    assert!(Bitmap::from_premul(2, 2, vec![0; 15]).is_none());
    assert_eq!(Bitmap::from_premul(2, 2, vec![0; 16]).unwrap().width, 2);
}
