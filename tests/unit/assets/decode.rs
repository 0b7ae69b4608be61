use super::*;

#[test]
fn png_roundtrip_preserves_straight_alpha() {
    let mut b = Bitmap::new(3, 2).unwrap();
    b.set_pixel(0, 0, [100, 50, 200, 128]);
    b.set_pixel(2, 1, [1, 2, 3, 255]);
    let png = encode_png(&b).unwrap();
    assert_eq!(&png[1..4], b"PNG");
    assert_eq!(decode_image(&png).unwrap(), b);
}

#[test]
fn garbage_is_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, ShunneiError::Decode(_)));
    assert!(err.to_string().starts_with("decode error:"));
}

#[test]
fn save_and_load_through_the_filesystem() {
    let dir = std::env::temp_dir().join(format!("shunnei-assets-{}", std::process::id()));
    let path = dir.join("nested").join("out.png");
    let b = Bitmap::filled(4, 4, [9, 8, 7, 255]).unwrap();
    save_png(&b, &path).unwrap();
    assert_eq!(load_image(&path).unwrap(), b);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_reported() {
    let err = load_image("/no/such/shunnei.png").unwrap_err();
    assert!(format!("{err}").contains("/no/such/shunnei.png"));
}
