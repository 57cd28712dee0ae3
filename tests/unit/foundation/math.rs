use super::*;

#[test]
fn fnv_is_stable_and_order_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"ab");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"a");
    b.write_bytes(b"b");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"ba");
    assert_ne!(a.finish(), c.finish());

    let mut d = Fnv1a64::new_default();
    d.write_u64(7);
    assert_ne!(d.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn clamp01_handles_nan_and_bounds() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-1.0), 0.0);
    assert_eq!(clamp01(2.0), 1.0);
    assert_eq!(clamp01(0.25), 0.25);
}

#[test]
fn lerp_u8_rounds_and_saturates() {
    assert_eq!(lerp_u8(0, 255, 0.5), 128);
    assert_eq!(lerp_u8(10, 20, 0.0), 10);
    assert_eq!(lerp_u8(10, 20, 1.0), 20);
    assert_eq!(lerp_u8(0, 255, 2.0), 255);
}
