use std::io::Cursor;

use super::*;
use crate::assets::resolver::MemoryResolver;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn repeated_loads_fetch_once() {
    let r = MemoryResolver::new();
    r.insert("logo.png", png(3, 2));
    let mut cache = MediaCache::new(r.clone());

    let a = cache.load("logo.png").unwrap();
    let b = cache.load("logo.png").unwrap();
    assert_eq!(a, b);
    assert_eq!((a.width, a.height), (3, 2));
    assert_eq!(r.fetch_count("logo.png"), 1);
}

#[test]
fn failures_are_memoized_until_invalidated() {
    let r = MemoryResolver::new();
    let mut cache = MediaCache::new(r.clone());

    assert!(matches!(
        cache.load("late.png"),
        Err(ResourceLoadError::NotFound { .. })
    ));
    assert!(cache.load("late.png").is_err());
    assert_eq!(r.fetch_count("late.png"), 1);

    r.insert("late.png", png(1, 1));
    assert!(cache.invalidate("late.png"));
    assert!(!cache.is_cached("late.png"));
    assert!(cache.load("late.png").is_ok());
    assert_eq!(r.fetch_count("late.png"), 2);
}

#[test]
fn decode_failure_surfaces_as_decode_error() {
    let r = MemoryResolver::new();
    r.insert("broken.png", b"nope".to_vec());
    let mut cache = MediaCache::new(r);
    assert!(matches!(
        cache.load("broken.png"),
        Err(ResourceLoadError::Decode { .. })
    ));
}

#[test]
fn video_frames_come_from_one_stream() {
    let r = MemoryResolver::new();
    r.insert_stream("clip.mp4", Some(Bitmap::solid(4, 4, [0, 0, 255, 255])));
    let mut cache = MediaCache::new(r.clone());

    let f1 = cache.video_frame("clip.mp4", 0.5).unwrap().unwrap();
    let f2 = cache.video_frame("clip.mp4", 1.0).unwrap().unwrap();
    assert_eq!(f1.key, f2.key);
    assert_eq!(r.opened_streams(), 1);
    assert_eq!(cache.open_streams(), 1);

    assert!(cache.video_frame("missing.mp4", 0.0).is_err());
    assert!(cache.video_frame("missing.mp4", 0.0).is_err());
    assert_eq!(cache.open_streams(), 1);
}

#[test]
fn pause_and_release_control_streams() {
    let r = MemoryResolver::new();
    r.insert_stream("music.mp3", None);
    let mut cache = MediaCache::new(r.clone());

    cache.stream("music.mp3", StreamKind::Music).unwrap().play();
    assert!(r.stream_status("music.mp3", StreamKind::Music).unwrap().playing);

    cache.pause_all();
    let st = r.stream_status("music.mp3", StreamKind::Music).unwrap();
    assert!(!st.playing);
    assert!(!st.stopped);

    cache.release_streams();
    assert!(r.stream_status("music.mp3", StreamKind::Music).unwrap().stopped);
    assert_eq!(cache.open_streams(), 0);
}

#[test]
fn drop_stops_streams() {
    let r = MemoryResolver::new();
    r.insert_stream("voice.mp3", None);
    {
        let mut cache = MediaCache::new(r.clone());
        cache.stream("voice.mp3", StreamKind::Narration).unwrap().play();
    }
    let st = r.stream_status("voice.mp3", StreamKind::Narration).unwrap();
    assert!(st.stopped);
    assert!(!st.playing);
}
