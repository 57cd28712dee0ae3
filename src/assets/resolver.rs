use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{assets::decode::Bitmap, foundation::error::ResourceLoadError};

/// Role a playable stream serves in the preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Video clip shown by a video element.
    Video,
    /// Scene narration track.
    Narration,
    /// Scene background music.
    Music,
}

/// Host-provided source of media bytes and playable streams.
pub trait MediaResolver {
    /// Fetch the encoded bytes behind `source`.
    fn fetch(&self, source: &str) -> Result<Vec<u8>, ResourceLoadError>;

    /// Open a playable stream for `source`.
    ///
    /// Resolvers without a media backend keep the default, which reports
    /// [`ResourceLoadError::Unsupported`].
    fn open_stream(
        &self,
        source: &str,
        kind: StreamKind,
    ) -> Result<Box<dyn MediaStream>, ResourceLoadError> {
        Err(ResourceLoadError::Unsupported {
            source_id: source.to_string(),
            message: format!("{kind:?} streams are not available from this resolver"),
        })
    }
}

/// Playable media handle (video or audio) held by the cache.
pub trait MediaStream {
    /// Frame to show at `t` seconds into the clip; audio streams return `None`.
    fn frame_at(&mut self, _t: f64) -> Option<Bitmap> {
        None
    }
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, t: f64);
    /// Linear output gain in `[0, 1]`.
    fn set_volume(&mut self, gain: f64);
    /// Stop playback and release the underlying handle. Further calls are no-ops.
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Resolves sources as paths relative to a project directory.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MediaResolver for FsResolver {
    fn fetch(&self, source: &str) -> Result<Vec<u8>, ResourceLoadError> {
        let norm = normalize_rel_path(source).map_err(|message| ResourceLoadError::Fetch {
            source_id: source.to_string(),
            message,
        })?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ResourceLoadError::NotFound {
                source_id: source.to_string(),
            },
            _ => ResourceLoadError::Fetch {
                source_id: source.to_string(),
                message: format!("read '{}': {e}", p.display()),
            },
        })
    }
}

/// Normalize and validate project-relative media paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> Result<String, String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err("media paths must be relative".to_string());
    }
    if s.is_empty() {
        return Err("media path must be non-empty".to_string());
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err("media paths must not contain '..'".to_string());
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err("media path must contain a file name".to_string());
    }

    Ok(out.join("/"))
}

/// Observable state of a stream opened from a [`MemoryResolver`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamStatus {
    pub playing: bool,
    pub position: f64,
    pub gain: f64,
    pub stopped: bool,
}

#[derive(Default)]
struct MemoryInner {
    blobs: HashMap<String, Vec<u8>>,
    failures: HashMap<String, ResourceLoadError>,
    frames: HashMap<String, Option<Bitmap>>,
    fetches: HashMap<String, usize>,
    opened: Vec<(String, StreamKind, Rc<RefCell<StreamStatus>>)>,
}

/// In-memory resolver for embedding hosts and tests.
///
/// Clones share the same store, so a caller can keep a handle to inspect fetch counts and stream
/// state after handing a clone to a [`crate::assets::cache::MediaCache`].
#[derive(Clone, Default)]
pub struct MemoryResolver {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `source`.
    pub fn insert(&self, source: impl Into<String>, bytes: Vec<u8>) {
        self.inner.borrow_mut().blobs.insert(source.into(), bytes);
    }

    /// Make every fetch of `source` fail with `err`.
    pub fn fail(&self, source: impl Into<String>, err: ResourceLoadError) {
        self.inner.borrow_mut().failures.insert(source.into(), err);
    }

    /// Make `source` openable as a stream; video streams show `frame` at every time.
    pub fn insert_stream(&self, source: impl Into<String>, frame: Option<Bitmap>) {
        self.inner.borrow_mut().frames.insert(source.into(), frame);
    }

    /// Number of `fetch` calls seen for `source`.
    pub fn fetch_count(&self, source: &str) -> usize {
        self.inner.borrow().fetches.get(source).copied().unwrap_or(0)
    }

    /// Number of streams opened so far, across all sources.
    pub fn opened_streams(&self) -> usize {
        self.inner.borrow().opened.len()
    }

    /// State of the most recently opened stream for `(source, kind)`.
    pub fn stream_status(&self, source: &str, kind: StreamKind) -> Option<StreamStatus> {
        self.inner
            .borrow()
            .opened
            .iter()
            .rev()
            .find(|(s, k, _)| s == source && *k == kind)
            .map(|(_, _, st)| st.borrow().clone())
    }
}

impl MediaResolver for MemoryResolver {
    fn fetch(&self, source: &str) -> Result<Vec<u8>, ResourceLoadError> {
        let mut inner = self.inner.borrow_mut();
        *inner.fetches.entry(source.to_string()).or_default() += 1;
        if let Some(err) = inner.failures.get(source) {
            return Err(err.clone());
        }
        inner
            .blobs
            .get(source)
            .cloned()
            .ok_or_else(|| ResourceLoadError::NotFound {
                source_id: source.to_string(),
            })
    }

    fn open_stream(
        &self,
        source: &str,
        kind: StreamKind,
    ) -> Result<Box<dyn MediaStream>, ResourceLoadError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(err) = inner.failures.get(source) {
            return Err(err.clone());
        }
        let Some(frame) = inner.frames.get(source).cloned() else {
            return Err(ResourceLoadError::NotFound {
                source_id: source.to_string(),
            });
        };
        let status = Rc::new(RefCell::new(StreamStatus {
            gain: 1.0,
            ..StreamStatus::default()
        }));
        inner
            .opened
            .push((source.to_string(), kind, Rc::clone(&status)));
        Ok(Box::new(MemoryStream {
            frame: frame.filter(|_| kind == StreamKind::Video),
            status,
        }))
    }
}

struct MemoryStream {
    frame: Option<Bitmap>,
    status: Rc<RefCell<StreamStatus>>,
}

impl MediaStream for MemoryStream {
    fn frame_at(&mut self, t: f64) -> Option<Bitmap> {
        let mut st = self.status.borrow_mut();
        if st.stopped {
            return None;
        }
        st.position = t;
        self.frame.clone()
    }

    fn play(&mut self) {
        let mut st = self.status.borrow_mut();
        if !st.stopped {
            st.playing = true;
        }
    }

    fn pause(&mut self) {
        self.status.borrow_mut().playing = false;
    }

    fn seek(&mut self, t: f64) {
        let mut st = self.status.borrow_mut();
        if !st.stopped {
            st.position = t.max(0.0);
        }
    }

    fn set_volume(&mut self, gain: f64) {
        self.status.borrow_mut().gain = gain.clamp(0.0, 1.0);
    }

    fn stop(&mut self) {
        let mut st = self.status.borrow_mut();
        st.playing = false;
        st.stopped = true;
    }

    fn is_playing(&self) -> bool {
        self.status.borrow().playing
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
