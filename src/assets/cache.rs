use std::collections::HashMap;

use crate::{
    assets::{
        decode::{Bitmap, decode_image},
        resolver::{MediaResolver, MediaStream, StreamKind},
    },
    foundation::error::ResourceLoadError,
};

type StreamSlot = Result<Box<dyn MediaStream>, ResourceLoadError>;

/// Memoizing loader for images and playable media, keyed by source identifier.
///
/// Every source is fetched at most once: both decoded bitmaps and load failures are remembered
/// until [`MediaCache::invalidate`] forgets them. Streams opened through the cache are stopped
/// when the cache releases them or is dropped.
pub struct MediaCache {
    resolver: Box<dyn MediaResolver>,
    images: HashMap<String, Result<Bitmap, ResourceLoadError>>,
    streams: HashMap<(String, StreamKind), StreamSlot>,
}

impl MediaCache {
    pub fn new(resolver: impl MediaResolver + 'static) -> Self {
        Self::from_boxed(Box::new(resolver))
    }

    pub fn from_boxed(resolver: Box<dyn MediaResolver>) -> Self {
        Self {
            resolver,
            images: HashMap::new(),
            streams: HashMap::new(),
        }
    }

    /// Decoded image for `source`, fetching and decoding it on first use.
    pub fn load(&mut self, source: &str) -> Result<Bitmap, ResourceLoadError> {
        if let Some(cached) = self.images.get(source) {
            return cached.clone();
        }
        let loaded = self
            .resolver
            .fetch(source)
            .and_then(|bytes| decode_image(source, &bytes));
        match &loaded {
            Ok(bmp) => {
                tracing::debug!(source, width = bmp.width, height = bmp.height, "media loaded")
            }
            Err(err) => tracing::warn!(source, error = %err, "media load failed"),
        }
        self.images.insert(source.to_string(), loaded.clone());
        loaded
    }

    /// Whether `source` has a memoized image result, successful or not.
    pub fn is_cached(&self, source: &str) -> bool {
        self.images.contains_key(source)
    }

    /// Forget everything remembered for `source`, stopping its streams. Returns whether anything
    /// was cached.
    pub fn invalidate(&mut self, source: &str) -> bool {
        let had_image = self.images.remove(source).is_some();
        let keys: Vec<_> = self
            .streams
            .keys()
            .filter(|(s, _)| s == source)
            .cloned()
            .collect();
        let had_stream = !keys.is_empty();
        for key in keys {
            if let Some(Ok(mut stream)) = self.streams.remove(&key) {
                stream.stop();
            }
        }
        had_image || had_stream
    }

    /// Stream for `(source, kind)`, opening it on first use. Open failures are memoized.
    pub fn stream(
        &mut self,
        source: &str,
        kind: StreamKind,
    ) -> Result<&mut dyn MediaStream, ResourceLoadError> {
        let key = (source.to_string(), kind);
        let resolver = &self.resolver;
        let slot = self.streams.entry(key).or_insert_with(|| {
            let opened = resolver.open_stream(source, kind);
            match &opened {
                Ok(_) => tracing::debug!(source, ?kind, "media stream opened"),
                Err(err) => tracing::warn!(source, ?kind, error = %err, "media stream failed"),
            }
            opened
        });
        match slot {
            Ok(stream) => Ok(stream.as_mut()),
            Err(err) => Err(err.clone()),
        }
    }

    /// Frame of the video `source` at `t` seconds into the clip.
    ///
    /// `Ok(None)` means the stream is open but has nothing to show at `t`.
    pub fn video_frame(
        &mut self,
        source: &str,
        t: f64,
    ) -> Result<Option<Bitmap>, ResourceLoadError> {
        let stream = self.stream(source, StreamKind::Video)?;
        Ok(stream.frame_at(t.max(0.0)))
    }

    /// Streams currently held open.
    pub fn open_streams(&self) -> usize {
        self.streams.values().filter(|s| s.is_ok()).count()
    }

    /// Pause every held stream without releasing it.
    pub fn pause_all(&mut self) {
        for stream in self.streams.values_mut().flatten() {
            stream.pause();
        }
    }

    /// Stop and drop every held stream. Failed stream opens are forgotten too, so the next
    /// playback retries them.
    pub fn release_streams(&mut self) {
        let released = self.open_streams();
        for (_, slot) in self.streams.drain() {
            if let Ok(mut stream) = slot {
                stream.stop();
            }
        }
        if released > 0 {
            tracing::debug!(released, "media streams released");
        }
    }
}

impl Drop for MediaCache {
    fn drop(&mut self) {
        self.release_streams();
    }
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("images", &self.images.len())
            .field("streams", &self.streams.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
