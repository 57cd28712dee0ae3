use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::error::{ReelError, ReelResult},
    scene::model::Scene,
};

/// Ordered scenes making up one timeline.
///
/// This is the JSON-facing document the editor mutates and the player reads. Scenes play back to
/// back in list order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneGraph {
    pub scenes: Vec<Scene>,
}

/// Global time resolved against the scene list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLocation {
    pub index: usize,
    /// Seconds since the start of the scene at `index`.
    pub scene_time: f64,
}

impl SceneGraph {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    /// Parse a scene graph from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse scene graph JSON: {e}")))
    }

    /// Parse a scene graph from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open scene graph JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelError::serde(e.to_string()))
    }

    pub fn validate(&self) -> ReelResult<()> {
        for (i, scene) in self.scenes.iter().enumerate() {
            if self.scenes[..i].iter().any(|s| s.id == scene.id) {
                return Err(ReelError::validation(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
            scene.validate()?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Sum of all scene durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.scenes.iter().map(|s| s.duration).sum()
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == id)
    }

    pub fn scene_index(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    /// Global start time of the scene at `index`, or `None` when out of range.
    pub fn scene_start(&self, index: usize) -> Option<f64> {
        (index < self.scenes.len()).then(|| self.scenes[..index].iter().map(|s| s.duration).sum())
    }

    /// Global start time of every scene, in order. The first entry is always 0.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut acc = 0.0;
        self.scenes
            .iter()
            .map(|s| {
                let start = acc;
                acc += s.duration;
                start
            })
            .collect()
    }

    /// Map global time `t` onto a scene.
    ///
    /// Scene windows are half-open `[start, start + duration)`. Times at or past the total resolve
    /// to the last scene at its final instant; negative times resolve to the first scene at 0.
    /// Returns `None` for an empty graph.
    pub fn locate(&self, t: f64) -> Option<SceneLocation> {
        let last = self.scenes.len().checked_sub(1)?;
        let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
        let mut start = 0.0;
        for (index, scene) in self.scenes.iter().enumerate() {
            let end = start + scene.duration;
            if t < end {
                return Some(SceneLocation {
                    index,
                    scene_time: t - start,
                });
            }
            start = end;
        }
        Some(SceneLocation {
            index: last,
            scene_time: self.scenes[last].duration,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
