use crate::{foundation::core::Rgba8, scene::graph::SceneGraph};

const SCENE_MARKER_COLOR: Rgba8 = Rgba8::rgb(120, 120, 128);
const CUSTOM_MARKER_COLOR: Rgba8 = Rgba8::rgb(255, 196, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Derived from a scene start; not removable.
    Scene,
    Custom,
}

/// Advisory point on the timeline. Markers never affect playback.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    pub id: String,
    /// Absolute time in seconds.
    pub time: f64,
    pub label: String,
    pub color: Rgba8,
    pub kind: MarkerKind,
}

/// User markers plus the scene markers derived from a graph.
#[derive(Clone, Debug, Default)]
pub struct Markers {
    next_id: u64,
    custom: Vec<Marker>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom marker and return its id. Negative or non-finite times are pinned to 0.
    pub fn add(&mut self, time: f64, label: impl Into<String>) -> String {
        self.add_colored(time, label, CUSTOM_MARKER_COLOR)
    }

    pub fn add_colored(&mut self, time: f64, label: impl Into<String>, color: Rgba8) -> String {
        self.next_id += 1;
        let id = format!("marker-{}", self.next_id);
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let at = self.custom.partition_point(|m| m.time <= time);
        self.custom.insert(
            at,
            Marker {
                id: id.clone(),
                time,
                label: label.into(),
                color,
                kind: MarkerKind::Custom,
            },
        );
        id
    }

    /// Remove a custom marker. Scene markers and unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|m| m.id != id);
        self.custom.len() != before
    }

    /// Custom markers ordered by time.
    pub fn custom(&self) -> &[Marker] {
        &self.custom
    }

    /// One marker per scene start, labelled with the scene name.
    pub fn scene_markers(graph: &SceneGraph) -> Vec<Marker> {
        graph
            .scenes
            .iter()
            .zip(graph.boundaries())
            .map(|(scene, time)| Marker {
                id: format!("scene:{}", scene.id),
                time,
                label: scene.name.clone(),
                color: SCENE_MARKER_COLOR,
                kind: MarkerKind::Scene,
            })
            .collect()
    }

    /// Scene and custom markers merged by time; scene markers sort first on ties.
    pub fn all(&self, graph: &SceneGraph) -> Vec<Marker> {
        let mut out = Self::scene_markers(graph);
        out.extend(self.custom.iter().cloned());
        out.sort_by(|a, b| a.time.total_cmp(&b.time));
        out
    }

    /// `t` moved to the nearest marker, scene boundary or timeline end within `tolerance`
    /// seconds; `t` unchanged when none is that close.
    pub fn snap(&self, graph: &SceneGraph, t: f64, tolerance: f64) -> f64 {
        if !t.is_finite() || !(tolerance >= 0.0) {
            return t;
        }
        graph
            .boundaries()
            .into_iter()
            .chain(std::iter::once(graph.total_duration()))
            .chain(self.custom.iter().map(|m| m.time))
            .map(|c| (c, (c - t).abs()))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(t, |(c, _)| c)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/markers.rs"]
mod tests;
