//! Scene graph data model: scenes, elements, animation and transition specifications.

pub mod color;
pub mod graph;
pub mod model;
