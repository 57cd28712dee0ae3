#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod foundation;
pub mod history;
pub mod render;
pub mod scene;
pub mod timeline;

pub use animation::{
    ease::Ease,
    evaluate::{ElementState, evaluate},
    transition::{TransitionState, resolve_transition},
};
pub use assets::{
    cache::MediaCache,
    decode::Bitmap,
    resolver::{FsResolver, MediaResolver, MediaStream, MemoryResolver, StreamKind},
};
pub use foundation::{
    config::{PreviewConfig, Quality},
    core::{Canvas, Rgba8, Transform2D},
    error::{ReelError, ReelResult, ResourceLoadError},
};
pub use history::{
    action::{ActionKind, HistoryAction, Patch},
    editor::Editor,
    stack::History,
};
pub use render::{
    FrameRGBA,
    compositor::{Compositor, FrameReport, RenderError},
    cpu::CpuSurface,
    recording::RecordingSurface,
    surface::{Paint, Surface},
};
pub use scene::{
    graph::{SceneGraph, SceneLocation},
    model::{Element, ElementKind, Scene},
};
pub use timeline::{
    clock::{TickScheduler, VirtualScheduler, WallScheduler},
    events::Subscription,
    markers::{Marker, MarkerKind},
    player::{PlaybackState, Player, SceneChange, StateChange, TimeUpdate},
};
