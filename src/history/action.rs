use crate::{
    foundation::error::{ReelError, ReelResult},
    scene::{
        graph::SceneGraph,
        model::{Element, Scene},
    },
};

/// One structural change to a [`SceneGraph`].
///
/// Patches carry the full payload they install, so a patch and its inverse are plain data and
/// can be replayed any number of times.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    InsertScene {
        index: usize,
        scene: Scene,
    },
    RemoveScene {
        index: usize,
    },
    ReplaceScene {
        index: usize,
        scene: Scene,
    },
    /// Remove the scene at `from`, then insert it at `to`.
    MoveScene {
        from: usize,
        to: usize,
    },
    InsertElement {
        scene_id: String,
        index: usize,
        element: Element,
    },
    RemoveElement {
        scene_id: String,
        index: usize,
    },
    ReplaceElement {
        scene_id: String,
        index: usize,
        element: Element,
    },
}

impl Patch {
    /// Apply the patch. Out-of-range indices and unknown scenes leave the graph untouched.
    pub fn apply(&self, graph: &mut SceneGraph) -> ReelResult<()> {
        let scenes = graph.scenes.len();
        match self {
            Self::InsertScene { index, scene } => {
                check_index(*index, scenes + 1, "scene insert")?;
                graph.scenes.insert(*index, scene.clone());
            }
            Self::RemoveScene { index } => {
                check_index(*index, scenes, "scene remove")?;
                graph.scenes.remove(*index);
            }
            Self::ReplaceScene { index, scene } => {
                check_index(*index, scenes, "scene replace")?;
                graph.scenes[*index] = scene.clone();
            }
            Self::MoveScene { from, to } => {
                check_index(*from, scenes, "scene move source")?;
                check_index(*to, scenes, "scene move target")?;
                let scene = graph.scenes.remove(*from);
                graph.scenes.insert(*to, scene);
            }
            Self::InsertElement {
                scene_id,
                index,
                element,
            } => {
                let scene = scene_mut(graph, scene_id)?;
                check_index(*index, scene.elements.len() + 1, "element insert")?;
                scene.elements.insert(*index, element.clone());
            }
            Self::RemoveElement { scene_id, index } => {
                let scene = scene_mut(graph, scene_id)?;
                check_index(*index, scene.elements.len(), "element remove")?;
                scene.elements.remove(*index);
            }
            Self::ReplaceElement {
                scene_id,
                index,
                element,
            } => {
                let scene = scene_mut(graph, scene_id)?;
                check_index(*index, scene.elements.len(), "element replace")?;
                scene.elements[*index] = element.clone();
            }
        }
        Ok(())
    }
}

fn check_index(index: usize, len: usize, what: &str) -> ReelResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(ReelError::validation(format!(
            "{what} index {index} out of range (len {len})"
        )))
    }
}

fn scene_mut<'a>(graph: &'a mut SceneGraph, id: &str) -> ReelResult<&'a mut Scene> {
    graph
        .scene_mut(id)
        .ok_or_else(|| ReelError::validation(format!("unknown scene '{id}'")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddScene,
    DeleteScene,
    UpdateScene,
    MoveScene,
    AddElement,
    DeleteElement,
    UpdateElement,
    MoveElement,
    ResizeElement,
}

impl ActionKind {
    /// Short label for undo/redo menus.
    pub fn label(self) -> &'static str {
        match self {
            Self::AddScene => "Add scene",
            Self::DeleteScene => "Delete scene",
            Self::UpdateScene => "Edit scene",
            Self::MoveScene => "Reorder scene",
            Self::AddElement => "Add element",
            Self::DeleteElement => "Delete element",
            Self::UpdateElement => "Edit element",
            Self::MoveElement => "Move element",
            Self::ResizeElement => "Resize element",
        }
    }
}

/// A reversible edit: applying `inverse` right after `forward` restores the graph exactly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryAction {
    pub kind: ActionKind,
    /// Id of the scene or element the edit targets.
    pub target: String,
    pub forward: Patch,
    pub inverse: Patch,
}

impl HistoryAction {
    pub fn new(
        kind: ActionKind,
        target: impl Into<String>,
        forward: Patch,
        inverse: Patch,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            forward,
            inverse,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/action.rs"]
mod tests;
