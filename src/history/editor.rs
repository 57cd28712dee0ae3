use crate::{
    foundation::error::{ReelError, ReelResult},
    history::{
        action::{ActionKind, HistoryAction, Patch},
        stack::History,
    },
    scene::{
        graph::SceneGraph,
        model::{Element, Scene},
    },
};

/// Owner of the editable scene graph. Every mutation goes through here and is recorded.
#[derive(Clone, Debug, Default)]
pub struct Editor {
    graph: SceneGraph,
    history: History,
}

impl Editor {
    pub fn new(graph: SceneGraph, history_capacity: usize) -> Self {
        Self {
            graph,
            history: History::new(history_capacity),
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SceneGraph {
        self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn undo(&mut self) -> ReelResult<bool> {
        self.history.undo(&mut self.graph)
    }

    pub fn redo(&mut self) -> ReelResult<bool> {
        self.history.redo(&mut self.graph)
    }

    /// Insert `scene` at `index`, or append it when `index` is `None`.
    pub fn add_scene(&mut self, scene: Scene, index: Option<usize>) -> ReelResult<()> {
        scene.validate()?;
        if self.graph.scene_index(&scene.id).is_some() {
            return Err(ReelError::validation(format!(
                "duplicate scene id '{}'",
                scene.id
            )));
        }
        let index = index.unwrap_or(self.graph.len()).min(self.graph.len());
        let target = scene.id.clone();
        self.commit(HistoryAction::new(
            ActionKind::AddScene,
            target,
            Patch::InsertScene { index, scene },
            Patch::RemoveScene { index },
        ))
    }

    /// Remove the scene `id` and return it.
    pub fn delete_scene(&mut self, id: &str) -> ReelResult<Scene> {
        let index = self.scene_position(id)?;
        let scene = self.graph.scenes[index].clone();
        self.commit(HistoryAction::new(
            ActionKind::DeleteScene,
            id,
            Patch::RemoveScene { index },
            Patch::InsertScene {
                index,
                scene: scene.clone(),
            },
        ))?;
        Ok(scene)
    }

    /// Edit scene `id` in place. The id may not change; edits that change nothing are not
    /// recorded.
    pub fn update_scene(&mut self, id: &str, edit: impl FnOnce(&mut Scene)) -> ReelResult<()> {
        let index = self.scene_position(id)?;
        let before = self.graph.scenes[index].clone();
        let mut after = before.clone();
        edit(&mut after);
        if after.id != before.id {
            return Err(ReelError::validation(format!("scene '{id}' cannot be renamed")));
        }
        after.validate()?;
        if after == before {
            return Ok(());
        }
        self.commit(HistoryAction::new(
            ActionKind::UpdateScene,
            id,
            Patch::ReplaceScene {
                index,
                scene: after,
            },
            Patch::ReplaceScene {
                index,
                scene: before,
            },
        ))
    }

    /// Move scene `id` to position `to` (clamped to the last position).
    pub fn move_scene(&mut self, id: &str, to: usize) -> ReelResult<()> {
        let from = self.scene_position(id)?;
        let to = to.min(self.graph.len().saturating_sub(1));
        if from == to {
            return Ok(());
        }
        self.commit(HistoryAction::new(
            ActionKind::MoveScene,
            id,
            Patch::MoveScene { from, to },
            Patch::MoveScene { from: to, to: from },
        ))
    }

    /// Append `element` to scene `scene_id`.
    pub fn add_element(&mut self, scene_id: &str, element: Element) -> ReelResult<()> {
        let si = self.scene_position(scene_id)?;
        let scene = &self.graph.scenes[si];
        element.validate(scene.duration)?;
        if scene.element(&element.id).is_some() {
            return Err(ReelError::validation(format!(
                "duplicate element id '{}' in scene '{scene_id}'",
                element.id
            )));
        }
        let index = scene.elements.len();
        let target = element.id.clone();
        self.commit(HistoryAction::new(
            ActionKind::AddElement,
            target,
            Patch::InsertElement {
                scene_id: scene_id.to_string(),
                index,
                element,
            },
            Patch::RemoveElement {
                scene_id: scene_id.to_string(),
                index,
            },
        ))
    }

    /// Remove element `element_id` from scene `scene_id` and return it.
    pub fn delete_element(&mut self, scene_id: &str, element_id: &str) -> ReelResult<Element> {
        let (si, index) = self.element_position(scene_id, element_id)?;
        let element = self.graph.scenes[si].elements[index].clone();
        self.commit(HistoryAction::new(
            ActionKind::DeleteElement,
            element_id,
            Patch::RemoveElement {
                scene_id: scene_id.to_string(),
                index,
            },
            Patch::InsertElement {
                scene_id: scene_id.to_string(),
                index,
                element: element.clone(),
            },
        ))?;
        Ok(element)
    }

    /// Edit an element in place. The id may not change; no-op edits are not recorded.
    pub fn update_element(
        &mut self,
        scene_id: &str,
        element_id: &str,
        edit: impl FnOnce(&mut Element),
    ) -> ReelResult<()> {
        self.edit_element(ActionKind::UpdateElement, scene_id, element_id, edit)
    }

    /// Place the element's top-left corner at `(x, y)`.
    pub fn move_element(
        &mut self,
        scene_id: &str,
        element_id: &str,
        x: f64,
        y: f64,
    ) -> ReelResult<()> {
        self.edit_element(ActionKind::MoveElement, scene_id, element_id, |el| {
            el.bounds.x = x;
            el.bounds.y = y;
        })
    }

    /// Set the element's size, keeping its top-left corner.
    pub fn resize_element(
        &mut self,
        scene_id: &str,
        element_id: &str,
        width: f64,
        height: f64,
    ) -> ReelResult<()> {
        self.edit_element(ActionKind::ResizeElement, scene_id, element_id, |el| {
            el.bounds.width = width;
            el.bounds.height = height;
        })
    }

    fn edit_element(
        &mut self,
        kind: ActionKind,
        scene_id: &str,
        element_id: &str,
        edit: impl FnOnce(&mut Element),
    ) -> ReelResult<()> {
        let (si, index) = self.element_position(scene_id, element_id)?;
        let scene = &self.graph.scenes[si];
        let before = scene.elements[index].clone();
        let mut after = before.clone();
        edit(&mut after);
        if after.id != before.id {
            return Err(ReelError::validation(format!(
                "element '{element_id}' cannot be renamed"
            )));
        }
        after.validate(scene.duration)?;
        if after == before {
            return Ok(());
        }
        self.commit(HistoryAction::new(
            kind,
            element_id,
            Patch::ReplaceElement {
                scene_id: scene_id.to_string(),
                index,
                element: after,
            },
            Patch::ReplaceElement {
                scene_id: scene_id.to_string(),
                index,
                element: before,
            },
        ))
    }

    fn commit(&mut self, action: HistoryAction) -> ReelResult<()> {
        action.forward.apply(&mut self.graph)?;
        self.history.record(action);
        Ok(())
    }

    fn scene_position(&self, id: &str) -> ReelResult<usize> {
        self.graph
            .scene_index(id)
            .ok_or_else(|| ReelError::validation(format!("unknown scene '{id}'")))
    }

    fn element_position(&self, scene_id: &str, element_id: &str) -> ReelResult<(usize, usize)> {
        let si = self.scene_position(scene_id)?;
        let index = self.graph.scenes[si].element_index(element_id).ok_or_else(|| {
            ReelError::validation(format!(
                "unknown element '{element_id}' in scene '{scene_id}'"
            ))
        })?;
        Ok((si, index))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/editor.rs"]
mod tests;
