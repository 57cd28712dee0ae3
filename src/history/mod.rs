//! Reversible edits over the scene graph: patches, bounded undo/redo stacks and the editor that
//! records every mutation.

pub mod action;
pub mod editor;
pub mod stack;
