use super::*;
use crate::{
    foundation::core::Rgba8,
    scene::model::{ElementBox, ElementKind, FontSpec, TextAlign, TextPayload},
};

fn text(id: &str) -> Element {
    Element::new(
        id,
        ElementBox::new(10.0, 20.0, 300.0, 80.0),
        0.0,
        4.0,
        ElementKind::Text(TextPayload {
            content: id.to_string(),
            font: FontSpec::default(),
            color: Rgba8::WHITE,
            align: TextAlign::Left,
        }),
    )
}

fn editor() -> Editor {
    let mut intro = Scene::new("intro", "Intro", 5.0);
    intro.elements.push(text("title"));
    Editor::new(
        SceneGraph::new(vec![intro, Scene::new("outro", "Outro", 3.0)]),
        100,
    )
}

#[test]
fn add_scene_round_trips_through_undo() {
    let mut ed = editor();
    let before = ed.graph().clone();
    ed.add_scene(Scene::new("middle", "Middle", 2.0), Some(1)).unwrap();
    let after = ed.graph().clone();
    assert_eq!(after.scenes[1].id, "middle");

    assert!(ed.undo().unwrap());
    assert_eq!(*ed.graph(), before);
    assert!(ed.redo().unwrap());
    assert_eq!(*ed.graph(), after);
}

#[test]
fn rejects_duplicates_and_invalid_scenes_without_recording() {
    let mut ed = editor();
    assert!(ed.add_scene(Scene::new("intro", "Again", 1.0), None).is_err());
    assert!(ed.add_scene(Scene::new("zero", "Zero", 0.0), None).is_err());
    assert!(ed.add_element("intro", text("title")).is_err());
    assert!(!ed.history().can_undo());
}

#[test]
fn delete_scene_restores_in_place() {
    let mut ed = editor();
    let before = ed.graph().clone();
    let removed = ed.delete_scene("intro").unwrap();
    assert_eq!(removed.elements.len(), 1);
    assert_eq!(ed.graph().len(), 1);
    ed.undo().unwrap();
    assert_eq!(*ed.graph(), before);
}

#[test]
fn update_scene_records_only_real_changes() {
    let mut ed = editor();
    ed.update_scene("outro", |s| s.name = "Outro".into()).unwrap();
    assert!(!ed.history().can_undo());

    ed.update_scene("outro", |s| s.duration = 6.0).unwrap();
    assert_eq!(ed.graph().total_duration(), 11.0);
    assert!(ed.update_scene("outro", |s| s.id = "renamed".into()).is_err());
    ed.undo().unwrap();
    assert_eq!(ed.graph().total_duration(), 8.0);
}

#[test]
fn move_scene_reorders_and_undoes() {
    let mut ed = editor();
    ed.move_scene("intro", 9).unwrap();
    let order: Vec<&str> = ed.graph().scenes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(order, ["outro", "intro"]);
    assert_eq!(ed.history().peek_undo().unwrap().kind, ActionKind::MoveScene);
    ed.undo().unwrap();
    assert_eq!(ed.graph().scenes[0].id, "intro");
}

#[test]
fn element_edits_are_each_undoable() {
    let mut ed = editor();
    let pristine = ed.graph().clone();

    ed.add_element("intro", text("subtitle")).unwrap();
    ed.move_element("intro", "title", 100.0, 200.0).unwrap();
    ed.resize_element("intro", "title", 640.0, 120.0).unwrap();
    ed.update_element("intro", "title", |el| el.z_order = 3).unwrap();
    ed.delete_element("intro", "subtitle").unwrap();
    assert_eq!(ed.history().undo_depth(), 5);

    let title = ed.graph().scene("intro").unwrap().element("title").unwrap();
    assert_eq!(
        (title.bounds.x, title.bounds.y, title.bounds.width, title.bounds.height),
        (100.0, 200.0, 640.0, 120.0)
    );
    assert_eq!(title.z_order, 3);

    while ed.undo().unwrap() {}
    assert_eq!(*ed.graph(), pristine);
    assert_eq!(ed.history().redo_depth(), 5);
}

#[test]
fn invalid_element_edits_are_rejected() {
    let mut ed = editor();
    assert!(ed.resize_element("intro", "title", -1.0, 10.0).is_err());
    assert!(ed.update_element("intro", "title", |el| el.end = 50.0).is_err());
    assert!(ed.move_element("intro", "ghost", 0.0, 0.0).is_err());
    assert!(ed.delete_element("nowhere", "title").is_err());
    assert!(!ed.history().can_undo());
}
