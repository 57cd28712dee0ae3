use super::*;

fn text(id: &str, start: f64, end: f64) -> Element {
    Element::new(
        id,
        ElementBox::new(0.0, 0.0, 100.0, 50.0),
        start,
        end,
        ElementKind::Text(TextPayload {
            content: "hi".to_string(),
            font: FontSpec::default(),
            color: Rgba8::WHITE,
            align: TextAlign::Center,
        }),
    )
}

#[test]
fn element_json_uses_flat_type_tag() {
    let json = r##"{
        "id": "logo",
        "box": { "x": 10, "y": 20, "width": 200, "height": 100 },
        "start": 0.5,
        "end": 4,
        "z_order": 3,
        "type": "image",
        "source": "img/logo.png",
        "animation": { "type": "fadeIn", "duration": 1.0, "easing": "ease-out" }
    }"##;
    let el: Element = serde_json::from_str(json).unwrap();
    assert_eq!(el.z_order, 3);
    assert!(el.visible);
    assert_eq!(el.source(), Some("img/logo.png"));
    let anim = el.animation.unwrap();
    assert_eq!(anim.kind, AnimationKind::FadeIn);
    assert_eq!(anim.easing, Ease::EaseOut);
    assert_eq!(anim.direction, Direction::Forward);
    assert_eq!(anim.delay, 0.0);
}

#[test]
fn scene_json_roundtrip_preserves_fields() {
    let json = r##"{
        "id": "s1",
        "name": "Intro",
        "duration": 5,
        "background": { "type": "gradient", "from": "#000000", "to": "#ffffff", "angle_deg": 90 },
        "audio": { "narration": { "source": "vo.mp3", "volume": 0.8 } },
        "transition": { "type": "slideLeft", "duration": 0.5 },
        "elements": [
            { "id": "t", "box": { "x": 0, "y": 0, "width": 10, "height": 10 }, "start": 0, "end": 5,
              "type": "shape", "shape": "star", "fill": "#ff0000" }
        ]
    }"##;
    let scene: Scene = serde_json::from_str(json).unwrap();
    scene.validate().unwrap();
    assert_eq!(scene.transition.unwrap().kind, TransitionKind::SlideLeft);
    assert_eq!(scene.audio.as_ref().unwrap().narration.as_ref().unwrap().volume, 0.8);

    let back: Scene = serde_json::from_str(&serde_json::to_string(&scene).unwrap()).unwrap();
    assert_eq!(back, scene);
}

#[test]
fn element_window_is_validated() {
    text("a", 0.0, 5.0).validate(5.0).unwrap();
    assert!(text("a", 2.0, 2.0).validate(5.0).is_err());
    assert!(text("a", -1.0, 2.0).validate(5.0).is_err());
    assert!(text("a", 1.0, 6.0).validate(5.0).is_err());
}

#[test]
fn duplicate_element_ids_are_rejected() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements.push(text("a", 0.0, 1.0));
    scene.elements.push(text("a", 1.0, 2.0));
    let err = scene.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate element id"));
}

#[test]
fn scene_duration_must_be_positive() {
    assert!(Scene::new("s", "S", 0.0).validate().is_err());
    assert!(Scene::new("s", "S", f64::NAN).validate().is_err());
}

#[test]
fn animation_spec_validation() {
    AnimationSpec::new(AnimationKind::Rotate, 1.0).validate().unwrap();
    assert!(AnimationSpec::new(AnimationKind::Rotate, 0.0).validate().is_err());
    let mut spec = AnimationSpec::new(AnimationKind::Rotate, 1.0);
    spec.delay = -0.1;
    assert!(matches!(spec.validate(), Err(ReelError::Animation(_))));
}

#[test]
fn active_window_is_inclusive() {
    let el = text("a", 1.0, 2.0);
    assert!(!el.is_active(0.99));
    assert!(el.is_active(1.0));
    assert!(el.is_active(2.0));
    assert!(!el.is_active(2.01));
}
