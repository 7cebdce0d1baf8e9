use super::*;

#[test]
fn json_uses_editor_field_names() {
    let json = r##"{"type":"color","intensity":50,"color":"#ff9d00"}"##;
    let effect: EffectDescriptor = serde_json::from_str(json).unwrap();
    assert_eq!(effect.kind, EffectKind::Color);
    assert_eq!(effect.intensity, 50);
    assert_eq!(effect.color.as_deref(), Some("#ff9d00"));
    assert_eq!(effect.direction, None);

    let back = serde_json::to_string(&effect).unwrap();
    assert_eq!(back, json);
}

#[test]
fn keyframes_survive_a_serde_trip() {
    let effect = EffectDescriptor::zoom(Direction::In, 80).with_keyframes(vec![
        Keyframe {
            position: 0.0,
            intensity: 20.0,
        },
        Keyframe {
            position: 100.0,
            intensity: 90.5,
        },
    ]);
    let json = serde_json::to_string(&effect).unwrap();
    let back: EffectDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(back, effect);
}

#[test]
fn unknown_type_deserializes_to_unsupported() {
    let effect: EffectDescriptor =
        serde_json::from_str(r#"{"type":"wobble","intensity":40}"#).unwrap();
    assert_eq!(effect.kind, EffectKind::Unsupported);
    assert!(effect.validate().is_err());
}

#[test]
fn resolved_direction_falls_back_per_kind() {
    assert_eq!(
        EffectDescriptor::new(EffectKind::Fade, 50).resolved_direction(),
        Some(Direction::In)
    );
    assert_eq!(
        EffectDescriptor::new(EffectKind::Rotate, 50).resolved_direction(),
        Some(Direction::Clockwise)
    );
    assert_eq!(
        EffectDescriptor::new(EffectKind::Move, 50).resolved_direction(),
        Some(Direction::Right)
    );
    // Invalid combination is ignored, not fatal.
    assert_eq!(
        EffectDescriptor::zoom(Direction::Left, 50).resolved_direction(),
        Some(Direction::In)
    );
    assert_eq!(
        EffectDescriptor::zoom(Direction::Out, 50).resolved_direction(),
        Some(Direction::Out)
    );
    assert_eq!(
        EffectDescriptor::blur(50)
            .with_direction(Direction::Up)
            .resolved_direction(),
        None
    );
}

#[test]
fn validate_enforces_ui_rules() {
    assert!(EffectDescriptor::fade(Direction::In, 60).validate().is_ok());
    assert!(EffectDescriptor::fade(Direction::In, 5).validate().is_err());
    assert!(EffectDescriptor::fade(Direction::In, 101).validate().is_err());
    assert!(
        EffectDescriptor::rotate(Direction::Up, 40)
            .validate()
            .is_err()
    );
    assert!(
        EffectDescriptor::new(EffectKind::Color, 40)
            .validate()
            .is_err()
    );
    assert!(EffectDescriptor::color("#zzz", 40).validate().is_err());
    assert!(EffectDescriptor::color("#0088ff", 45).validate().is_ok());

    let unordered = EffectDescriptor::sparkle(55).with_keyframes(vec![
        Keyframe {
            position: 60.0,
            intensity: 10.0,
        },
        Keyframe {
            position: 20.0,
            intensity: 10.0,
        },
    ]);
    assert!(unordered.validate().is_err());
}

#[test]
fn intensity_at_without_keyframes_is_constant() {
    let e = EffectDescriptor::blur(65);
    assert_eq!(e.intensity_at(0.0), 65.0);
    assert_eq!(e.intensity_at(0.7), 65.0);

    let hot = EffectDescriptor::blur(400);
    assert_eq!(hot.intensity_at(0.5), 100.0);
}

#[test]
fn intensity_at_interpolates_keyframes() {
    let e = EffectDescriptor::zoom(Direction::In, 50).with_keyframes(vec![
        Keyframe {
            position: 20.0,
            intensity: 10.0,
        },
        Keyframe {
            position: 60.0,
            intensity: 90.0,
        },
        Keyframe {
            position: 80.0,
            intensity: 30.0,
        },
    ]);
    assert_eq!(e.intensity_at(0.0), 10.0);
    assert!((e.intensity_at(0.4) - 50.0).abs() < 1e-9);
    assert!((e.intensity_at(0.7) - 60.0).abs() < 1e-9);
    assert_eq!(e.intensity_at(1.0), 30.0);

    let empty = EffectDescriptor::zoom(Direction::In, 50).with_keyframes(vec![]);
    assert_eq!(empty.intensity_at(0.5), 50.0);
}
