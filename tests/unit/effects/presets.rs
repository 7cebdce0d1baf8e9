use super::*;
use crate::effects::descriptor::EffectKind;

fn custom(id: &str, intensity: u32) -> Preset {
    Preset {
        id: id.to_owned(),
        name: format!("Custom {id}"),
        description: String::new(),
        effect: EffectDescriptor::zoom(Direction::Out, intensity),
        duration_secs: 2.5,
    }
}

#[test]
fn builtin_presets_are_valid_and_unique() {
    let presets = builtin_presets();
    assert_eq!(presets.len(), 12);
    for p in &presets {
        p.validate().unwrap();
    }
    let mut ids: Vec<_> = presets.iter().map(|p| p.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);

    let warm = presets.iter().find(|p| p.id == "warm-overlay").unwrap();
    assert_eq!(warm.effect.kind, EffectKind::Color);
    assert_eq!(warm.effect.color.as_deref(), Some("#ff9d00"));
}

#[test]
fn in_memory_store_upserts_by_id() {
    let store = InMemoryPresetStore::new();
    store.save(custom("a", 40)).unwrap();
    store.save(custom("b", 50)).unwrap();
    store.save(custom("a", 70)).unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, "a");
    assert_eq!(listed[0].effect.intensity, 70);
    assert_eq!(listed[1].id, "b");
}

#[test]
fn store_rejects_invalid_presets() {
    let store = InMemoryPresetStore::new();
    let mut bad = custom("x", 50);
    bad.duration_secs = 0.0;
    assert!(matches!(store.save(bad), Err(FramefxError::Preset(_))));

    assert!(store.save(custom("y", 3)).is_err());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn json_file_store_persists_across_instances() {
    let dir = std::env::temp_dir().join(format!("framefx-presets-{}", std::process::id()));
    let path = dir.join("presets.json");
    let _ = std::fs::remove_file(&path);

    let store = JsonFilePresetStore::new(&path);
    assert!(store.list().unwrap().is_empty());
    store.save(custom("saved", 60)).unwrap();

    let reopened = JsonFilePresetStore::new(&path);
    let listed = reopened.list().unwrap();
    assert_eq!(listed, vec![custom("saved", 60)]);

    let _ = std::fs::remove_dir_all(&dir);
}
