mod common;

use std::sync::Arc;

use common::{ScriptedGenerator, scenes};
use storyloom::settings::SETTINGS_FILE;
use storyloom::store::{LANGUAGE_KEY, STORY_KEY, TEMPLATES_KEY};
use storyloom::{BlobStore, FileStore, Language, Persisted, PromptTemplate, Settings, Studio};
use tempfile::tempdir;

#[test]
fn test_file_store_missing_key_is_none() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path().join("data"));

    assert!(store.get(STORY_KEY).unwrap().is_none());
}

#[test]
fn test_file_store_creates_directory_on_write() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested").join("data"));

    store.set(STORY_KEY, "\"hello\"").unwrap();

    assert!(store.dir().join("story.json").exists());
    assert_eq!(store.get(STORY_KEY).unwrap().as_deref(), Some("\"hello\""));
}

#[test]
fn test_file_store_overwrite_leaves_no_staging_file() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path());

    store.set(TEMPLATES_KEY, "[1]").unwrap();
    store.set(TEMPLATES_KEY, "[1, 2]").unwrap();

    assert_eq!(store.get(TEMPLATES_KEY).unwrap().as_deref(), Some("[1, 2]"));
    let files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["templates.json".to_string()]);
}

#[test]
fn test_persisted_writes_every_update() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FileStore::new(dir.path()));
    let counter: Persisted<Vec<u32>> = Persisted::open(store.clone(), "counter");

    counter.update(|values| {
        let mut next = values.clone();
        next.push(1);
        next
    });
    let len = counter.modify(|values| {
        let mut next = values.clone();
        next.push(2);
        let len = next.len();
        (next, len)
    });

    assert_eq!(len, 2);
    let stored: Vec<u32> = serde_json::from_str(&store.get("counter").unwrap().unwrap()).unwrap();
    assert_eq!(stored, vec![1, 2]);
}

#[test]
fn test_malformed_entry_falls_back_to_default() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FileStore::new(dir.path()));
    store.set(TEMPLATES_KEY, "{ not json").unwrap();
    store.set(LANGUAGE_KEY, "\"klingon\"").unwrap();

    let studio = Studio::open(ScriptedGenerator::default(), store);

    assert!(studio.library().templates().is_empty());
    assert_eq!(studio.language(), Language::En);
}

#[test]
fn test_studio_state_survives_restart_on_disk() {
    let dir = tempdir().unwrap();
    let open = || {
        let store: Arc<dyn BlobStore> = Arc::new(FileStore::new(dir.path()));
        Studio::open(ScriptedGenerator::default(), store)
    };

    let id = {
        let studio = open();
        studio.set_story("A story on disk");
        studio.storyboard().replace_scenes(scenes(2));
        studio.library().create("Disk", "{{x}}").unwrap()
    };

    let studio = open();
    assert_eq!(studio.story(), "A story on disk");
    assert_eq!(studio.storyboard().scenes(), scenes(2));
    assert_eq!(studio.library().get(&id).unwrap().name, "Disk");
}

#[test]
fn test_templates_are_stored_as_json_array() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FileStore::new(dir.path()));
    let studio = Studio::open(ScriptedGenerator::default(), store.clone());
    studio.library().create("Fable", "About {{animal}}").unwrap();

    let stored: Vec<PromptTemplate> =
        serde_json::from_str(&store.get(TEMPLATES_KEY).unwrap().unwrap()).unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Fable");
}

#[test]
fn test_settings_defaults_when_missing() {
    let dir = tempdir().unwrap();

    let settings = Settings::load(dir.path());

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.text_model, "gpt-4o-mini");
    assert_eq!(settings.image_model, "dall-e-3");
    assert_eq!(settings.request_timeout_secs, 120);
}

#[test]
fn test_settings_round_trip() {
    let dir = tempdir().unwrap();
    let settings = Settings {
        openai_api_key: Some("sk-test".to_string()),
        debug_mode: true,
        ..Settings::default()
    };

    settings.save(dir.path()).unwrap();

    assert!(dir.path().join(SETTINGS_FILE).exists());
    assert_eq!(Settings::load(dir.path()), settings);
}

#[test]
fn test_partial_settings_fill_in_defaults() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(SETTINGS_FILE),
        r#"{ "text_model": "gpt-4o" }"#,
    )
    .unwrap();

    let settings = Settings::load(dir.path());

    assert_eq!(settings.text_model, "gpt-4o");
    assert_eq!(settings.storyboard_model, Settings::default().storyboard_model);
}

#[test]
fn test_unreadable_settings_use_defaults() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();

    assert_eq!(Settings::load(dir.path()), Settings::default());
}
