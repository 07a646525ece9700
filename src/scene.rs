use serde::{Deserialize, Serialize};

// One shot of a storyboard. The wire names match the structured response schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardScene {
    pub scene_number: u32,
    pub camera_angle: String, // e.g. "Close-up", "Wide shot", "Over-the-shoulder".
    pub setting: String,      // Location and time.
    pub action: String,       // What happens; also the image prompt.
    pub dialogue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_loading: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneImage {
    Empty,
    Loading,
    Ready(String),
}

impl StoryboardScene {
    pub fn new(
        scene_number: u32,
        camera_angle: impl Into<String>,
        setting: impl Into<String>,
        action: impl Into<String>,
        dialogue: impl Into<String>,
    ) -> Self {
        Self {
            scene_number,
            camera_angle: camera_angle.into(),
            setting: setting.into(),
            action: action.into(),
            dialogue: dialogue.into(),
            image_url: None,
            image_loading: None,
        }
    }

    pub fn image(&self) -> SceneImage {
        match (self.image_loading, &self.image_url) {
            (Some(true), _) => SceneImage::Loading,
            (_, Some(url)) => SceneImage::Ready(url.clone()),
            _ => SceneImage::Empty,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.image() == SceneImage::Loading
    }

    // The transitions below return a new scene and leave `self` untouched.

    pub fn loading(&self) -> Self {
        Self {
            image_url: None,
            image_loading: Some(true),
            ..self.clone()
        }
    }

    pub fn with_image(&self, url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            image_loading: None,
            ..self.clone()
        }
    }

    pub fn without_image(&self) -> Self {
        Self {
            image_url: None,
            image_loading: None,
            ..self.clone()
        }
    }
}

/// Copy of `scenes` with `f` applied to the scene at `index` only.
/// An index past the end yields an unchanged copy.
pub fn replace_at(
    scenes: &[StoryboardScene],
    index: usize,
    f: impl FnOnce(&StoryboardScene) -> StoryboardScene,
) -> Vec<StoryboardScene> {
    let mut next = scenes.to_vec();
    if let Some(scene) = next.get_mut(index) {
        *scene = f(scene);
    }
    next
}
