//! Scene orchestration: the storyboard collection and per-scene image requests.
//!
//! Scenes are addressed by position. An image request touches the collection twice,
//! once to mark its scene as loading and once to settle it, and each time it
//! transforms whatever collection is current at that moment. Requests for different
//! scenes therefore never overwrite each other's results. Requests for the same
//! scene are not deduplicated: the last one to settle wins.

use std::sync::Arc;

use crate::error::GenerationError;
use crate::gateway::Generator;
use crate::scene::{SceneImage, StoryboardScene, replace_at};
use crate::store::{BlobStore, Persisted, STORYBOARD_KEY};

#[derive(Debug)]
pub struct Storyboard {
    scenes: Persisted<Vec<StoryboardScene>>,
}

impl Storyboard {
    pub fn open(store: Arc<dyn BlobStore>) -> Self {
        let scenes: Persisted<Vec<StoryboardScene>> = Persisted::open(store, STORYBOARD_KEY);
        // A request cannot outlive the process that issued it.
        if scenes.get().iter().any(StoryboardScene::is_loading) {
            log::info!("Clearing image requests left pending by a previous session");
            scenes.update(|previous| {
                previous
                    .iter()
                    .map(|scene| match scene.image() {
                        SceneImage::Loading => scene.without_image(),
                        _ => scene.clone(),
                    })
                    .collect()
            });
        }
        Self { scenes }
    }

    pub fn scenes(&self) -> Vec<StoryboardScene> {
        self.scenes.get()
    }

    pub fn scene(&self, index: usize) -> Option<StoryboardScene> {
        self.scenes.get().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.scenes.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installs a freshly generated storyboard.
    pub fn replace_scenes(&self, scenes: Vec<StoryboardScene>) {
        log::info!("Storyboard replaced with {} scenes", scenes.len());
        self.scenes.set(scenes);
    }

    /// Generates an image for the scene at `index`.
    ///
    /// An index with no scene is ignored. On failure the scene is left without an
    /// image and the error is returned; it is never left loading.
    pub async fn request_image<G: Generator>(
        &self,
        gateway: &G,
        index: usize,
    ) -> Result<(), GenerationError> {
        let marked = self.scenes.modify(|scenes| match scenes.get(index) {
            Some(scene) => {
                let action = scene.action.clone();
                (replace_at(scenes, index, StoryboardScene::loading), Some(action))
            }
            None => (scenes.clone(), None),
        });
        let Some(action) = marked else {
            log::debug!("Ignoring image request for missing scene {index}");
            return Ok(());
        };

        log::info!("Requesting image for scene {index}");
        let result = gateway.generate_image(&action).await;

        // Settle against the collection as it is now, not as it was when we started.
        match result {
            Ok(url) => {
                self.scenes
                    .update(|scenes| replace_at(scenes, index, |scene| scene.with_image(url)));
                log::info!("Image ready for scene {index}");
                Ok(())
            }
            Err(e) => {
                self.scenes
                    .update(|scenes| replace_at(scenes, index, StoryboardScene::without_image));
                log::warn!("Image request for scene {index} failed: {e}");
                Err(e)
            }
        }
    }
}
