// Shared helpers for the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use storyloom::{
    BlobStore, GenerationError, Generator, MemoryStore, StoryboardScene, Studio,
};
use tokio::sync::oneshot;

pub type Outcome<T> = Result<T, GenerationError>;

enum Reply<T> {
    Ready(Outcome<T>),
    Pending(oneshot::Receiver<Outcome<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Outcome<T> {
        match self {
            Reply::Ready(outcome) => outcome,
            // A dropped sender behaves like a request that never came back.
            Reply::Pending(receiver) => receiver.await.unwrap_or(Err(GenerationError::Timeout)),
        }
    }
}

/// Queued replies for one generator operation, plus the inputs it was called with.
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    inputs: Mutex<Vec<String>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            inputs: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn ok(&self, value: T) {
        self.replies.lock().unwrap().push_back(Reply::Ready(Ok(value)));
    }

    pub fn fail(&self, error: GenerationError) {
        self.replies.lock().unwrap().push_back(Reply::Ready(Err(error)));
    }

    /// Queues a reply that stays pending until the returned sender is used.
    pub fn hold(&self) -> oneshot::Sender<Outcome<T>> {
        let (sender, receiver) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Pending(receiver));
        sender
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    fn next(&self, input: &str) -> Reply<T> {
        self.inputs.lock().unwrap().push(input.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Ready(Err(GenerationError::EmptyResponse)))
    }
}

/// A generator whose every response is scripted by the test.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub story: Script<String>,
    pub format: Script<String>,
    pub storyboard: Script<Vec<StoryboardScene>>,
    pub image: Script<String>,
    pub optimize: Script<String>,
}

impl Generator for ScriptedGenerator {
    async fn generate_story(&self, instruction: &str) -> Outcome<String> {
        self.story.next(instruction).resolve().await
    }

    async fn format_story(&self, story: &str) -> Outcome<String> {
        self.format.next(story).resolve().await
    }

    async fn generate_storyboard(&self, story: &str) -> Outcome<Vec<StoryboardScene>> {
        self.storyboard.next(story).resolve().await
    }

    async fn generate_image(&self, description: &str) -> Outcome<String> {
        self.image.next(description).resolve().await
    }

    async fn optimize_template(&self, content: &str) -> Outcome<String> {
        self.optimize.next(content).resolve().await
    }
}

pub fn memory_store() -> Arc<dyn BlobStore> {
    Arc::new(MemoryStore::new())
}

pub fn studio() -> Studio<ScriptedGenerator> {
    Studio::open(ScriptedGenerator::default(), memory_store())
}

pub fn scene(number: u32, action: &str) -> StoryboardScene {
    StoryboardScene::new(number, "Wide shot", "A desert at dawn", action, "")
}

pub fn scenes(count: u32) -> Vec<StoryboardScene> {
    (1..=count)
        .map(|n| scene(n, &format!("Action of scene {n}")))
        .collect()
}

pub fn image_url(tag: &str) -> String {
    format!("data:image/jpeg;base64,{tag}")
}

/// Gives every other future in a `join!` a chance to run up to its next await.
pub async fn let_others_run() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}
