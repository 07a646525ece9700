//! The authoring session: every user-facing operation in one place.
//!
//! `Studio` owns the generator and the persisted collections. Each method is an
//! independent operation that can be awaited concurrently with the others, subject
//! to the gates: one story generation at a time, one of format/storyboard at a time,
//! and one template optimization at a time.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::gate::{Gate, Operation};
use crate::gateway::Generator;
use crate::language::{Language, Localizer};
use crate::library::TemplateLibrary;
use crate::store::{BlobStore, LANGUAGE_KEY, Persisted, STORY_KEY};
use crate::storyboard::Storyboard;
use crate::template::{Bindings, TemplateId, compile_instruction};

pub struct Studio<G> {
    gateway: G,
    library: TemplateLibrary,
    storyboard: Storyboard,
    story: Persisted<String>,
    language: Persisted<Language>,
    generating: Gate<Operation>, // Story generation.
    processing: Gate<Operation>, // Formatting and storyboard generation share this one.
}

impl<G: Generator> Studio<G> {
    /// Opens a session, reading every collection from `store` once.
    pub fn open(gateway: G, store: Arc<dyn BlobStore>) -> Self {
        let studio = Self {
            gateway,
            library: TemplateLibrary::open(store.clone()),
            storyboard: Storyboard::open(store.clone()),
            story: Persisted::open(store.clone(), STORY_KEY),
            language: Persisted::open(store, LANGUAGE_KEY),
            generating: Gate::new(),
            processing: Gate::new(),
        };
        log::info!(
            "Studio opened: {} templates, {} scenes, language {}",
            studio.library.templates().len(),
            studio.storyboard.len(),
            studio.language()
        );
        studio
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn storyboard(&self) -> &Storyboard {
        &self.storyboard
    }

    // --- Language

    pub fn language(&self) -> Language {
        self.language.get()
    }

    pub fn set_language(&self, language: Language) {
        self.language.set(language);
        log::info!("Language set to {language}");
    }

    pub fn localizer(&self) -> Localizer {
        Localizer::new(self.language())
    }

    // --- Story

    pub fn story(&self) -> String {
        self.story.get()
    }

    pub fn set_story(&self, story: impl Into<String>) {
        self.story.set(story.into());
    }

    /// The operation holding the format/storyboard gate, for progress display.
    pub fn processing(&self) -> Option<Operation> {
        self.processing.current()
    }

    pub fn is_generating_story(&self) -> bool {
        !self.generating.is_open()
    }

    /// Compiles the selected template with `bindings` and `topic` into an instruction.
    pub fn compile_selected(&self, bindings: &Bindings, topic: &str) -> Result<String> {
        let template = self
            .library
            .selected()
            .ok_or(AppError::NoTemplateSelected)?;
        Ok(compile_instruction(&template.content, bindings, topic))
    }

    /// Generates a story from the selected template and replaces the current story.
    pub async fn generate_story(&self, bindings: &Bindings, topic: &str) -> Result<String> {
        if topic.trim().is_empty() {
            return Err(AppError::EmptyTopic);
        }
        let instruction = self.compile_selected(bindings, topic)?;
        let _guard = self
            .generating
            .try_enter(Operation::GenerateStory)
            .ok_or(AppError::Busy(Operation::GenerateStory))?;

        log::info!("Generating story for topic: {topic}");
        let story = self.gateway.generate_story(&instruction).await?;
        self.story.set(story.clone());
        Ok(story)
    }

    /// Re-flows the current story through the generator.
    pub async fn format_story(&self) -> Result<String> {
        let story = self.non_empty_story()?;
        let _guard = self
            .processing
            .try_enter(Operation::FormatStory)
            .ok_or_else(|| self.busy_processing())?;

        log::info!("Formatting story");
        let formatted = self.gateway.format_story(&story).await?;
        self.story.set(formatted.clone());
        Ok(formatted)
    }

    /// Breaks the current story into scenes, replacing the storyboard.
    /// Returns the number of scenes.
    pub async fn generate_storyboard(&self) -> Result<usize> {
        let story = self.non_empty_story()?;
        let _guard = self
            .processing
            .try_enter(Operation::GenerateStoryboard)
            .ok_or_else(|| self.busy_processing())?;

        log::info!("Generating storyboard");
        let scenes = self.gateway.generate_storyboard(&story).await?;
        let count = scenes.len();
        self.storyboard.replace_scenes(scenes);
        Ok(count)
    }

    /// Generates the image for the scene at `index`. Missing scenes are ignored.
    pub async fn generate_image(&self, index: usize) -> Result<()> {
        self.storyboard
            .request_image(&self.gateway, index)
            .await
            .map_err(AppError::from)
    }

    pub async fn optimize_template(&self, id: &TemplateId) -> Result<()> {
        self.library.optimize(&self.gateway, id).await
    }

    fn non_empty_story(&self) -> Result<String> {
        let story = self.story.get();
        if story.is_empty() {
            return Err(AppError::EmptyStory);
        }
        Ok(story)
    }

    fn busy_processing(&self) -> AppError {
        AppError::Busy(self.processing.current().unwrap_or(Operation::FormatStory))
    }
}

/// The localized notice for a failed operation.
pub fn notice(error: &AppError, localizer: &Localizer) -> String {
    let key = match error {
        AppError::Busy(_) => "busy",
        AppError::TemplateNotFound(_) => "templateNotFound",
        AppError::NoTemplateSelected => "selectTemplate",
        AppError::EmptyStory => "emptyStory",
        AppError::EmptyTopic => "emptyTopic",
        _ => "errorOccurred",
    };
    localizer.t(key).to_string()
}
