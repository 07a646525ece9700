pub mod command;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod language;
pub mod library;
pub mod logging;
pub mod scene;
pub mod settings;
pub mod shell;
pub mod store;
pub mod storyboard;
pub mod studio;
pub mod template;

// Re-export commonly used items for easier access
pub use error::{AppError, GenerationError, Result};
pub use gateway::{Generator, OpenAiGateway};
pub use language::{Language, Localizer};
pub use library::{EditSession, TemplateLibrary};
pub use scene::{SceneImage, StoryboardScene};
pub use settings::Settings;
pub use store::{BlobStore, FileStore, MemoryStore, Persisted};
pub use storyboard::Storyboard;
pub use studio::Studio;
pub use template::{
    Bindings, PromptTemplate, TemplateId, compile_instruction, extract_placeholders,
};
