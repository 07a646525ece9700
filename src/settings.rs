// Import necessary libraries and modules for file I/O and serialization.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

// Application settings, stored as JSON next to the rest of the data.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Falls back to OPENAI_API_KEY when unset.
    pub text_model: String,             // Story generation, formatting.
    pub storyboard_model: String,       // Storyboards and template optimization.
    pub image_model: String,
    pub request_timeout_secs: u64, // Upper bound on a single generation request.
    pub debug_mode: bool,          // Log at debug level.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            text_model: "gpt-4o-mini".to_string(),
            storyboard_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            request_timeout_secs: 120,
            debug_mode: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Default data directory: ~/storyloom/data, or ./data without a home directory.
    pub fn data_dir() -> PathBuf {
        dir::home_dir()
            .map(|home| home.join("storyloom").join("data"))
            .unwrap_or_else(|| PathBuf::from("./data"))
    }

    // Load settings from the data directory, using defaults if missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        match Self::load_settings_from_file(&path) {
            Ok(settings) => settings,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring unreadable settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    // Save current settings into the data directory.
    pub fn save(&self, data_dir: &Path) -> io::Result<()> {
        self.save_to_file(&data_dir.join(SETTINGS_FILE))
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: &Path) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?; // Serialize settings into pretty JSON format.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?; // Write the serialized data to the file.
        Ok(())
    }
}
