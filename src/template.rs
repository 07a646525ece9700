//! Prompt templates and the template-to-instruction compiler.
//!
//! A template's content may carry `{{name}}` markers. Whitespace inside the
//! braces is tolerated, so `{{ name }}` names the same variable. Markers whose
//! name is not plain ASCII (`{{café}}`) are left as literal text.

use std::collections::{HashMap, HashSet};

use derive_more::{Display, From};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variable name to bound value.
pub type Bindings = HashMap<String, String>;

// Names are ASCII word characters only.
const MARKER_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}";

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(MARKER_PATTERN).expect("valid marker regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: TemplateId,
    pub name: String,
    pub content: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: TemplateId::generate(),
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn placeholders(&self) -> Vec<String> {
        extract_placeholders(&self.content)
    }
}

/// Distinct marker names in the order they first appear.
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MARKER_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
        .filter(|name| seen.insert(*name))
        .map(String::from)
        .collect()
}

/// A binding for every placeholder, all empty. The starting point of a variable form.
pub fn blank_bindings(content: &str) -> Bindings {
    extract_placeholders(content)
        .into_iter()
        .map(|name| (name, String::new()))
        .collect()
}

/// Replaces every marker with its bound value. Unbound markers become empty.
pub fn fill_template(content: &str, bindings: &Bindings) -> String {
    MARKER_RE
        .replace_all(content, |caps: &Captures| {
            bindings.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Builds the instruction sent to story generation: a preamble carrying the topic,
/// then the filled template body.
pub fn compile_instruction(content: &str, bindings: &Bindings, topic: &str) -> String {
    format!(
        "Generate a story based on this topic: \"{topic}\".\n\nFollow these instructions and template:\n{}",
        fill_template(content, bindings)
    )
}
