//! The template library: persisted templates, the active selection, an ephemeral
//! edit session, and template optimization.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{AppError, Result};
use crate::gate::{Gate, Operation};
use crate::gateway::Generator;
use crate::store::{BlobStore, Persisted, TEMPLATES_KEY};
use crate::template::{PromptTemplate, TemplateId};

/// Draft state of the template form. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    pub editing: Option<TemplateId>, // `None` while drafting a new template.
    pub name: String,
    pub content: String,
}

#[derive(Debug)]
pub struct TemplateLibrary {
    templates: Persisted<Vec<PromptTemplate>>,
    selected: Mutex<Option<TemplateId>>,
    session: Mutex<EditSession>,
    optimizing: Gate<TemplateId>,
}

fn is_valid(name: &str, content: &str) -> bool {
    !name.trim().is_empty() && !content.trim().is_empty()
}

impl TemplateLibrary {
    pub fn open(store: Arc<dyn BlobStore>) -> Self {
        Self {
            templates: Persisted::open(store, TEMPLATES_KEY),
            selected: Mutex::new(None),
            session: Mutex::new(EditSession::default()),
            optimizing: Gate::new(),
        }
    }

    pub fn templates(&self) -> Vec<PromptTemplate> {
        self.templates.get()
    }

    pub fn get(&self, id: &TemplateId) -> Option<PromptTemplate> {
        self.templates.get().into_iter().find(|t| &t.id == id)
    }

    /// Adds a template. Blank names or contents are rejected.
    pub fn create(&self, name: &str, content: &str) -> Option<TemplateId> {
        if !is_valid(name, content) {
            return None;
        }
        let template = PromptTemplate::new(name, content);
        let id = template.id.clone();
        self.templates.update(|templates| {
            let mut next = templates.clone();
            next.push(template);
            next
        });
        log::info!("Created template {id}");
        Some(id)
    }

    /// Replaces a template's name and content. Returns `false` if nothing changed hands.
    pub fn update(&self, id: &TemplateId, name: &str, content: &str) -> bool {
        if !is_valid(name, content) {
            return false;
        }
        let found = self.templates.modify(|templates| {
            let found = templates.iter().any(|t| &t.id == id);
            let next = templates
                .iter()
                .map(|t| {
                    if &t.id == id {
                        PromptTemplate {
                            name: name.to_string(),
                            content: content.to_string(),
                            ..t.clone()
                        }
                    } else {
                        t.clone()
                    }
                })
                .collect();
            (next, found)
        });
        if found {
            log::info!("Updated template {id}");
        }
        found
    }

    /// Removes a template, dropping the selection and edit session that point at it.
    pub fn delete(&self, id: &TemplateId) {
        self.templates
            .update(|templates| templates.iter().filter(|t| &t.id != id).cloned().collect());

        let mut selected = self.selected.lock().unwrap_or_else(PoisonError::into_inner);
        if selected.as_ref() == Some(id) {
            *selected = None;
        }
        drop(selected);

        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.editing.as_ref() == Some(id) {
            *session = EditSession::default();
        }
        log::info!("Deleted template {id}");
    }

    pub fn select(&self, id: Option<TemplateId>) {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = id;
    }

    pub fn selected_id(&self) -> Option<TemplateId> {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The selected template, if the selection still resolves.
    pub fn selected(&self) -> Option<PromptTemplate> {
        self.selected_id().and_then(|id| self.get(&id))
    }

    // --- Edit session

    pub fn session(&self) -> EditSession {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Loads a template into the draft. Returns `false` for an unknown id.
    pub fn begin_edit(&self, id: &TemplateId) -> bool {
        let Some(template) = self.get(id) else {
            return false;
        };
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = EditSession {
            editing: Some(template.id),
            name: template.name,
            content: template.content,
        };
        true
    }

    /// Starts an empty draft for a new template.
    pub fn begin_new(&self) {
        self.cancel_edit();
    }

    pub fn cancel_edit(&self) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = EditSession::default();
    }

    pub fn set_draft_name(&self, name: impl Into<String>) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .name = name.into();
    }

    pub fn set_draft_content(&self, content: impl Into<String>) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .content = content.into();
    }

    /// Creates or updates from the draft and resets the session.
    /// A rejected draft stays in place so it can be fixed.
    pub fn save_draft(&self) -> Option<TemplateId> {
        let draft = self.session();
        let saved = match &draft.editing {
            Some(id) => self
                .update(id, &draft.name, &draft.content)
                .then(|| id.clone()),
            None => self.create(&draft.name, &draft.content),
        };
        if saved.is_some() {
            self.cancel_edit();
        }
        saved
    }

    // --- Optimization

    /// The template whose optimization is in flight, if any.
    pub fn optimizing(&self) -> Option<TemplateId> {
        self.optimizing.current()
    }

    /// Rewrites a template's content through the generator.
    ///
    /// Only one optimization may be in flight across the whole library; a request
    /// made while another is pending fails with `AppError::Busy`.
    pub async fn optimize<G: Generator>(&self, gateway: &G, id: &TemplateId) -> Result<()> {
        let content = self
            .get(id)
            .map(|t| t.content)
            .ok_or_else(|| AppError::TemplateNotFound(id.clone()))?;
        let _guard = self
            .optimizing
            .try_enter(id.clone())
            .ok_or(AppError::Busy(Operation::OptimizeTemplate))?;

        log::info!("Optimizing template {id}");
        let optimized = gateway.optimize_template(&content).await?;

        self.templates.update(|templates| {
            templates
                .iter()
                .map(|t| {
                    if &t.id == id {
                        PromptTemplate {
                            content: optimized.clone(),
                            ..t.clone()
                        }
                    } else {
                        t.clone()
                    }
                })
                .collect()
        });
        log::info!("Template {id} optimized");
        Ok(())
    }
}
