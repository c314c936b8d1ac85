//! Document/file state observed by the window
//!
//! The model owns at most one document and at most one backing file. The
//! synchronized flag says whether the document matches the file on disk; it
//! can only be true while both are present.

use crate::document::Document;
use crate::error::{PetError, Result};
use crate::io;
use std::path::{Path, PathBuf};

/// Snapshot of the model handed to change listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelState {
    pub has_document: bool,
    pub document_len: usize,
    pub has_file: bool,
    pub synchronized: bool,
}

impl ModelState {
    /// A document that differs from its file, or has no file at all
    pub fn has_unsaved_changes(&self) -> bool {
        self.has_document && !self.synchronized
    }
}

pub type ChangeListener = Box<dyn FnMut(&ModelState)>;

#[derive(Default)]
pub struct PetModel {
    document: Option<Document>,
    file: Option<PathBuf>,
    synchronized: bool,
    listeners: Vec<ChangeListener>,
}

impl PetModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized && self.document.is_some() && self.file.is_some()
    }

    pub fn state(&self) -> ModelState {
        ModelState {
            has_document: self.document.is_some(),
            document_len: self.document.as_ref().map_or(0, Document::len),
            has_file: self.file.is_some(),
            synchronized: self.is_synchronized(),
        }
    }

    pub fn add_change_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn replace(&mut self, document: Option<Document>, file: Option<PathBuf>, synchronized: bool) {
        self.synchronized = synchronized && document.is_some() && file.is_some();
        self.document = document;
        self.file = file;
        self.fire_state_changed();
    }

    fn fire_state_changed(&mut self) {
        let state = self.state();
        log::debug!("Model changed: {:?}", state);
        for listener in &mut self.listeners {
            listener(&state);
        }
    }

    // === Wholesale replacement ===

    /// Fresh empty document without a file
    pub fn set_new_doc_without_file(&mut self) {
        self.replace(Some(Document::new()), None, false);
    }

    /// Use a file's text as the starting point of a new, unnamed document
    pub fn set_new_doc_from_file(&mut self, path: &Path) -> Result<()> {
        let doc = io::load(path)?;
        self.replace(Some(doc), None, false);
        Ok(())
    }

    /// Load a file and make it the document's backing file
    pub fn set_new_doc_and_new_file(&mut self, path: &Path) -> Result<()> {
        let doc = io::load(path)?;
        self.replace(Some(doc), Some(path.to_path_buf()), true);
        Ok(())
    }

    /// Discard in-memory changes by reloading the current file
    pub fn reset_current_doc_with_current_file(&mut self) -> Result<()> {
        let path = self
            .file
            .clone()
            .ok_or(PetError::Precondition("reopen without a file"))?;
        let doc = io::load(&path)?;
        self.replace(Some(doc), Some(path), true);
        Ok(())
    }

    // === Saving ===

    pub fn save_current_doc_into_current_file(&mut self) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PetError::Precondition("save without a document"))?;
        let path = self
            .file
            .as_deref()
            .ok_or(PetError::Precondition("save without a file"))?;
        io::save(doc, path)?;
        self.synchronized = true;
        self.fire_state_changed();
        Ok(())
    }

    pub fn save_current_doc_into_file(&mut self, path: &Path) -> Result<()> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PetError::Precondition("save without a document"))?;
        io::save(doc, path)?;
        self.file = Some(path.to_path_buf());
        self.synchronized = true;
        self.fire_state_changed();
        Ok(())
    }

    // === Clearing ===

    pub fn remove_doc_and_file(&mut self) {
        self.replace(None, None, false);
    }

    /// Empty the document while keeping it (and its file) in place
    pub fn clear_document(&mut self) -> Result<()> {
        let doc = self
            .document
            .as_mut()
            .ok_or(PetError::Precondition("clear without a document"))?;
        if doc.clear() {
            self.synchronized = false;
        }
        self.fire_state_changed();
        Ok(())
    }

    // === Incremental edits ===

    /// Apply an edit to the document; the closure reports whether the text
    /// changed. Returns false when there is no document.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let Some(doc) = self.document.as_mut() else {
            return false;
        };
        if !f(doc) {
            return false;
        }
        self.synchronized = false;
        self.fire_state_changed();
        true
    }

    /// Caret or selection changes that leave the text alone
    pub fn navigate<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Document),
    {
        if let Some(doc) = self.document.as_mut() {
            f(doc);
        }
    }
}
