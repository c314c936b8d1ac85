//! Modal dialogs used by the menu flows
//!
//! The controller only talks to the [`Dialogs`] trait so the flows can be
//! driven by scripted answers in tests. [`NativeDialogs`] shows real message
//! boxes and file pickers through rfd.

use std::path::PathBuf;
use std::sync::Arc;
use winit::window::Window;

pub trait Dialogs {
    /// Yes/no question; true means yes
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    fn show_error(&mut self, message: &str);

    /// Picker for an existing file; None when cancelled
    fn pick_load_file(&mut self) -> Option<PathBuf>;

    /// Picker for a save destination; None when cancelled
    fn pick_save_file(&mut self) -> Option<PathBuf>;
}

/// Native dialogs, modal to the editor window when one is attached
#[derive(Default)]
pub struct NativeDialogs {
    parent: Option<Arc<Window>>,
    /// Directory the pickers open in, following the last picked file
    last_dir: Option<PathBuf>,
}

impl NativeDialogs {
    pub fn new(parent: Option<Arc<Window>>) -> Self {
        Self {
            parent,
            last_dir: None,
        }
    }

    fn file_dialog(&self) -> rfd::FileDialog {
        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = &self.last_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(window) = &self.parent {
            dialog = dialog.set_parent(window.as_ref());
        }
        dialog
    }

    fn message_dialog(&self) -> rfd::MessageDialog {
        let dialog = rfd::MessageDialog::new();
        match &self.parent {
            Some(window) => dialog.set_parent(window.as_ref()),
            None => dialog,
        }
    }

    fn remember_dir(&mut self, picked: &Option<PathBuf>) {
        if let Some(dir) = picked.as_ref().and_then(|p| p.parent()) {
            self.last_dir = Some(dir.to_path_buf());
        }
    }
}

impl Dialogs for NativeDialogs {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let answer = self
            .message_dialog()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        log::debug!("Confirm {:?}: {:?}", title, answer);
        matches!(answer, rfd::MessageDialogResult::Yes)
    }

    fn show_error(&mut self, message: &str) {
        self.message_dialog()
            .set_level(rfd::MessageLevel::Error)
            .set_title("Error")
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn pick_load_file(&mut self) -> Option<PathBuf> {
        let picked = self.file_dialog().set_title("Open").pick_file();
        self.remember_dir(&picked);
        picked
    }

    fn pick_save_file(&mut self) -> Option<PathBuf> {
        let picked = self.file_dialog().set_title("Save As").save_file();
        self.remember_dir(&picked);
        picked
    }
}
