//! Menu flows driven by scripted dialog answers

use pet::{Controller, Dialogs, Flow, Item, PetModel};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Dialogs that replay queued answers and record what was shown. Running out
/// of answers means a flow asked something it should not have.
#[derive(Default)]
struct Scripted {
    answers: VecDeque<bool>,
    loads: VecDeque<Option<PathBuf>>,
    saves: VecDeque<Option<PathBuf>>,
    confirms: Vec<String>,
    errors: Vec<String>,
}

impl Dialogs for Scripted {
    fn confirm(&mut self, _title: &str, message: &str) -> bool {
        self.confirms.push(message.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected confirmation: {message}"))
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn pick_load_file(&mut self) -> Option<PathBuf> {
        self.loads.pop_front().expect("unexpected load picker")
    }

    fn pick_save_file(&mut self) -> Option<PathBuf> {
        self.saves.pop_front().expect("unexpected save picker")
    }
}

fn controller() -> Controller<Scripted> {
    Controller::new(Scripted::default())
}

fn answer(controller: &mut Controller<Scripted>, answers: &[bool]) {
    controller.dialogs_mut().answers.extend(answers);
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn text(model: &PetModel) -> &str {
    model.document().unwrap().text()
}

fn type_text(model: &mut PetModel, s: &str) {
    assert!(model.edit(|doc| doc.insert_str(s)));
}

/// Make every save to `path` fail by occupying its temporary sibling with a
/// directory
fn block_writes(path: &Path) {
    let mut name = path.file_name().unwrap().to_os_string();
    name.push(".pet-tmp");
    fs::create_dir(path.with_file_name(name)).unwrap();
}

/// Model with `path` open and synchronized
fn opened(controller: &mut Controller<Scripted>, path: &Path) -> PetModel {
    let mut model = PetModel::new();
    controller.dialogs_mut().loads.push_back(Some(path.to_path_buf()));
    assert_eq!(controller.activate(&mut model, Item::Open), Flow::Continue);
    assert!(model.is_synchronized());
    model
}

// === New ===

#[test]
fn test_new_from_empty_asks_nothing() {
    let mut controller = controller();
    let mut model = PetModel::new();

    assert_eq!(controller.activate(&mut model, Item::New), Flow::Continue);

    assert_eq!(text(&model), "");
    assert!(model.file().is_none());
    assert!(!model.is_synchronized());
    assert!(controller.dialogs().confirms.is_empty());
}

#[test]
fn test_new_over_unsaved_work_needs_confirmation() {
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "draft");

    answer(&mut controller, &[false]);
    controller.activate(&mut model, Item::New);
    assert_eq!(text(&model), "draft");

    answer(&mut controller, &[true]);
    controller.activate(&mut model, Item::New);
    assert_eq!(text(&model), "");
    assert_eq!(controller.dialogs().confirms.len(), 2);
}

#[test]
fn test_new_from_file_has_no_backing_file() {
    let dir = TempDir::new().unwrap();
    let template = write_file(&dir, "template.txt", "Dear ...");
    let mut controller = controller();
    let mut model = PetModel::new();

    controller.dialogs_mut().loads.push_back(Some(template));
    controller.activate(&mut model, Item::NewFromFile);

    assert_eq!(text(&model), "Dear ...");
    assert!(model.file().is_none());
    assert!(model.state().has_unsaved_changes());
}

// === Open / Reopen ===

#[test]
fn test_open_loads_synchronized_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "hello\nworld");
    let mut controller = controller();

    let model = opened(&mut controller, &path);

    assert_eq!(text(&model), "hello\nworld");
    assert_eq!(model.file(), Some(path.as_path()));
    assert!(controller.dialogs().errors.is_empty());
}

#[test]
fn test_open_cancelled_changes_nothing() {
    let mut controller = controller();
    let mut model = PetModel::new();

    controller.dialogs_mut().loads.push_back(None);
    controller.activate(&mut model, Item::Open);

    assert!(model.document().is_none());
    assert!(controller.dialogs().errors.is_empty());
}

#[test]
fn test_open_missing_file_reports_error() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller();
    let mut model = PetModel::new();

    controller
        .dialogs_mut()
        .loads
        .push_back(Some(dir.path().join("missing.txt")));
    controller.activate(&mut model, Item::Open);

    assert!(model.document().is_none());
    assert_eq!(controller.dialogs().errors.len(), 1);
}

#[test]
fn test_unreadable_file_leaves_model_unchanged() {
    let dir = TempDir::new().unwrap();
    let good = write_file(&dir, "good.txt", "fine");
    let bad = dir.path().join("bad.bin");
    fs::write(&bad, [0xff, 0xfe, 0xfd]).unwrap();
    let mut controller = controller();
    let mut model = opened(&mut controller, &good);

    controller.dialogs_mut().loads.push_back(Some(bad));
    controller.activate(&mut model, Item::Open);

    assert_eq!(text(&model), "fine");
    assert_eq!(model.file(), Some(good.as_path()));
    assert!(model.is_synchronized());
    let errors = &controller.dialogs().errors;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Could not read the file."));
}

#[test]
fn test_reopen_discards_edits() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "original");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    type_text(&mut model, "changed ");

    answer(&mut controller, &[true]);
    controller.activate(&mut model, Item::Reopen);

    assert_eq!(text(&model), "original");
    assert!(model.is_synchronized());
}

// === Save / Save As ===

#[test]
fn test_save_asks_before_replacing() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "v1");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    model.navigate(|doc| doc.select_all());
    type_text(&mut model, "v2");

    answer(&mut controller, &[false]);
    controller.activate(&mut model, Item::Save);
    assert_eq!(fs::read_to_string(&path).unwrap(), "v1");
    assert!(!model.is_synchronized());

    answer(&mut controller, &[true]);
    controller.activate(&mut model, Item::Save);
    assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    assert!(model.is_synchronized());
    assert!(controller.dialogs().confirms[1].starts_with("Replace the contents of"));
}

#[test]
fn test_save_is_ignored_when_synchronized() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "v1");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);

    // No answers queued: any dialog would panic
    assert_eq!(controller.activate(&mut model, Item::Save), Flow::Continue);
    assert!(controller.dialogs().confirms.is_empty());
}

#[test]
fn test_save_as_creates_the_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("fresh.txt");
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "brand new");

    controller.dialogs_mut().saves.push_back(Some(target.clone()));
    controller.activate(&mut model, Item::SaveAs);

    assert_eq!(fs::read_to_string(&target).unwrap(), "brand new");
    assert_eq!(model.file(), Some(target.as_path()));
    assert!(model.is_synchronized());
}

#[test]
fn test_save_as_onto_directory_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "text");

    controller
        .dialogs_mut()
        .saves
        .push_back(Some(dir.path().to_path_buf()));
    controller.activate(&mut model, Item::SaveAs);

    assert!(model.file().is_none());
    assert!(!model.is_synchronized());
    assert_eq!(controller.dialogs().errors.len(), 1);
}

#[test]
fn test_save_as_cancelled_does_nothing() {
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();

    controller.dialogs_mut().saves.push_back(None);
    controller.activate(&mut model, Item::SaveAs);

    assert!(model.file().is_none());
    assert!(controller.dialogs().errors.is_empty());
}

#[test]
fn test_failed_save_reports_and_keeps_state() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "v1");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    type_text(&mut model, "edit ");
    block_writes(&path);

    answer(&mut controller, &[true]);
    assert_eq!(controller.activate(&mut model, Item::Save), Flow::Continue);

    assert_eq!(controller.dialogs().errors.len(), 1);
    assert!(controller.dialogs().errors[0].starts_with("Could not write the file."));
    assert_eq!(fs::read_to_string(&path).unwrap(), "v1");
    assert_eq!(text(&model), "edit v1");
    assert_eq!(model.file(), Some(path.as_path()));
    assert!(!model.is_synchronized());
}

#[test]
fn test_failed_save_as_removes_reserved_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("fresh.txt");
    block_writes(&target);
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "brand new");

    controller.dialogs_mut().saves.push_back(Some(target.clone()));
    assert_eq!(controller.activate(&mut model, Item::SaveAs), Flow::Continue);

    assert_eq!(controller.dialogs().errors.len(), 1);
    assert!(!target.exists());
    assert!(model.file().is_none());
    assert!(!model.is_synchronized());
    assert_eq!(text(&model), "brand new");
}

#[test]
fn test_failed_save_as_keeps_existing_target() {
    let dir = TempDir::new().unwrap();
    let source = write_file(&dir, "source.txt", "mine");
    let target = write_file(&dir, "other.txt", "theirs");
    let mut controller = controller();
    let mut model = opened(&mut controller, &source);
    type_text(&mut model, "all ");
    block_writes(&target);

    controller.dialogs_mut().saves.push_back(Some(target.clone()));
    assert_eq!(controller.activate(&mut model, Item::SaveAs), Flow::Continue);

    assert_eq!(controller.dialogs().errors.len(), 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), "theirs");
    assert_eq!(model.file(), Some(source.as_path()));
    assert!(!model.is_synchronized());
}

#[test]
fn test_save_keeps_crlf_line_endings() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "dos.txt", "a\r\nb\r\n");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    model.navigate(|doc| doc.move_caret(pet::Motion::DocEnd, false));
    type_text(&mut model, "c");

    answer(&mut controller, &[true]);
    controller.activate(&mut model, Item::Save);

    assert!(model.is_synchronized());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nb\r\nc");
}

// === Close / Clear ===

#[test]
fn test_close_keeps_unsaved_work_when_declined() {
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "keep me");

    answer(&mut controller, &[false]);
    controller.activate(&mut model, Item::Close);
    assert_eq!(text(&model), "keep me");

    answer(&mut controller, &[true]);
    controller.activate(&mut model, Item::Close);
    assert!(model.document().is_none());
}

#[test]
fn test_clear_synchronized_document() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "content");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);

    controller.activate(&mut model, Item::Clear);

    assert_eq!(text(&model), "");
    assert_eq!(model.file(), Some(path.as_path()));
    assert!(!model.is_synchronized());
    assert_eq!(fs::read_to_string(&path).unwrap(), "content");
}

#[test]
fn test_disabled_items_do_nothing() {
    let mut controller = controller();
    let mut model = PetModel::new();

    for item in [Item::Reopen, Item::Save, Item::SaveAs, Item::Close, Item::Clear] {
        assert_eq!(controller.activate(&mut model, item), Flow::Continue);
    }
    assert!(model.document().is_none());
    assert!(controller.dialogs().confirms.is_empty());
}

// === Quit ===

#[test]
fn test_quit_without_changes_exits_immediately() {
    let mut controller = controller();
    let mut model = PetModel::new();
    assert_eq!(controller.activate(&mut model, Item::Quit), Flow::Exit);
    assert!(controller.dialogs().confirms.is_empty());
}

#[test]
fn test_quit_declined_keeps_window() {
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();

    answer(&mut controller, &[false]);
    assert_eq!(controller.quit(&mut model), Flow::Continue);
    assert!(model.document().is_some());
}

#[test]
fn test_quit_without_saving() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "on disk");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    type_text(&mut model, "lost ");

    answer(&mut controller, &[true, false]);
    assert_eq!(controller.quit(&mut model), Flow::Exit);
    assert_eq!(fs::read_to_string(&path).unwrap(), "on disk");
}

#[test]
fn test_quit_saves_into_current_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "on disk");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    type_text(&mut model, "kept ");

    answer(&mut controller, &[true, true]);
    assert_eq!(controller.quit(&mut model), Flow::Exit);
    assert_eq!(fs::read_to_string(&path).unwrap(), "kept on disk");
}

#[test]
fn test_quit_with_cancelled_picker_stays_open() {
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "unnamed");

    answer(&mut controller, &[true, true]);
    controller.dialogs_mut().saves.push_back(None);
    assert_eq!(controller.quit(&mut model), Flow::Continue);
    assert_eq!(controller.dialogs().errors.len(), 1);
    assert_eq!(text(&model), "unnamed");
}

#[test]
fn test_quit_saves_unnamed_document_through_picker() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("saved.txt");
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "unnamed");

    answer(&mut controller, &[true, true]);
    controller.dialogs_mut().saves.push_back(Some(target.clone()));
    assert_eq!(controller.quit(&mut model), Flow::Exit);
    assert_eq!(fs::read_to_string(&target).unwrap(), "unnamed");
}

#[test]
fn test_quit_with_failed_save_stays_open() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", "on disk");
    let mut controller = controller();
    let mut model = opened(&mut controller, &path);
    type_text(&mut model, "kept ");
    block_writes(&path);

    answer(&mut controller, &[true, true]);
    assert_eq!(controller.quit(&mut model), Flow::Continue);

    assert_eq!(controller.dialogs().errors.len(), 1);
    assert!(controller.dialogs().errors[0].starts_with("The document was not saved."));
    assert_eq!(fs::read_to_string(&path).unwrap(), "on disk");
    assert_eq!(text(&model), "kept on disk");
    assert!(!model.is_synchronized());
}

#[test]
fn test_quit_with_failed_picker_save_stays_open() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("saved.txt");
    block_writes(&target);
    let mut controller = controller();
    let mut model = PetModel::new();
    model.set_new_doc_without_file();
    type_text(&mut model, "unnamed");

    answer(&mut controller, &[true, true]);
    controller.dialogs_mut().saves.push_back(Some(target.clone()));
    assert_eq!(controller.quit(&mut model), Flow::Continue);

    assert_eq!(controller.dialogs().errors.len(), 1);
    assert!(!target.exists());
    assert!(model.file().is_none());
    assert_eq!(text(&model), "unnamed");
}
