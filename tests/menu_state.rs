//! Item enablement over arbitrary model states

use pet::{Item, ItemStates, ModelState, PetModel};
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = ModelState> {
    (any::<bool>(), 0usize..4, any::<bool>(), any::<bool>()).prop_map(
        |(has_document, len, has_file, synchronized)| ModelState {
            has_document,
            document_len: if has_document { len } else { 0 },
            has_file,
            // Synchronized needs both a document and a file
            synchronized: synchronized && has_document && has_file,
        },
    )
}

proptest! {
    #[test]
    fn save_enabled_iff_document_file_and_unsynchronized(state in any_state()) {
        let expected = state.has_document && state.has_file && !state.synchronized;
        prop_assert_eq!(Item::Save.is_enabled(&state), expected);
        prop_assert_eq!(Item::Reopen.is_enabled(&state), expected);
    }

    #[test]
    fn document_items_need_a_document(state in any_state()) {
        prop_assert_eq!(Item::SaveAs.is_enabled(&state), state.has_document);
        prop_assert_eq!(Item::Close.is_enabled(&state), state.has_document);
        prop_assert_eq!(
            Item::Clear.is_enabled(&state),
            state.has_document && state.document_len > 0
        );
    }

    #[test]
    fn creation_items_always_enabled(state in any_state()) {
        for item in [Item::New, Item::NewFromFile, Item::Open, Item::Quit] {
            prop_assert!(item.is_enabled(&state));
        }
    }

    #[test]
    fn item_states_snapshot_matches_predicates(state in any_state()) {
        let states = ItemStates::from_state(&state);
        for item in Item::ALL {
            prop_assert_eq!(states.is_enabled(item), item.is_enabled(&state));
        }
    }

    #[test]
    fn edits_always_unsynchronize(text in "[a-z\\n]{1,20}") {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "seed").unwrap();

        let mut model = PetModel::new();
        model.set_new_doc_and_new_file(&path).unwrap();
        prop_assert!(model.is_synchronized());

        prop_assert!(model.edit(|doc| doc.insert_str(&text)));
        let state = model.state();
        prop_assert!(!state.synchronized);
        prop_assert!(Item::Save.is_enabled(&state));
    }
}
