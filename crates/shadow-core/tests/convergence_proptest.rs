#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{mirrored_store, node_of};
use proptest::prelude::*;
use shadow_core::{check_record, Record, RecordId, Store};

#[derive(Debug, Clone)]
enum Edit {
    Save { id: u64, title: String },
    Delete { id: u64 },
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (1u64..6, "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?")
            .prop_map(|(id, title)| Edit::Save { id, title }),
        1 => (1u64..6).prop_map(|id| Edit::Delete { id }),
    ]
}

proptest! {
    /// After any sequence of live edits, every record that still exists and
    /// got a node is a consistent pair, and no node outlives its record
    #[test]
    fn live_edits_keep_pairs_consistent(edits in prop::collection::vec(edit(), 1..30)) {
        let (store, _registry, _) = mirrored_store();

        for edit in &edits {
            match edit {
                Edit::Save { id, title } => {
                    // Ids double as a slug suffix so titles never collide
                    let record = Record::new(*id, "actor", title.clone())
                        .with_slug(format!("actor-{}", id));
                    store.save_record(record).unwrap();
                }
                Edit::Delete { id } => {
                    store.delete_record(RecordId(*id)).unwrap();
                }
            }
        }

        let mut live = 0;
        for id in 1u64..6 {
            if let Some(record) = store.get_record(RecordId(id)).unwrap() {
                live += 1;
                let node = node_of(&store, id).expect("live record has a node");
                prop_assert_eq!(&node.name, &record.title);
                prop_assert!(check_record(&store, RecordId(id), "_actor").unwrap().passed());
            }
        }
        prop_assert_eq!(store.node_count("_actor"), live);
    }
}
