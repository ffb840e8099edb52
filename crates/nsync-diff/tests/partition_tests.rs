use nsync_diff::diff;
use nsync_model::{EventEntry, EventTypeId, IdentityKey, Parameter, SchemeRef};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn entry_strategy() -> impl Strategy<Value = EventEntry> {
    (
        1..6i64,
        prop_oneof![Just("Group"), Just("Reporter"), Just("User"), Just("Single_Email_Address")],
        proptest::option::of("[a-c]{1,2}"),
    )
        .prop_map(|(event, channel, parameter)| EventEntry {
            key: IdentityKey::new(EventTypeId(event), channel, parameter.map(Parameter::new)),
            id: None,
            scheme: SchemeRef {
                id: None,
                name: "prop".to_string(),
            },
        })
}

fn key_set(entries: &[EventEntry]) -> BTreeSet<IdentityKey> {
    entries.iter().map(|e| e.key.clone()).collect()
}

proptest! {
    #[test]
    fn prop_diff_partitions_both_sides(
        before in proptest::collection::vec(entry_strategy(), 0..12),
        after in proptest::collection::vec(entry_strategy(), 0..12),
    ) {
        let result = diff(&before, &after);

        let before_keys = key_set(&before);
        let after_keys = key_set(&after);
        let removed = key_set(&result.to_remove);
        let added = key_set(&result.to_add);
        let unchanged: BTreeSet<IdentityKey> = result.unchanged.iter().cloned().collect();

        // to_remove ∪ unchanged = before, to_add ∪ unchanged = after
        prop_assert_eq!(removed.union(&unchanged).cloned().collect::<BTreeSet<_>>(), before_keys.clone());
        prop_assert_eq!(added.union(&unchanged).cloned().collect::<BTreeSet<_>>(), after_keys.clone());

        // pairwise disjoint
        prop_assert!(removed.is_disjoint(&added));
        prop_assert!(removed.is_disjoint(&unchanged));
        prop_assert!(added.is_disjoint(&unchanged));

        // no key appears twice within a result set
        prop_assert_eq!(removed.len(), result.to_remove.len());
        prop_assert_eq!(added.len(), result.to_add.len());
    }

    #[test]
    fn prop_self_diff_is_empty(side in proptest::collection::vec(entry_strategy(), 0..12)) {
        let result = diff(&side, &side);
        prop_assert!(result.is_empty());
        prop_assert_eq!(result.unchanged.len(), key_set(&side).len());
    }

    #[test]
    fn prop_diff_is_antisymmetric(
        before in proptest::collection::vec(entry_strategy(), 0..12),
        after in proptest::collection::vec(entry_strategy(), 0..12),
    ) {
        let forward = diff(&before, &after);
        let backward = diff(&after, &before);
        prop_assert_eq!(key_set(&forward.to_add), key_set(&backward.to_remove));
        prop_assert_eq!(key_set(&forward.to_remove), key_set(&backward.to_add));
    }
}
