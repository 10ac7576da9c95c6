use auditrack::model::FunctionRecord;
use auditrack::reconcile::reconcile;
use auditrack::store::normalize::normalize_state;
use proptest::prelude::*;
use serde_json::{Value, json};
use std::path::Path;

const ROOT: &str = "/audit";
const FILE: &str = "/audit/src/Vault.sol";

fn function_value() -> impl Strategy<Value = Value> {
    (
        prop::option::of("[a-z]{1,8}"),
        prop::option::of(0u32..500),
        prop::option::of(0u32..500),
        prop_oneof![Just(json!(0)), Just(json!(1)), Just(json!(7)), Just(json!(true)), Just(json!("x"))],
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(name, start, end, read, reviewed, entry, hidden)| {
            json!({
                "name": name,
                "startLine": start,
                "endLine": end,
                "readCount": read,
                "isReviewed": reviewed,
                "isEntrypoint": entry,
                "isHidden": hidden,
            })
        })
}

fn day_value() -> impl Strategy<Value = Value> {
    (
        prop_oneof![Just("2026-03-01"), Just("2026-03-02"), Just("not-a-date")],
        0u64..50,
        0u64..500,
    )
        .prop_map(|(date, functions, lines)| {
            json!({
                "date": date,
                "functionsRead": functions,
                "linesRead": lines,
                "actions": [{ "type": "functionRead", "filePath": FILE, "functionName": "f", "lineCount": 3 }],
            })
        })
}

fn state_value() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(prop_oneof![Just(json!("/audit/src")), Just(json!("")), Just(json!(3))], 0..4),
        prop::collection::vec(function_value(), 0..8),
        prop::collection::vec(day_value(), 0..4),
        prop::collection::vec(prop_oneof![Just("unread"), Just("read"), Just("reviewed"), Just("nope")], 0..3),
    )
        .prop_map(|(scope, functions, days, statuses)| {
            json!({
                "scopePaths": scope,
                "files": { FILE: { "functions": functions } },
                "functionFilters": { "statuses": statuses, "tags": ["admin"] },
                "progressHistory": days,
                "lastModified": 1_700_000_000_000_i64,
            })
        })
}

proptest! {
    #[test]
    fn test_normalize_is_a_fixed_point(document in state_value()) {
        let root = Path::new(ROOT);
        let once = normalize_state(&document, root).unwrap();
        let serialized = serde_json::to_value(&once).unwrap();
        let twice = normalize_state(&serialized, root).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_normalized_functions_are_well_formed(document in state_value()) {
        let state = normalize_state(&document, Path::new(ROOT)).unwrap();
        for file in state.files.values() {
            let mut ids = std::collections::HashSet::new();
            for function in &file.functions {
                prop_assert!(!function.name.is_empty());
                prop_assert!(function.end_line >= function.start_line);
                prop_assert!(function.read_count <= 1);
                prop_assert!(ids.insert(function.id.clone()));
            }
        }
        let mut dates: Vec<_> = state.progress_history.iter().map(|d| d.date).collect();
        dates.dedup();
        prop_assert_eq!(dates.len(), state.progress_history.len());
        prop_assert!(!state.function_filters.statuses.is_empty());
    }

    #[test]
    fn test_line_shift_preserves_flags(
        names in prop::collection::btree_set("[a-z]{1,6}", 1..8),
        shift in 1u32..50,
    ) {
        let previous: Vec<FunctionRecord> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let start = u32::try_from(i).unwrap() * 10;
                let mut record = FunctionRecord::new(FILE, name, start, start + 5);
                record.read_count = u32::from(i % 2 == 0);
                record.is_admin = i % 3 == 0;
                record
            })
            .collect();
        let shifted: Vec<FunctionRecord> = previous
            .iter()
            .map(|r| FunctionRecord::new(FILE, &r.name, r.start_line + shift, r.end_line + shift))
            .collect();

        let merged = reconcile(&previous, shifted);

        prop_assert_eq!(merged.len(), previous.len());
        for (old, new) in previous.iter().zip(&merged) {
            prop_assert_eq!(&old.name, &new.name);
            prop_assert_eq!(old.start_line + shift, new.start_line);
            prop_assert_eq!(old.flags(), new.flags());
        }
    }
}
