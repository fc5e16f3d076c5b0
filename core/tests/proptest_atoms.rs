use conscell::split::{rsplit, split};
use conscell::{Value, keyword, list, symbol};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Atom-ish names: printable ASCII, possibly with colons and dots
fn name() -> impl Strategy<Value = String> {
    "[a-z:.\\- ]{0,24}"
}

fn separator() -> impl Strategy<Value = String> {
    prop_oneof![Just(".".to_string()), Just(":".to_string()), Just("--".to_string())]
}

// ============================================================================
// Interning Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_symbol_interning_is_idempotent(raw in name()) {
        let a = symbol(&raw);
        let b = symbol(&raw);
        prop_assert!(a.ptr_eq(&b));
        prop_assert_eq!(a.name(), raw.as_str());
    }

    #[test]
    fn prop_keyword_name_has_no_outer_colons(raw in name()) {
        let kw = keyword(&raw);
        prop_assert!(!kw.name().starts_with(':'));
        prop_assert!(!kw.name().ends_with(':'));
        let wrapped = format!(":{raw}:");
        prop_assert!(kw.ptr_eq(&keyword(&wrapped)));
    }
}

// ============================================================================
// Split Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_split_rejoins(text in name(), sep in separator()) {
        let pieces = split(&text, Some(sep.as_str()), None).unwrap();
        prop_assert_eq!(pieces.join(sep.as_str()), text.clone());
        let pieces = rsplit(&text, Some(sep.as_str()), None).unwrap();
        prop_assert_eq!(pieces.join(sep.as_str()), text);
    }

    #[test]
    fn prop_maxsplit_bounds_piece_count(text in name(), sep in separator(), max in 0usize..4) {
        let pieces = split(&text, Some(sep.as_str()), Some(max)).unwrap();
        prop_assert!(pieces.len() <= max + 1);
        prop_assert_eq!(pieces.join(sep.as_str()), text.clone());

        let pieces = rsplit(&text, Some(sep.as_str()), Some(max)).unwrap();
        prop_assert!(pieces.len() <= max + 1);
        prop_assert_eq!(pieces.join(sep.as_str()), text);
    }

    #[test]
    fn prop_whitespace_split_has_no_empty_pieces(text in name()) {
        let pieces = split(&text, None, None).unwrap();
        prop_assert!(pieces.iter().all(|piece| !piece.is_empty()));
        prop_assert_eq!(pieces, text.split_whitespace().collect::<Vec<_>>());
    }
}

// ============================================================================
// Rendering Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_int_list_display_matches(items in prop::collection::vec(-1000i64..1000, 1..20)) {
        let l = list(items.iter().copied().map(Value::Int).collect::<Vec<_>>());
        let expected = format!(
            "({})",
            items.iter().map(i64::to_string).collect::<Vec<_>>().join(" ")
        );
        prop_assert_eq!(l.to_string(), expected);
    }
}
