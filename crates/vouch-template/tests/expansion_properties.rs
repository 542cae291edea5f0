//! Property tests for template expansion.

use proptest::prelude::*;
use serde_json::json;
use vouch_context::{ContextStore, InMemoryContextStore};
use vouch_template::{expand_deep, expand_shallow, Expander};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..Default::default()
    })]

    /// Property: deep expansion terminates on any brace soup.
    #[test]
    fn deep_expansion_terminates(text in "[{}a-c\"\\n ]{0,64}") {
        let store = InMemoryContextStore::with_entries([
            ("a", json!("{a}")),
            ("b", json!("}{")),
            ("c", json!({"x": 1})),
        ]);
        let expansion = Expander::new(&store).warn_on_unresolved(false).deep(&text);
        prop_assert!(expansion.is_ok());
    }

    /// Property: text without braces is returned unchanged.
    #[test]
    fn brace_free_text_is_untouched(text in "[^{}]{0,64}") {
        let store = InMemoryContextStore::new();
        prop_assert_eq!(expand_deep(&store, &text).unwrap(), text.clone());
        prop_assert_eq!(expand_shallow(&store, &text).unwrap(), text);
    }

    /// Property: against an empty store, expansion never grows the text.
    #[test]
    fn empty_store_never_grows_text(text in "[{}a-z]{0,64}") {
        let store = InMemoryContextStore::new();
        let expanded = Expander::new(&store).warn_on_unresolved(false).deep(&text).unwrap();
        prop_assert!(expanded.text.len() <= text.len());
    }

    /// Property: a stored string round-trips through a placeholder.
    #[test]
    fn stored_string_round_trips(key in "[A-Za-z_][A-Za-z0-9_.]{0,12}", value in "[^{}]{0,24}") {
        let store = InMemoryContextStore::new();
        store.set(&key, json!(value.clone())).unwrap();
        let text = format!("value={{{key}}}");
        prop_assert_eq!(expand_deep(&store, &text).unwrap(), format!("value={value}"));
    }
}
