//! Placeholder expansion against a [`ContextStore`].
//!
//! The deep expander is a single left-to-right scan over an explicit stack of
//! open-brace frames. A closing brace resolves the innermost open frame, and
//! the substituted text is appended to the enclosing frame, so an outer key is
//! looked up only after every placeholder inside it has been resolved.
//! Substituted values are never rescanned.
//!
//! A frame whose content is empty or contains a double quote or a line break
//! is literal text rather than a placeholder. This keeps JSON payloads intact
//! while still expanding the placeholders inside them:
//! `{"id": "{UserId}"}` becomes `{"id": "42"}`.
//!
//! Frames still open at the end of the input are emitted exactly as written,
//! including any placeholders nested inside them.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;
use vouch_context::ContextStore;
use vouch_types::{canonical_text, TargetType};

use crate::coerce::convert_or_keep;
use crate::error::Result;

static FLAT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern compiles"));

/// Outcome of a deep expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expansion {
    /// The expanded text.
    pub text: String,
    /// The stored value, when the whole input was a single resolved placeholder.
    pub whole: Option<Value>,
    /// Keys that were not found in the store, in resolution order.
    pub unresolved: Vec<String>,
}

struct Frame {
    start: usize,
    buf: String,
}

fn is_placeholder_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains(['"', '\n', '\r'])
}

/// Template expander bound to one store.
pub struct Expander<'s, S: ?Sized> {
    store: &'s S,
    warn_on_unresolved: bool,
}

impl<'s, S> Expander<'s, S>
where
    S: ContextStore + ?Sized,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            warn_on_unresolved: true,
        }
    }

    /// Whether to log a warning for every key missing from the store.
    pub fn warn_on_unresolved(mut self, enabled: bool) -> Self {
        self.warn_on_unresolved = enabled;
        self
    }

    /// Substitute flat `{key}` tokens. Unknown keys are left as written.
    pub fn shallow(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in FLAT_PLACEHOLDER.captures_iter(text) {
            let (Some(token), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..token.start()]);
            match self.store.get(key.as_str())? {
                Some(value) => out.push_str(&canonical_text(&value)),
                None => {
                    if self.warn_on_unresolved {
                        warn!(key = key.as_str(), "unresolved placeholder left as written");
                    }
                    out.push_str(token.as_str());
                }
            }
            last = token.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Resolve nested placeholders innermost first. Unknown keys expand to
    /// the empty string.
    pub fn deep(&self, text: &str) -> Result<Expansion> {
        let mut out = String::with_capacity(text.len());
        let mut frames: Vec<Frame> = Vec::new();
        let mut whole = None;
        let mut unresolved = Vec::new();

        for (pos, ch) in text.char_indices() {
            match ch {
                '{' => frames.push(Frame {
                    start: pos,
                    buf: String::new(),
                }),
                '}' => {
                    let Some(frame) = frames.pop() else {
                        out.push('}');
                        continue;
                    };
                    let replacement = if is_placeholder_key(&frame.buf) {
                        match self.store.get(&frame.buf)? {
                            Some(value) => {
                                let rendered = canonical_text(&value);
                                if frames.is_empty() && frame.start == 0 && pos + 1 == text.len() {
                                    whole = Some(value);
                                }
                                rendered
                            }
                            None => {
                                if self.warn_on_unresolved {
                                    warn!(key = %frame.buf, "unresolved placeholder expanded to empty string");
                                }
                                unresolved.push(frame.buf);
                                String::new()
                            }
                        }
                    } else {
                        format!("{{{}}}", frame.buf)
                    };
                    match frames.last_mut() {
                        Some(parent) => parent.buf.push_str(&replacement),
                        None => out.push_str(&replacement),
                    }
                }
                _ => match frames.last_mut() {
                    Some(frame) => frame.buf.push(ch),
                    None => out.push(ch),
                },
            }
        }

        if let Some(outermost) = frames.first() {
            out.push_str(&text[outermost.start..]);
        }

        Ok(Expansion {
            text: out,
            whole,
            unresolved,
        })
    }

    /// Deep expansion followed by coercion to `target`.
    ///
    /// When the input is exactly one placeholder, the stored value itself is
    /// coerced instead of its text form. Coercion failures keep the uncoerced
    /// value.
    pub fn deep_as(&self, text: &str, target: TargetType) -> Result<Value> {
        let expansion = self.deep(text)?;
        if target == TargetType::String {
            return Ok(Value::String(expansion.text));
        }
        let value = expansion.whole.unwrap_or(Value::String(expansion.text));
        Ok(convert_or_keep(value, target))
    }
}

/// Substitute flat `{key}` tokens in `text`.
pub fn expand_shallow<S>(store: &S, text: &str) -> Result<String>
where
    S: ContextStore + ?Sized,
{
    Expander::new(store).shallow(text)
}

/// Resolve nested `{key}` placeholders in `text`.
pub fn expand_deep<S>(store: &S, text: &str) -> Result<String>
where
    S: ContextStore + ?Sized,
{
    Ok(Expander::new(store).deep(text)?.text)
}

/// Resolve nested placeholders and coerce the result to `target`.
pub fn expand_deep_as<S>(store: &S, text: &str, target: TargetType) -> Result<Value>
where
    S: ContextStore + ?Sized,
{
    Expander::new(store).deep_as(text, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vouch_context::InMemoryContextStore;

    fn store(entries: &[(&str, Value)]) -> InMemoryContextStore {
        InMemoryContextStore::with_entries(entries.iter().map(|(k, v)| (*k, v.clone())))
    }

    #[test]
    fn resolves_a_flat_placeholder() {
        let s = store(&[("Foo", json!("bar"))]);
        assert_eq!(expand_deep(&s, "value={Foo}").unwrap(), "value=bar");
    }

    #[test]
    fn missing_key_becomes_empty() {
        let s = store(&[]);
        assert_eq!(expand_deep(&s, "{Missing}").unwrap(), "");
        assert_eq!(expand_deep(&s, "a{Missing}b").unwrap(), "ab");
    }

    #[test]
    fn records_unresolved_keys() {
        let s = store(&[("A", json!(1))]);
        let expansion = Expander::new(&s).deep("{A}{B}{C}").unwrap();
        assert_eq!(expansion.text, "1");
        assert_eq!(expansion.unresolved, vec!["B", "C"]);
    }

    #[test]
    fn nested_key_is_built_innermost_first() {
        let s = store(&[
            ("Index", json!(1)),
            ("ResponseData_[1].id", json!("u-2")),
        ]);
        assert_eq!(
            expand_deep(&s, "user={ResponseData_[{Index}].id}").unwrap(),
            "user=u-2"
        );
    }

    #[test]
    fn doubly_nested_keys() {
        let s = store(&[("a", json!("b")), ("b", json!("c")), ("c", json!("done"))]);
        assert_eq!(expand_deep(&s, "{{{a}}}").unwrap(), "done");
    }

    #[test]
    fn non_string_values_are_json() {
        let s = store(&[("n", json!(3)), ("obj", json!({"k": [1, 2]})), ("nil", json!(null))]);
        assert_eq!(expand_deep(&s, "{n}|{obj}|{nil}").unwrap(), r#"3|{"k":[1,2]}|null"#);
    }

    #[test]
    fn unclosed_run_is_left_verbatim() {
        let s = store(&[("a", json!("X"))]);
        assert_eq!(expand_deep(&s, "{x{a}").unwrap(), "{x{a}");
        assert_eq!(expand_deep(&s, "{a} {b").unwrap(), "X {b");
    }

    #[test]
    fn stray_closing_brace_is_literal() {
        let s = store(&[("a", json!("X"))]);
        assert_eq!(expand_deep(&s, "}{a}}").unwrap(), "}X}");
    }

    #[test]
    fn json_payload_survives_expansion() {
        let s = store(&[("UserId", json!(42)), ("Name", json!("Ann"))]);
        let text = r#"{"id": {UserId}, "name": "{Name}", "meta": {}}"#;
        assert_eq!(
            expand_deep(&s, text).unwrap(),
            r#"{"id": 42, "name": "Ann", "meta": {}}"#
        );
    }

    #[test]
    fn pretty_json_survives_expansion() {
        let s = store(&[("Token", json!("t0k"))]);
        let text = "{\n  \"auth\": {\n    \"token\": \"{Token}\"\n  }\n}";
        assert_eq!(
            expand_deep(&s, text).unwrap(),
            "{\n  \"auth\": {\n    \"token\": \"t0k\"\n  }\n}"
        );
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let s = store(&[("A", json!("{A}")), ("B", json!("{Missing}"))]);
        assert_eq!(expand_deep(&s, "{A}").unwrap(), "{A}");
        assert_eq!(expand_deep(&s, "{B}").unwrap(), "{Missing}");
    }

    #[test]
    fn whole_placeholder_keeps_stored_value() {
        let s = store(&[("Count", json!(5))]);
        let expansion = Expander::new(&s).deep("{Count}").unwrap();
        assert_eq!(expansion.whole, Some(json!(5)));
        assert_eq!(Expander::new(&s).deep(" {Count}").unwrap().whole, None);
    }

    #[test]
    fn typed_expansion() {
        let s = store(&[
            ("Count", json!(5)),
            ("Digit", json!("7")),
            ("Flag", json!("true")),
            ("List", json!([1, 2])),
        ]);
        assert_eq!(expand_deep_as(&s, "{Count}", TargetType::Number).unwrap(), json!(5));
        assert_eq!(expand_deep_as(&s, "1{Digit}", TargetType::Number).unwrap(), json!(17));
        assert_eq!(expand_deep_as(&s, "{Flag}", TargetType::Boolean).unwrap(), json!(true));
        assert_eq!(expand_deep_as(&s, "{List}", TargetType::Array).unwrap(), json!([1, 2]));
        assert_eq!(expand_deep_as(&s, "{Count}", TargetType::String).unwrap(), json!("5"));
    }

    #[test]
    fn typed_expansion_falls_back_on_failure() {
        let s = store(&[("Word", json!("abc"))]);
        assert_eq!(expand_deep_as(&s, "{Word}", TargetType::Number).unwrap(), json!("abc"));
        assert_eq!(expand_deep_as(&s, "{Word}", TargetType::Object).unwrap(), json!("abc"));
    }

    #[test]
    fn shallow_substitutes_flat_tokens() {
        let s = store(&[("Host", json!("api.local")), ("Port", json!(8080))]);
        assert_eq!(
            expand_shallow(&s, "https://{Host}:{Port}/v1").unwrap(),
            "https://api.local:8080/v1"
        );
    }

    #[test]
    fn shallow_keeps_unknown_tokens() {
        let s = store(&[]);
        assert_eq!(expand_shallow(&s, "id={Missing}").unwrap(), "id={Missing}");
    }

    #[test]
    fn shallow_does_not_nest() {
        let s = store(&[("b", json!("x")), ("ax", json!("never"))]);
        assert_eq!(expand_shallow(&s, "{a{b}}").unwrap(), "{ax}");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let s = store(&[("name", json!("Zoë"))]);
        assert_eq!(expand_deep(&s, "héllo {name} ✓").unwrap(), "héllo Zoë ✓");
        assert_eq!(expand_deep(&s, "✓{ü").unwrap(), "✓{ü");
    }
}
