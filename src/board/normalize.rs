use super::{trim_label, GroupKey};
use crate::value::{format_number, RawValue};

/// Name of the wrapper field some hosts use to carry the real payload.
const DATA_FIELD: &str = "data";

/// Canonicalize a property value into the key used for grouping and for
/// persisted column order.
///
/// Total and deterministic: the same value always yields the same key and no
/// input can make it fail. Empty or unresolvable values map to
/// [`GroupKey::uncategorized`].
pub fn normalize(value: &RawValue) -> GroupKey {
    match value {
        RawValue::Null => GroupKey::uncategorized(),
        // Scalars are used as-is, zero and false included.
        RawValue::Number(n) => GroupKey::from_trimmed(format_number(*n)),
        RawValue::Bool(b) => GroupKey::from_trimmed(b.to_string()),
        RawValue::Text(s) => normalize_text(s),
        RawValue::Wrapped(obj) => GroupKey::from_text(&obj.to_text()),
        RawValue::Object(_) => match value.field_ignore_case(DATA_FIELD) {
            Some(inner) => normalize(inner),
            None => serialize_fallback(value),
        },
        RawValue::Array(_) => serialize_fallback(value),
    }
}

/// Strings may carry a JSON-encoded wrapper; unwrap it before falling back to
/// the literal text.
fn normalize_text(s: &str) -> GroupKey {
    let trimmed = trim_label(s);
    if trimmed.is_empty() {
        return GroupKey::uncategorized();
    }
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let serde_json::Value::Object(map) = &parsed {
            if let Some((_, inner)) = map.iter().find(|(k, _)| k.eq_ignore_ascii_case(DATA_FIELD)) {
                return normalize(&RawValue::from(inner.clone()));
            }
        }
    }
    GroupKey::from_trimmed(trimmed.to_string())
}

fn serialize_fallback(value: &RawValue) -> GroupKey {
    match serde_json::to_string(value) {
        Ok(s) => {
            let s = trim_label(&s);
            if s.is_empty() || s == "null" {
                GroupKey::uncategorized()
            } else {
                GroupKey::from_trimmed(s.to_string())
            }
        }
        Err(_) => GroupKey::uncategorized(),
    }
}
