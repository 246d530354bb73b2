//! Canonical encoding of user-supplied filter conditions
//!
//! Raw command input arrives as optional scalars and comma-separated lists.
//! This module normalizes that input into the canonical key/value mapping
//! that travels to the alert rule service (as an embedded JSON string) and is
//! decoded again for display.

use serde_json::{Map, Value};

/// Canonical condition mapping. Keys come from the fixed field vocabulary;
/// values are scalars or non-empty lists of trimmed, non-empty strings.
/// Absent keys mean "no constraint"; an unset field is never encoded.
pub type ConditionSet = Map<String, Value>;

/// Fields whose raw value is a comma-separated list.
///
/// Membership here is a static lookup, not runtime introspection: a field is
/// either in this table and split into a list, or treated as a scalar.
const ARRAY_FIELDS: &[&str] = &[
    "include_tags",
    "include_jobs",
    "include_playstyles",
    "include_activity_times",
];

/// Check whether a field takes a comma-separated list value.
pub fn is_array_field(name: &str) -> bool {
    ARRAY_FIELDS.contains(&name)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a raw condition mapping into its canonical form.
///
/// Array fields are split on commas with whitespace trimmed and empty
/// segments dropped; a field whose list comes out empty is omitted entirely,
/// as are null values. Scalar fields are copied verbatim. The function is
/// pure and idempotent: canonicalizing an already-canonical mapping returns
/// it unchanged.
pub fn canonicalize(raw: ConditionSet) -> ConditionSet {
    let mut canonical = Map::new();

    for (field, value) in raw {
        if value.is_null() {
            continue;
        }

        if !is_array_field(&field) {
            canonical.insert(field, value);
            continue;
        }

        let items: Vec<String> = match value {
            Value::String(raw_list) => split_list(&raw_list),
            Value::Array(values) => values
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(entry) => Some(entry),
                    _ => None,
                })
                .flat_map(|entry| split_list(&entry))
                .collect(),
            _ => Vec::new(),
        };

        if !items.is_empty() {
            canonical.insert(field, Value::Array(items.into_iter().map(Value::String).collect()));
        }
    }

    canonical
}

/// Decode an embedded `conditions_json` string back into a condition set.
pub fn decode(conditions_json: &str) -> Result<ConditionSet, serde_json::Error> {
    serde_json::from_str(conditions_json)
}

/// Render a condition set as one `- key: value` line per entry.
///
/// An empty set means the rule matches every new post, and says so.
pub fn render_conditions(conditions: &ConditionSet) -> String {
    if conditions.is_empty() {
        return "no conditions (matches every new post)".to_string();
    }

    conditions
        .iter()
        .map(|(field, value)| format!("- `{}`: `{}`", field, render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Typed command input for the add operation.
///
/// Every filter field is optional; `None` means the caller left it unset and
/// the field never appears in the encoded conditions.
#[derive(Debug, Clone, Default)]
pub struct RuleFields {
    /// Minimum uniqueness score (0-100).
    pub min_score: Option<f64>,
    /// Recruitment purpose (e.g. "friends", "static").
    pub purpose: Option<String>,
    /// Poster's stated gender.
    pub author_gender: Option<String>,
    /// Home server name.
    pub server: Option<String>,
    /// Voice chat availability marker.
    pub voice_chat: Option<String>,
    /// Playstyle tags, comma-separated.
    pub include_tags: Option<String>,
    /// Desired jobs, comma-separated.
    pub include_jobs: Option<String>,
    /// Playstyle categories, comma-separated.
    pub include_playstyles: Option<String>,
    /// Activity time slots, comma-separated.
    pub include_activity_times: Option<String>,
}

impl RuleFields {
    /// Encode the typed fields into a canonical condition set.
    pub fn to_conditions(&self) -> ConditionSet {
        let mut raw = Map::new();

        if let Some(score) = self.min_score {
            raw.insert("min_score".to_string(), Value::from(score));
        }
        for (field, value) in [
            ("purpose", &self.purpose),
            ("author_gender", &self.author_gender),
            ("server", &self.server),
            ("voice_chat", &self.voice_chat),
            ("include_tags", &self.include_tags),
            ("include_jobs", &self.include_jobs),
            ("include_playstyles", &self.include_playstyles),
            ("include_activity_times", &self.include_activity_times),
        ] {
            if let Some(text) = value {
                raw.insert(field.to_string(), Value::String(text.clone()));
            }
        }

        canonicalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(entries: &[(&str, Value)]) -> ConditionSet {
        entries
            .iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn array_field_splits_trims_and_drops_empty_segments() {
        let fields = RuleFields {
            include_tags: Some("a, b ,,c".to_string()),
            ..RuleFields::default()
        };

        let conditions = fields.to_conditions();
        assert_eq!(conditions.get("include_tags"), Some(&json!(["a", "b", "c"])));
    }

    #[test]
    fn empty_and_separator_only_lists_are_omitted() {
        for raw_list in ["", ","] {
            let fields = RuleFields {
                include_jobs: Some(raw_list.to_string()),
                ..RuleFields::default()
            };

            let conditions = fields.to_conditions();
            assert!(!conditions.contains_key("include_jobs"), "input {:?}", raw_list);
        }
    }

    #[test]
    fn unset_fields_never_appear_as_keys() {
        let fields = RuleFields {
            purpose: Some("friends".to_string()),
            ..RuleFields::default()
        };

        let conditions = fields.to_conditions();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions.get("purpose"), Some(&json!("friends")));
    }

    #[test]
    fn scalars_are_copied_verbatim() {
        let fields = RuleFields {
            min_score: Some(70.0),
            voice_chat: Some("yes".to_string()),
            ..RuleFields::default()
        };

        let conditions = fields.to_conditions();
        assert_eq!(conditions.get("min_score"), Some(&json!(70.0)));
        assert_eq!(conditions.get("voice_chat"), Some(&json!("yes")));
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let input = raw(&[
            ("min_score", json!(55.5)),
            ("include_tags", json!(" raid , casual,,")),
            ("purpose", json!("static")),
            ("server", Value::Null),
            ("include_jobs", json!(["healer ", " tank"])),
        ]);

        let once = canonicalize(input);
        let twice = canonicalize(once.clone());
        assert_eq!(twice, once);
    }

    #[test]
    fn canonicalize_drops_null_values() {
        let canonical = canonicalize(raw(&[("purpose", Value::Null)]));
        assert!(canonical.is_empty());
    }

    #[test]
    fn canonicalize_preserves_field_order() {
        let fields = RuleFields {
            min_score: Some(10.0),
            purpose: Some("friends".to_string()),
            include_tags: Some("a,b".to_string()),
            ..RuleFields::default()
        };

        let conditions = fields.to_conditions();
        let keys: Vec<&str> = conditions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["min_score", "purpose", "include_tags"]);
    }

    #[test]
    fn decode_rejects_non_object_payloads() {
        assert!(decode("not json").is_err());
        assert!(decode("[1, 2]").is_err());
        assert!(decode("{}").unwrap().is_empty());
    }

    #[test]
    fn render_empty_set_mentions_match_all() {
        let rendered = render_conditions(&ConditionSet::new());
        assert_eq!(rendered, "no conditions (matches every new post)");
    }

    #[test]
    fn render_lists_one_line_per_condition() {
        let conditions = canonicalize(raw(&[
            ("purpose", json!("friends")),
            ("include_tags", json!("raid,casual")),
        ]));

        let rendered = render_conditions(&conditions);
        assert_eq!(rendered, "- `purpose`: `friends`\n- `include_tags`: `raid, casual`");
    }
}
