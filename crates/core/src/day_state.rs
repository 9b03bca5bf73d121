//! Draft key construction and the answer map.
//!
//! A learner's in-progress answers for one day are stored as a flat JSON
//! object mapping field paths (see [`crate::curriculum`]) to values, under a
//! key scoped by user, program slug, and day number. Earlier builds used an
//! unscoped key without the user segment; those are migrated once on load by
//! [`crate::draft::DraftCache`].

use std::collections::BTreeMap;

use serde_json::Value;

/// User segment used for unauthenticated / preview access.
pub const ANON_USER_KEY: &str = "anon";

/// Current key format version segment.
const VERSION: &str = "v2";

/// Flat mapping from field path to stored value.
pub type AnswerMap = BTreeMap<String, Value>;

/// Key for a day's draft answers: `draft:v2:{user}:{slug}:day:{n}`.
pub fn draft_key(user_key: &str, program_slug: &str, day: u32) -> String {
    format!("draft:{VERSION}:{user_key}:{program_slug}:day:{day}")
}

/// Legacy unscoped key format: `draft:{slug}:day:{n}`.
pub fn legacy_draft_key(program_slug: &str, day: u32) -> String {
    format!("draft:{program_slug}:day:{day}")
}

/// Key recording the most recently visited day: `draft:v2:{user}:{slug}:last-day`.
pub fn last_day_key(user_key: &str, program_slug: &str) -> String {
    format!("draft:{VERSION}:{user_key}:{program_slug}:last-day")
}

/// Parse a stored draft payload.
///
/// Anything that is not a JSON object yields an empty map; a corrupt draft
/// must never block the learner.
pub fn parse_answers(raw: &str) -> AnswerMap {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => AnswerMap::new(),
    }
}

/// Serialize an answer map for storage.
pub fn serialize_answers(answers: &AnswerMap) -> String {
    serde_json::to_string(answers).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_formats() {
        assert_eq!(draft_key("42", "reset-7", 3), "draft:v2:42:reset-7:day:3");
        assert_eq!(
            draft_key(ANON_USER_KEY, "reset-7", 1),
            "draft:v2:anon:reset-7:day:1"
        );
        assert_eq!(legacy_draft_key("reset-7", 3), "draft:reset-7:day:3");
        assert_eq!(last_day_key("42", "reset-7"), "draft:v2:42:reset-7:last-day");
    }

    #[test]
    fn answers_round_trip() {
        let mut answers = AnswerMap::new();
        answers.insert("ex.breathing.duration".into(), json!(8));
        answers.insert("ex.gratitude.themes".into(), json!(["famille"]));

        let raw = serialize_answers(&answers);
        assert_eq!(parse_answers(&raw), answers);
    }

    #[test]
    fn corrupt_payload_yields_empty_map() {
        assert!(parse_answers("not json").is_empty());
        assert!(parse_answers("[1, 2]").is_empty());
        assert!(parse_answers("").is_empty());
    }
}
