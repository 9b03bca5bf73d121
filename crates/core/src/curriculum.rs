//! Program curriculum schema.
//!
//! A program's day-by-day structure is authored as JSON and stored in the
//! `programs.days` column. This module gives that JSON a typed shape: a
//! [`Curriculum`] is a list of [`DayDefinition`]s, each split into sections
//! (morning / noon / evening) holding exercises, whose form controls are
//! described by the [`FieldKind`] sum type. Rendering and validation both
//! match exhaustively on the kind, so adding a field type is a compile-time
//! checklist.
//!
//! Learner answers are keyed by *field path*, a synthetic string embedding
//! the exercise key (and, for repeater sub-fields, the item index):
//! `ex.breathing.duration`, `ex.gratitude.entries.0.note`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// Default cap on repeater items when the author does not specify one.
fn default_max_items() -> usize {
    10
}

/// One form control in an exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Stable key, unique within its exercise (or repeater item schema).
    pub key: String,
    /// Human-readable label shown to the learner.
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The type of a form control and its constraint payload.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type": "slider", "min": 0, "max": 10}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Slider {
        min: i64,
        max: i64,
    },
    Select {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
    },
    Boolean,
    Repeater {
        item_fields: Vec<Field>,
        #[serde(default)]
        min_items: usize,
        #[serde(default = "default_max_items")]
        max_items: usize,
    },
}

impl FieldKind {
    /// The value a control shows before the learner touches it.
    ///
    /// Sliders default to the integer midpoint of `[min, max]`; numbers use
    /// the empty-string sentinel so an untouched field stays distinguishable
    /// from an explicit `0`.
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Number => json!(""),
            FieldKind::Slider { min, max } => json!((min + max) / 2),
            FieldKind::Select { .. } => json!(""),
            FieldKind::MultiSelect { .. } => json!([]),
            FieldKind::Boolean => json!(false),
            FieldKind::Repeater {
                item_fields,
                min_items,
                ..
            } => {
                let item = default_repeater_item(item_fields);
                Value::Array(vec![item; *min_items])
            }
        }
    }

    /// Check that `value` has the shape this kind allows.
    ///
    /// Error messages are user-facing (French).
    pub fn validate_value(&self, value: &Value) -> Result<(), CoreError> {
        match self {
            FieldKind::Text | FieldKind::Textarea => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(invalid("une chaîne de caractères est attendue"))
                }
            }
            FieldKind::Number => {
                if value.is_number() || value == &json!("") {
                    Ok(())
                } else {
                    Err(invalid("un nombre (ou champ vide) est attendu"))
                }
            }
            FieldKind::Slider { min, max } => match value.as_i64() {
                Some(v) if (*min..=*max).contains(&v) => Ok(()),
                Some(v) => Err(invalid(&format!(
                    "la valeur {v} est hors de l'intervalle [{min}, {max}]"
                ))),
                None => Err(invalid("un entier est attendu")),
            },
            FieldKind::Select { options } => match value.as_str() {
                Some("") => Ok(()),
                Some(s) if options.iter().any(|o| o == s) => Ok(()),
                Some(s) => Err(invalid(&format!("« {s} » n'est pas une option valide"))),
                None => Err(invalid("une chaîne de caractères est attendue")),
            },
            FieldKind::MultiSelect { options } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| invalid("une liste d'options est attendue"))?;
                let mut seen = Vec::with_capacity(items.len());
                for item in items {
                    let s = item
                        .as_str()
                        .ok_or_else(|| invalid("une liste de chaînes est attendue"))?;
                    if !options.iter().any(|o| o == s) {
                        return Err(invalid(&format!("« {s} » n'est pas une option valide")));
                    }
                    if seen.contains(&s) {
                        return Err(invalid(&format!("option « {s} » en double")));
                    }
                    seen.push(s);
                }
                Ok(())
            }
            FieldKind::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(invalid("un booléen est attendu"))
                }
            }
            FieldKind::Repeater {
                item_fields,
                min_items,
                max_items,
            } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| invalid("une liste d'éléments est attendue"))?;
                if items.len() < *min_items || items.len() > *max_items {
                    return Err(invalid(&format!(
                        "le nombre d'éléments doit être entre {min_items} et {max_items}"
                    )));
                }
                for item in items {
                    let obj = item
                        .as_object()
                        .ok_or_else(|| invalid("chaque élément doit être un objet"))?;
                    for (key, sub_value) in obj {
                        let sub_field = item_fields
                            .iter()
                            .find(|f| &f.key == key)
                            .ok_or_else(|| invalid(&format!("champ inconnu : {key}")))?;
                        sub_field.kind.validate_value(sub_value)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Clamp a slider value into `[min, max]`.
    ///
    /// Non-slider kinds return the value unchanged; a non-integer slider
    /// value falls back to the midpoint default.
    pub fn clamp(&self, value: Value) -> Value {
        match self {
            FieldKind::Slider { min, max } => match value.as_i64() {
                Some(v) => json!(v.clamp(*min, *max)),
                None => self.default_value(),
            },
            _ => value,
        }
    }
}

/// A default repeater item: every sub-field at its default value.
fn default_repeater_item(item_fields: &[Field]) -> Value {
    let map = item_fields
        .iter()
        .map(|f| (f.key.clone(), f.kind.default_value()))
        .collect::<serde_json::Map<_, _>>();
    Value::Object(map)
}

fn invalid(detail: &str) -> CoreError {
    CoreError::Validation(format!("Valeur invalide : {detail}."))
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Toggle an option in a multi-select value.
///
/// If the option is present it is removed; otherwise it is appended once.
/// Anything that is not an array of strings is treated as empty.
pub fn toggle_multi_select(current: &Value, option: &str) -> Value {
    let mut items: Vec<String> = current
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    match items.iter().position(|o| o == option) {
        Some(idx) => {
            items.remove(idx);
        }
        None => items.push(option.to_string()),
    }
    json!(items)
}

/// Append a default item to a repeater value.
///
/// A no-op (the value is returned unchanged) when the item count is already
/// at `max_items`.
pub fn repeater_add(current: &Value, item_fields: &[Field], max_items: usize) -> Value {
    let mut items = current.as_array().cloned().unwrap_or_default();
    if items.len() >= max_items {
        return Value::Array(items);
    }
    items.push(default_repeater_item(item_fields));
    Value::Array(items)
}

/// Remove the item at `index` from a repeater value.
///
/// A no-op when removing would go below `min_items` or when `index` is out
/// of bounds.
pub fn repeater_remove(current: &Value, index: usize, min_items: usize) -> Value {
    let mut items = current.as_array().cloned().unwrap_or_default();
    if items.len() <= min_items || index >= items.len() {
        return Value::Array(items);
    }
    items.remove(index);
    Value::Array(items)
}

// ---------------------------------------------------------------------------
// Day structure
// ---------------------------------------------------------------------------

/// Time-of-day slot a section belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Noon,
    Evening,
}

/// One exercise within a section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A group of exercises for one time-of-day slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub slot: Slot,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// One day of a program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayDefinition {
    /// 1-based day number.
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl DayDefinition {
    /// Iterate every exercise across all sections.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        self.sections.iter().flat_map(|s| s.exercises.iter())
    }

    /// Resolve a field path to the [`FieldKind`] that governs its value.
    ///
    /// Accepts `ex.{exercise}.{field}` and the repeater sub-field form
    /// `ex.{exercise}.{field}.{index}.{sub_field}`. Returns `None` when the
    /// path does not name a control on this day.
    pub fn resolve_path(&self, path: &str) -> Option<&FieldKind> {
        let mut parts = path.split('.');
        if parts.next()? != "ex" {
            return None;
        }
        let exercise_key = parts.next()?;
        let field_key = parts.next()?;

        let field = self
            .exercises()
            .find(|e| e.key == exercise_key)?
            .fields
            .iter()
            .find(|f| f.key == field_key)?;

        match (parts.next(), parts.next(), parts.next()) {
            // Plain field path.
            (None, _, _) => Some(&field.kind),
            // Repeater sub-field path: index must parse, sub-field must exist.
            (Some(index), Some(sub_key), None) => {
                index.parse::<usize>().ok()?;
                match &field.kind {
                    FieldKind::Repeater { item_fields, .. } => item_fields
                        .iter()
                        .find(|f| f.key == sub_key)
                        .map(|f| &f.kind),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Build the storage path for an exercise field.
pub fn exercise_field_path(exercise_key: &str, field_key: &str) -> String {
    format!("ex.{exercise_key}.{field_key}")
}

/// Build the storage path for a repeater item's sub-field.
pub fn repeater_item_path(
    exercise_key: &str,
    field_key: &str,
    index: usize,
    sub_key: &str,
) -> String {
    format!("ex.{exercise_key}.{field_key}.{index}.{sub_key}")
}

// ---------------------------------------------------------------------------
// Curriculum
// ---------------------------------------------------------------------------

/// The full day-by-day structure of a program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Curriculum {
    pub days: Vec<DayDefinition>,
}

impl Curriculum {
    /// Parse a curriculum from the program's `days` JSON.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        serde_json::from_value(value.clone()).map_err(|e| {
            CoreError::Validation(format!("Structure du programme invalide : {e}"))
        })
    }

    /// Look up a day by its 1-based number.
    pub fn day(&self, n: u32) -> Option<&DayDefinition> {
        self.days.iter().find(|d| d.day == n)
    }

    pub fn day_count(&self) -> u32 {
        self.days.len() as u32
    }
}
