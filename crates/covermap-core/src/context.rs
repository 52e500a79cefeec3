//! Context Builder - normalizes stored questionnaire answers
//!
//! Turns a mapping of question key to stored answer text into a flat, typed
//! [`Context`] with a defined default for every recognized field. Building a
//! context never fails: anything that cannot be coerced to the declared type
//! falls back to that field's default, exactly like an absent key.
//!
//! ## Coercion rules
//!
//! - Stored text is JSON-decoded first; text that is not valid JSON is used as
//!   a raw string.
//! - Falsy values (`null`, `false`, `0`, `""`, empty list/object) collapse to
//!   the numeric default, so an explicit `0` is indistinguishable from absent.
//! - Integers truncate floats toward zero; strings must parse cleanly.
//! - Booleans follow scalar truthiness; lists and objects are never true.
//! - `province` keeps any JSON string verbatim and defaults to `"ON"`.
//!
//! Unrecognized keys are kept in [`Context::extra`] for display only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Province assumed when the questionnaire does not say otherwise
pub const DEFAULT_PROVINCE: &str = "ON";

/// Question keys understood by the risk rules
pub const RECOGNIZED_KEYS: [&str; 11] = [
    "age",
    "income",
    "dependants",
    "province",
    "has_vehicle",
    "liability_limit",
    "owns_home",
    "rents",
    "has_mortgage",
    "travels_outside_canada",
    "has_existing_life",
];

/// Normalized, typed view of a questionnaire's answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub age: i64,
    pub income: f64,
    pub dependants: i64,
    pub province: String,
    pub has_vehicle: bool,
    pub liability_limit: f64,
    pub owns_home: bool,
    pub rents: bool,
    pub has_mortgage: bool,
    pub travels_outside_canada: bool,
    pub has_existing_life: bool,
    /// Answers to questions the rules don't know about, kept verbatim for display
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            age: 0,
            income: 0.0,
            dependants: 0,
            province: DEFAULT_PROVINCE.to_string(),
            has_vehicle: false,
            liability_limit: 0.0,
            owns_home: false,
            rents: false,
            has_mortgage: false,
            travels_outside_canada: false,
            has_existing_life: false,
            extra: BTreeMap::new(),
        }
    }
}

impl Context {
    /// Build a context from already-decoded answer values
    pub fn from_values(values: &BTreeMap<String, Value>) -> Self {
        let get = |key: &str| values.get(key);

        let extra = values
            .iter()
            .filter(|(key, _)| !is_recognized(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            age: coerce_int(get("age"), 0),
            income: coerce_number(get("income"), 0.0),
            dependants: coerce_int(get("dependants"), 0),
            province: coerce_string(get("province"), DEFAULT_PROVINCE),
            has_vehicle: coerce_bool(get("has_vehicle")),
            liability_limit: coerce_number(get("liability_limit"), 0.0),
            owns_home: coerce_bool(get("owns_home")),
            rents: coerce_bool(get("rents")),
            has_mortgage: coerce_bool(get("has_mortgage")),
            travels_outside_canada: coerce_bool(get("travels_outside_canada")),
            has_existing_life: coerce_bool(get("has_existing_life")),
            extra,
        }
    }

    /// Recognized fields plus extras as one flat map (for prompts and reports)
    pub fn to_display_map(&self) -> BTreeMap<String, Value> {
        let mut map = self.extra.clone();
        map.insert("age".into(), Value::from(self.age));
        map.insert("income".into(), Value::from(self.income));
        map.insert("dependants".into(), Value::from(self.dependants));
        map.insert("province".into(), Value::from(self.province.clone()));
        map.insert("has_vehicle".into(), Value::from(self.has_vehicle));
        map.insert("liability_limit".into(), Value::from(self.liability_limit));
        map.insert("owns_home".into(), Value::from(self.owns_home));
        map.insert("rents".into(), Value::from(self.rents));
        map.insert("has_mortgage".into(), Value::from(self.has_mortgage));
        map.insert(
            "travels_outside_canada".into(),
            Value::from(self.travels_outside_canada),
        );
        map.insert(
            "has_existing_life".into(),
            Value::from(self.has_existing_life),
        );
        map
    }
}

/// Build a context from stored answer text (the shape persistence returns)
pub fn build_context(stored: &BTreeMap<String, String>) -> Context {
    let values: BTreeMap<String, Value> = stored
        .iter()
        .map(|(key, raw)| (key.clone(), decode_stored(raw)))
        .collect();
    Context::from_values(&values)
}

/// Decode a stored answer, falling back to the raw text when it isn't JSON
pub fn decode_stored(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Whether a key is one the risk rules consume
pub fn is_recognized(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Integer coercion; never fails
pub fn coerce_int(value: Option<&Value>, default: i64) -> i64 {
    let Some(value) = value.filter(|v| !is_falsy(v)) else {
        return default;
    };

    match value {
        Value::Bool(true) => 1,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                // `as` saturates and truncates toward zero
                n.as_f64().map(|f| f as i64).unwrap_or(default)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(default),
        _ => default,
    }
}

/// Floating-point coercion; never fails
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    let Some(value) = value.filter(|v| !is_falsy(v)) else {
        return default;
    };

    let parsed = match value {
        Value::Bool(true) => Some(1.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|f| f.is_finite()).unwrap_or(default)
}

/// Boolean coercion: truthy scalars are true, everything else false
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// String coercion: JSON strings pass through, anything else is the default
pub fn coerce_string(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}
