//! Field order on the wire.
//!
//! Devices with little or no JSON parsing read attributes by position, so
//! every message variant is written with its keys in one declared order.
//! That order is data ([`FieldOrder`]) consumed by a single arranger, never
//! an accident of how a map happens to iterate.

use serde_json::{Map, Value};

/// How null values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Drop every object key whose value is null, at any depth.
    #[default]
    Compact,
    /// Keep nulls, and emit every declared top-level key even when the
    /// message has no value for it.
    ExplicitNull,
}

impl Profile {
    fn apply(self, value: Value) -> Value {
        match self {
            Profile::Compact => strip_nulls(value),
            Profile::ExplicitNull => value,
        }
    }
}

/// The canonical top-level key order of one message variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOrder {
    fields: &'static [&'static str],
}

impl FieldOrder {
    pub const fn new(fields: &'static [&'static str]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Rebuild `value` with its keys in declared order under `profile`.
    ///
    /// Keys the order does not declare are appended after the declared ones
    /// in their original relative order. Non-object values pass through
    /// with only the profile applied.
    pub fn arrange(&self, value: Value, profile: Profile) -> Value {
        let Value::Object(fields) = value else {
            return profile.apply(value);
        };

        let mut slots: Vec<Option<Value>> = vec![None; self.fields.len()];
        let mut undeclared = Vec::new();
        for (key, value) in fields {
            match self.fields.iter().position(|f| *f == key) {
                Some(i) => slots[i] = Some(value),
                None => undeclared.push((key, value)),
            }
        }

        let mut ordered = Map::with_capacity(slots.len() + undeclared.len());
        for (name, slot) in self.fields.iter().zip(slots) {
            match (slot.map(|v| profile.apply(v)), profile) {
                (Some(Value::Null), Profile::Compact) | (None, Profile::Compact) => {}
                (Some(value), _) => {
                    ordered.insert((*name).to_string(), value);
                }
                (None, Profile::ExplicitNull) => {
                    ordered.insert((*name).to_string(), Value::Null);
                }
            }
        }
        for (key, value) in undeclared {
            tracing::warn!(field = %key, "field missing from wire order, appending");
            let value = profile.apply(value);
            if profile == Profile::Compact && value.is_null() {
                continue;
            }
            ordered.insert(key, value);
        }
        Value::Object(ordered)
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
