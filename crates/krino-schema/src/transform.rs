//! Value transforms applied by [`JsonSchemaEngine`](crate::JsonSchemaEngine)
//! before checking: default filling, string coercion and key stripping.
//!
//! Every transform only adds what is missing, converts what is still a string,
//! or removes what is undeclared, so running them on their own output changes
//! nothing.

use serde_json::{Map, Number, Value};

use crate::options::ValidationOptions;

/// Transforms a possibly absent segment value against a schema.
pub(crate) fn apply(
    schema: &Value,
    value: Option<Value>,
    options: &ValidationOptions,
) -> Option<Value> {
    let value = match value {
        Some(value) => value,
        None if options.use_defaults => default_of(schema)?,
        None => return None,
    };
    Some(transform(schema, value, options))
}

fn transform(schema: &Value, value: Value, options: &ValidationOptions) -> Value {
    // Boolean schemas carry no keywords.
    let Some(keywords) = schema.as_object() else {
        return value;
    };

    let mut value = if options.convert {
        coerce(keywords, value)
    } else {
        value
    };

    match &mut value {
        Value::Object(fields) => transform_object(keywords, fields, options),
        Value::Array(items) => {
            if let Some(item_schema) = keywords.get("items").filter(|s| !s.is_array()) {
                for item in items.iter_mut() {
                    let current = std::mem::take(item);
                    *item = transform(item_schema, current, options);
                }
            }
        }
        _ => {}
    }

    value
}

fn transform_object(
    keywords: &Map<String, Value>,
    fields: &mut Map<String, Value>,
    options: &ValidationOptions,
) {
    let Some(Value::Object(properties)) = keywords.get("properties") else {
        return;
    };

    for (name, property_schema) in properties {
        if let Some(slot) = fields.get_mut(name) {
            let current = std::mem::take(slot);
            *slot = transform(property_schema, current, options);
        } else if options.use_defaults {
            if let Some(default) = default_of(property_schema) {
                fields.insert(name.clone(), transform(property_schema, default, options));
            }
        }
    }

    if options.strip_unknown && !allows_extra_keys(keywords) {
        let unknown: Vec<String> = fields
            .keys()
            .filter(|key| !properties.contains_key(*key))
            .cloned()
            .collect();
        for key in unknown {
            fields.remove(&key);
        }
    }
}

// Explicitly open objects keep their extra keys even when stripping.
fn allows_extra_keys(keywords: &Map<String, Value>) -> bool {
    let open_additional = matches!(
        keywords.get("additionalProperties"),
        Some(Value::Bool(true) | Value::Object(_))
    );
    open_additional || keywords.contains_key("patternProperties")
}

fn default_of(schema: &Value) -> Option<Value> {
    schema.get("default").cloned()
}

fn declared_types(keywords: &Map<String, Value>) -> Vec<&str> {
    match keywords.get("type") {
        Some(Value::String(ty)) => vec![ty.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn coerce(keywords: &Map<String, Value>, value: Value) -> Value {
    let Value::String(raw) = &value else {
        return value;
    };

    let types = declared_types(keywords);
    if types.is_empty() || types.contains(&"string") {
        return value;
    }

    let trimmed = raw.trim();
    for ty in types {
        match ty {
            "integer" => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Value::from(n);
                }
            }
            "number" => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Value::from(n);
                }
                if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
                    return Value::Number(n);
                }
            }
            "boolean" => match trimmed {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            },
            _ => {}
        }
    }

    value
}
