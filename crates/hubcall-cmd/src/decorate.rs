//! Result decoration.
//!
//! Adds convenience fields to returned objects so that output can be piped
//! straight into a follow-up command (`repository_url`, `label_name`, ...).
//! Nothing is added when `disable_pipeline_support` is set, and existing
//! fields are never overwritten.

use hubcall_core::Settings;
use serde_json::Value;

/// Add `properties` to every object in `value`.
pub fn add_properties(value: &mut Value, properties: &[(&str, Value)], settings: &Settings) {
    if settings.disable_pipeline_support {
        return;
    }
    for_each_object(value, &mut |map| {
        for (key, prop) in properties {
            map.entry(*key).or_insert_with(|| prop.clone());
        }
    });
}

/// Copy `field` into `alias` on every object in `value` that has it.
pub fn alias_field(value: &mut Value, alias: &str, field: &str, settings: &Settings) {
    if settings.disable_pipeline_support {
        return;
    }
    for_each_object(value, &mut |map| {
        if let Some(found) = map.get(field).cloned() {
            map.entry(alias).or_insert(found);
        }
    });
}

fn for_each_object(value: &mut Value, f: &mut dyn FnMut(&mut serde_json::Map<String, Value>)) {
    match value {
        Value::Object(map) => f(map),
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    f(map);
                }
            }
        }
        _ => {}
    }
}
