//! Template lookup and template/instance merging.
//!
//! Templates are immutable blueprints for entity types; instances are the
//! mutable runtime entities that reference them. Clients without a template
//! cache need fully denormalized entities in delta events, which is what
//! [`merge_template_instance`] produces.

use serde_json::{Map, Value};

use crate::storage::{keys, DocumentStore};

/// Template lookup capability consumed from a collaborator.
///
/// Returns the template's properties, or `None` when the template is
/// unknown — lookups are best-effort and never fail the surrounding
/// operation.
pub trait TemplateSource: Send + Sync {
    fn load_template(&self, experience: &str, kind: &str, id: &str) -> Option<Value>;
}

/// A template source that knows no templates.
pub struct NullTemplateSource;

impl TemplateSource for NullTemplateSource {
    fn load_template(&self, _experience: &str, _kind: &str, _id: &str) -> Option<Value> {
        None
    }
}

/// Template source backed by a [`DocumentStore`], keyed
/// `template:{experience}:{kind}:{id}`.
pub struct StoreTemplateSource<S> {
    storage: S,
}

impl<S: DocumentStore> StoreTemplateSource<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: DocumentStore> TemplateSource for StoreTemplateSource<S> {
    fn load_template(&self, experience: &str, kind: &str, id: &str) -> Option<Value> {
        match self.storage.load(&keys::template(experience, kind, id)) {
            Ok(template) => template,
            Err(err) => {
                tracing::warn!(experience, kind, id, error = %err, "template lookup failed");
                None
            }
        }
    }
}

/// Shallow-merge immutable template properties with mutable instance fields.
///
/// Instance fields override template fields on key collision, except that
/// `template_id` and `instance_id` are both preserved from whichever side
/// carries them.
pub fn merge_template_instance(template: &Value, instance: &Value) -> Value {
    let mut merged = match template {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if let Value::Object(fields) = instance {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }
    for id_field in ["template_id", "instance_id"] {
        if !merged.contains_key(id_field) {
            if let Some(id) = template.get(id_field).or_else(|| instance.get(id_field)) {
                merged.insert(id_field.to_string(), id.clone());
            }
        }
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use serde_json::json;

    #[test]
    fn instance_fields_override_template_fields() {
        let template = json!({"template_id": "door", "material": "wood", "open": false});
        let instance = json!({"instance_id": "door-1", "open": true});
        let merged = merge_template_instance(&template, &instance);
        assert_eq!(
            merged,
            json!({
                "template_id": "door",
                "instance_id": "door-1",
                "material": "wood",
                "open": true
            })
        );
    }

    #[test]
    fn both_ids_survive_the_merge() {
        let merged = merge_template_instance(
            &json!({"template_id": "lamp"}),
            &json!({"instance_id": "lamp-7"}),
        );
        assert_eq!(merged["template_id"], json!("lamp"));
        assert_eq!(merged["instance_id"], json!("lamp-7"));
    }

    #[test]
    fn non_object_template_yields_instance_fields() {
        let merged = merge_template_instance(&Value::Null, &json!({"instance_id": "x", "hp": 3}));
        assert_eq!(merged, json!({"instance_id": "x", "hp": 3}));
    }

    #[test]
    fn store_source_loads_by_key() {
        let store = InMemoryDocumentStore::new();
        store
            .save("template:demo:item:torch", &json!({"burns": true}))
            .unwrap();
        let source = StoreTemplateSource::new(store);
        assert_eq!(
            source.load_template("demo", "item", "torch"),
            Some(json!({"burns": true}))
        );
        assert_eq!(source.load_template("demo", "item", "rope"), None);
    }
}
