//! Versioned state-delta events for real-time client sync.
//!
//! Every committed update can be turned into a [`WorldUpdateEvent`]: a list
//! of add/remove/update changes bracketed by the version the delta applies
//! on top of (`base_version`) and the version after applying it
//! (`snapshot_version`). Clients that see a gap between their version and
//! `base_version` know to fetch a full refresh instead.

mod delta;
mod publisher;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use delta::DeltaPublisher;
#[cfg(feature = "emitter")]
pub use publisher::EmitterPublisher;
pub use publisher::{BufferPublisher, EventPublisher, LogPublisher, PublishError};

use crate::merge::{UpdateOp, UpdateSet};
use crate::template::{merge_template_instance, TemplateSource};

/// Version of the event wire format.
pub const WIRE_VERSION: &str = "0.4";

/// The kind of change a delta entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Add,
    Remove,
    Update,
}

/// One entry in a delta's change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldChange {
    pub operation: ChangeOp,
    pub area_id: String,
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// For add/update: the template-merged, fully denormalized entity, so a
    /// client with no template cache can render it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A versioned list of changes describing one state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldUpdateEvent {
    pub experience: String,
    pub user_id: String,
    pub base_version: u64,
    pub snapshot_version: u64,
    pub changes: Vec<WorldChange>,
    pub timestamp_ms: i64,
    pub metadata: Value,
}

impl WorldUpdateEvent {
    pub fn new(
        experience: impl Into<String>,
        user_id: impl Into<String>,
        base_version: u64,
        snapshot_version: u64,
        changes: Vec<WorldChange>,
    ) -> Self {
        Self {
            experience: experience.into(),
            user_id: user_id.into(),
            base_version,
            snapshot_version,
            changes,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            metadata: json!({ "schema": WIRE_VERSION }),
        }
    }

    /// Topic this event is published to, namespaced by user id.
    pub fn topic(&self) -> String {
        format!("users.{}.world-updates", self.user_id)
    }
}

/// Derive delta changes from an applied update set.
///
/// The walk treats the first path segment as the area id. Appends become
/// `add`, removals become `remove`, and replaced leaves become `update`;
/// the affected item's own `id` field wins over the leaf key as the
/// instance id. Items carrying a `template_id` are denormalized through the
/// template source (the item's `type` field selects the template kind).
pub fn changes_from_updates(
    experience: &str,
    updates: &UpdateSet,
    templates: &dyn TemplateSource,
) -> Vec<WorldChange> {
    let mut changes = Vec::new();
    walk(experience, updates, &mut Vec::new(), templates, &mut changes);
    changes
}

fn walk(
    experience: &str,
    updates: &UpdateSet,
    prefix: &mut Vec<String>,
    templates: &dyn TemplateSource,
    out: &mut Vec<WorldChange>,
) {
    for (key, op) in updates.iter() {
        prefix.push(key.to_string());
        match op {
            UpdateOp::MergeObject(inner) => {
                walk(experience, inner, prefix, templates, out);
            }
            UpdateOp::Append(item) => {
                out.push(change(experience, ChangeOp::Add, prefix, item, templates));
            }
            UpdateOp::Remove(target) => {
                let mut entry = change(experience, ChangeOp::Remove, prefix, target, templates);
                entry.item = None;
                out.push(entry);
            }
            UpdateOp::Replace(value) => {
                out.push(change(experience, ChangeOp::Update, prefix, value, templates));
            }
        }
        prefix.pop();
    }
}

fn change(
    experience: &str,
    operation: ChangeOp,
    path: &[String],
    item: &Value,
    templates: &dyn TemplateSource,
) -> WorldChange {
    let area_id = path.first().cloned().unwrap_or_default();
    let leaf = path.last().cloned().unwrap_or_default();
    let instance_id = item
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(leaf);
    let template_id = item
        .get("template_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut denormalized = match &template_id {
        Some(id) => {
            let kind = item.get("type").and_then(Value::as_str).unwrap_or("entity");
            match templates.load_template(experience, kind, id) {
                Some(template) => merge_template_instance(&template, item),
                None => item.clone(),
            }
        }
        None => item.clone(),
    };
    if let Value::Object(fields) = &mut denormalized {
        fields
            .entry("instance_id")
            .or_insert_with(|| Value::String(instance_id.clone()));
    }

    WorldChange {
        operation,
        area_id,
        instance_id,
        template_id,
        item: Some(denormalized),
        path: Some(path.join(".")),
    }
}
