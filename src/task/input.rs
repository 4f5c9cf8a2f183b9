//! Create and update requests, parsed from JSON objects.
//!
//! Parsing only checks JSON shape (which keys, which types). Value rules such
//! as non-empty titles or existing assignees belong to the lifecycle manager.
//!
//! Updates are read in two steps: [`PatchKeys`] collects the keys a request
//! names so the policy can rule on them, then [`TaskPatch`] checks types.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::error::TaskError;

/// A mutable task field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskField {
    Title,
    Description,
    DueDate,
    Priority,
    AssignedTo,
    Completed,
}

/// Set of fields named by a request.
pub type FieldSet = BTreeSet<TaskField>;

impl TaskField {
    pub const ALL: [TaskField; 6] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::DueDate,
        TaskField::Priority,
        TaskField::AssignedTo,
        TaskField::Completed,
    ];

    /// JSON key for this field.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::DueDate => "dueDate",
            Self::Priority => "priority",
            Self::AssignedTo => "assignedTo",
            Self::Completed => "completed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Every field except `completed`.
    pub fn details() -> FieldSet {
        Self::ALL
            .into_iter()
            .filter(|f| *f != TaskField::Completed)
            .collect()
    }
}

/// Fields of a create request. Absent and `null` are treated alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
}

impl TaskInput {
    /// Convenience constructor for a title-only request.
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json(body: &Value) -> Result<Self, TaskError> {
        let object = as_object(body)?;
        let mut input = Self::default();
        for (key, value) in object {
            match TaskField::from_key(key) {
                Some(TaskField::Title) => {
                    input.title = match value {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        _ => return Err(TaskError::InvalidTitle),
                    }
                }
                Some(TaskField::Description) => {
                    input.description = optional_string(key, value)?;
                }
                Some(TaskField::DueDate) => input.due_date = optional_string(key, value)?,
                Some(TaskField::Priority) => input.priority = optional_priority(value)?,
                Some(TaskField::AssignedTo) => {
                    input.assigned_to = optional_string(key, value)?;
                }
                // New tasks always start incomplete; a client-supplied flag is not honoured.
                Some(TaskField::Completed) | None => {
                    return Err(TaskError::UnknownField(key.clone()));
                }
            }
        }
        Ok(input)
    }
}

/// Keys named by an update body, before any type checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchKeys {
    pub fields: FieldSet,
    /// Keys that name no mutable field (`id`, `createdBy`, typos).
    pub unknown: Vec<String>,
}

impl PatchKeys {
    pub fn from_json(body: &Value) -> Result<Self, TaskError> {
        let mut keys = Self::default();
        for key in as_object(body)?.keys() {
            match TaskField::from_key(key) {
                Some(field) => {
                    keys.fields.insert(field);
                }
                None => keys.unknown.push(key.clone()),
            }
        }
        Ok(keys)
    }
}

/// A partial update. `None` means the field was not named by the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<String>>,
    pub priority: Option<String>,
    /// Empty string means "Unassigned".
    pub assigned_to: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only toggles completion.
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn from_json(body: &Value) -> Result<Self, TaskError> {
        let object = as_object(body)?;
        let mut patch = Self::default();
        for (key, value) in object {
            let Some(field) = TaskField::from_key(key) else {
                return Err(TaskError::UnknownField(key.clone()));
            };
            match field {
                TaskField::Title => match value {
                    Value::String(s) => patch.title = Some(s.clone()),
                    _ => return Err(TaskError::InvalidTitle),
                },
                TaskField::Description => {
                    patch.description = Some(optional_string(key, value)?);
                }
                TaskField::DueDate => patch.due_date = Some(optional_string(key, value)?),
                TaskField::Priority => match value {
                    Value::String(s) => patch.priority = Some(s.clone()),
                    other => return Err(TaskError::InvalidPriority(other.to_string())),
                },
                TaskField::AssignedTo => {
                    patch.assigned_to = Some(optional_string(key, value)?.unwrap_or_default());
                }
                TaskField::Completed => match value {
                    Value::Bool(b) => patch.completed = Some(*b),
                    _ => {
                        return Err(TaskError::InvalidField {
                            field: key.clone(),
                            expected: "a boolean",
                        })
                    }
                },
            }
        }
        Ok(patch)
    }

    /// Fields named by this patch.
    pub fn fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        if self.title.is_some() {
            fields.insert(TaskField::Title);
        }
        if self.description.is_some() {
            fields.insert(TaskField::Description);
        }
        if self.due_date.is_some() {
            fields.insert(TaskField::DueDate);
        }
        if self.priority.is_some() {
            fields.insert(TaskField::Priority);
        }
        if self.assigned_to.is_some() {
            fields.insert(TaskField::AssignedTo);
        }
        if self.completed.is_some() {
            fields.insert(TaskField::Completed);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, TaskError> {
    body.as_object().ok_or_else(|| TaskError::InvalidField {
        field: "body".to_string(),
        expected: "a JSON object",
    })
}

fn optional_string(key: &str, value: &Value) -> Result<Option<String>, TaskError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(TaskError::InvalidField {
            field: key.to_string(),
            expected: "a string or null",
        }),
    }
}

fn optional_priority(value: &Value) -> Result<Option<String>, TaskError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(TaskError::InvalidPriority(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_from_json() {
        let input = TaskInput::from_json(&json!({
            "title": "Buy milk",
            "description": null,
            "dueDate": "2024-05-01",
            "priority": "High",
            "assignedTo": "alice@x.com"
        }))
        .unwrap();
        assert_eq!(input.title.as_deref(), Some("Buy milk"));
        assert_eq!(input.description, None);
        assert_eq!(input.due_date.as_deref(), Some("2024-05-01"));
        assert_eq!(input.priority.as_deref(), Some("High"));
        assert_eq!(input.assigned_to.as_deref(), Some("alice@x.com"));
    }

    #[test]
    fn test_input_rejects_non_string_title() {
        assert_eq!(
            TaskInput::from_json(&json!({"title": 42})),
            Err(TaskError::InvalidTitle)
        );
        assert_eq!(
            TaskInput::from_json(&json!({"title": ["a"]})),
            Err(TaskError::InvalidTitle)
        );
    }

    #[test]
    fn test_input_rejects_unknown_and_completed_keys() {
        assert_eq!(
            TaskInput::from_json(&json!({"title": "x", "createdBy": "me"})),
            Err(TaskError::UnknownField("createdBy".to_string()))
        );
        assert_eq!(
            TaskInput::from_json(&json!({"title": "x", "completed": true})),
            Err(TaskError::UnknownField("completed".to_string()))
        );
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(matches!(
            TaskInput::from_json(&json!("title")),
            Err(TaskError::InvalidField { .. })
        ));
        assert!(matches!(
            TaskPatch::from_json(&json!([1, 2])),
            Err(TaskError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_patch_tracks_named_fields() {
        let patch = TaskPatch::from_json(&json!({"completed": true, "title": "x"})).unwrap();
        let fields = patch.fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&TaskField::Completed));
        assert!(fields.contains(&TaskField::Title));

        let empty = TaskPatch::from_json(&json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_patch_keys_ignore_value_types() {
        let keys = PatchKeys::from_json(&json!({
            "completed": "yes",
            "title": 5,
            "createdBy": "x"
        }))
        .unwrap();
        assert_eq!(
            keys.fields,
            [TaskField::Completed, TaskField::Title].into_iter().collect()
        );
        assert_eq!(keys.unknown, vec!["createdBy".to_string()]);

        assert!(matches!(
            PatchKeys::from_json(&json!(null)),
            Err(TaskError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_patch_null_semantics() {
        let patch = TaskPatch::from_json(&json!({
            "description": null,
            "dueDate": null,
            "assignedTo": null
        }))
        .unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.assigned_to, Some(String::new()));

        assert_eq!(
            TaskPatch::from_json(&json!({"title": null})),
            Err(TaskError::InvalidTitle)
        );
        assert!(matches!(
            TaskPatch::from_json(&json!({"priority": null})),
            Err(TaskError::InvalidPriority(_))
        ));
    }

    #[test]
    fn test_patch_rejects_wrong_types_and_immutable_keys() {
        assert!(matches!(
            TaskPatch::from_json(&json!({"completed": "yes"})),
            Err(TaskError::InvalidField { .. })
        ));
        assert_eq!(
            TaskPatch::from_json(&json!({"id": "abc"})),
            Err(TaskError::UnknownField("id".to_string()))
        );
        assert_eq!(
            TaskPatch::from_json(&json!({"createdAt": "2024-01-01"})),
            Err(TaskError::UnknownField("createdAt".to_string()))
        );
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in TaskField::ALL {
            assert_eq!(TaskField::from_key(field.key()), Some(field));
        }
        assert!(!TaskField::details().contains(&TaskField::Completed));
        assert_eq!(TaskField::details().len(), 5);
    }
}
