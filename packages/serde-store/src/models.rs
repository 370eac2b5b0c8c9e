//! The record types stored by the to-do application: profiles, lists and
//! tasks.
//!
//! Each is stored as a map at `<collection>.<uuid>`. Timestamps are
//! milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

use flatstore_core_store::Error;

use crate::model::{Field, FieldKind, Model};
use crate::validators::{LengthRange, UTC_OFFSET};

const CONTENT_LENGTH: LengthRange = LengthRange::new(1, 1000);
const RULE_LENGTH: LengthRange = LengthRange::new(7, usize::MAX);

const STRINGS: FieldKind = FieldKind::Array(&FieldKind::String);
const OPTIONAL_INTEGER: FieldKind = FieldKind::Nullable(&FieldKind::Integer);
const OPTIONAL_NUMBER: FieldKind = FieldKind::Nullable(&FieldKind::Number);

/// A user's profile. Created on first use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip)]
    pub uuid: String,
    pub created_at: f64,
    pub created_by: String,
}

impl Profile {
    /// A fresh profile; a user creates their own.
    pub fn new(uuid: impl Into<String>, created_at: f64) -> Self {
        let uuid = uuid.into();
        Profile {
            created_by: uuid.clone(),
            uuid,
            created_at,
        }
    }
}

impl Model for Profile {
    const NAME: &'static str = "Profile";
    const COLLECTION: &'static str = "profiles";
    const FIELDS: &'static [Field] = &[
        Field::new("created_at", FieldKind::Number),
        Field::new("created_by", FieldKind::String),
    ];

    fn identity(&self) -> &str {
        &self.uuid
    }

    fn set_identity(&mut self, identity: String) {
        self.uuid = identity;
    }
}

/// A to-do list, bound to one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    #[serde(skip)]
    pub uuid: String,
    pub created_at: f64,
    pub created_by: String,
    pub guild_id: Option<i64>,
    pub sticky_message_id: Option<i64>,
    /// Hours east of UTC.
    pub utc_offset: f64,
    pub notes: Vec<String>,
}

impl TodoList {
    pub fn new(
        uuid: impl Into<String>,
        created_at: f64,
        created_by: impl Into<String>,
        guild_id: Option<i64>,
        utc_offset: f64,
    ) -> Self {
        TodoList {
            uuid: uuid.into(),
            created_at,
            created_by: created_by.into(),
            guild_id,
            sticky_message_id: None,
            utc_offset,
            notes: Vec::new(),
        }
    }
}

impl Model for TodoList {
    const NAME: &'static str = "TodoList";
    const COLLECTION: &'static str = "lists";
    const FIELDS: &'static [Field] = &[
        Field::new("created_at", FieldKind::Number),
        Field::new("created_by", FieldKind::String),
        Field::new("guild_id", OPTIONAL_INTEGER),
        Field::new("sticky_message_id", OPTIONAL_INTEGER),
        Field::new("utc_offset", FieldKind::Number),
        Field::new("notes", STRINGS),
    ];

    fn identity(&self) -> &str {
        &self.uuid
    }

    fn set_identity(&mut self, identity: String) {
        self.uuid = identity;
    }

    fn validate(&self) -> Result<(), Error> {
        UTC_OFFSET.check("TodoList.utc_offset", self.utc_offset)
    }
}

/// When a task is due: once, or on a recurrence rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Due {
    /// Timestamp in milliseconds.
    At(f64),
    /// `DTSTART:...\nRRULE:...` recurrence rule text.
    Rule(String),
}

/// A task on a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip)]
    pub uuid: String,
    pub created_at: f64,
    pub created_by: String,
    pub list_uuid: String,
    pub content: String,
    pub tags: Vec<String>,
    pub due: Option<Due>,
    pub has_reminder: bool,
    pub is_auto_done: bool,
    pub last_done: Option<f64>,
    pub next_reminder: Option<f64>,
}

impl Task {
    pub fn new(
        uuid: impl Into<String>,
        created_at: f64,
        created_by: impl Into<String>,
        list_uuid: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Task {
            uuid: uuid.into(),
            created_at,
            created_by: created_by.into(),
            list_uuid: list_uuid.into(),
            content: content.into(),
            tags: Vec::new(),
            due: None,
            has_reminder: true,
            is_auto_done: false,
            last_done: None,
            next_reminder: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.due, Some(Due::Rule(_)))
    }
}

impl Model for Task {
    const NAME: &'static str = "Task";
    const COLLECTION: &'static str = "tasks";
    const FIELDS: &'static [Field] = &[
        Field::new("created_at", FieldKind::Number),
        Field::new("created_by", FieldKind::String),
        Field::new("list_uuid", FieldKind::String),
        Field::new("content", FieldKind::String),
        Field::new("tags", STRINGS),
        Field::new(
            "due",
            FieldKind::Nullable(&FieldKind::OneOf(&[FieldKind::String, FieldKind::Number])),
        ),
        Field::new("has_reminder", FieldKind::Bool),
        Field::new("is_auto_done", FieldKind::Bool),
        Field::new("last_done", OPTIONAL_NUMBER),
        Field::new("next_reminder", OPTIONAL_NUMBER),
    ];

    fn identity(&self) -> &str {
        &self.uuid
    }

    fn set_identity(&mut self, identity: String) {
        self.uuid = identity;
    }

    fn validate(&self) -> Result<(), Error> {
        CONTENT_LENGTH.check("Task.content", &self.content)?;
        if let Some(Due::Rule(rule)) = &self.due {
            RULE_LENGTH.check("Task.due", rule)?;
        }
        Ok(())
    }
}
