//! Task entity.
//!
//! A task lives on exactly one board at a time. Its position within that
//! board is its `disp_order`; the ordering engine owns how positions
//! change, this type only stores them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BoardId, TaskId, Timestamp, UserId, ValidationError, Version};
use crate::domain::optimistic_lock::Versioned;

/// Maximum length for a task name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for a task description.
pub const MAX_DESCRIPTION_LENGTH: usize = 8000;

/// Editable task fields, as supplied by an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: String,
    pub description: String,
    pub assignee: Option<UserId>,
    pub is_closed: bool,
    pub estimate_size: i32,
}

impl TaskEdit {
    /// Checks field limits without touching storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_edit(self)
    }
}

/// Task entity.
///
/// # Invariants
///
/// - `name` is 1-255 characters
/// - `disp_order` is non-negative
/// - `version` only moves forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    assignee: Option<UserId>,
    board_id: BoardId,
    disp_order: i32,
    created_at: Timestamp,
    is_closed: bool,
    estimate_size: i32,
    version: Version,
}

impl Task {
    /// Create a new task at the given position.
    ///
    /// # Errors
    ///
    /// - `EmptyField` / `OutOfRange` when name or description is invalid
    pub fn new(
        id: TaskId,
        edit: TaskEdit,
        board_id: BoardId,
        disp_order: i32,
    ) -> Result<Self, ValidationError> {
        validate_edit(&edit)?;
        Ok(Self {
            id,
            name: edit.name,
            description: edit.description,
            assignee: edit.assignee,
            board_id,
            disp_order,
            created_at: Timestamp::now(),
            is_closed: edit.is_closed,
            estimate_size: edit.estimate_size,
            version: Version::INITIAL,
        })
    }

    /// Reconstitute a task from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TaskId,
        name: String,
        description: String,
        assignee: Option<UserId>,
        board_id: BoardId,
        disp_order: i32,
        created_at: Timestamp,
        is_closed: bool,
        estimate_size: i32,
        version: Version,
    ) -> Self {
        Self {
            id,
            name,
            description,
            assignee,
            board_id,
            disp_order,
            created_at,
            is_closed,
            estimate_size,
            version,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    pub fn disp_order(&self) -> i32 {
        self.disp_order
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn estimate_size(&self) -> i32 {
        self.estimate_size
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the editable fields. Position and board are untouched.
    pub fn apply_edit(&mut self, edit: TaskEdit) -> Result<(), ValidationError> {
        validate_edit(&edit)?;
        self.name = edit.name;
        self.description = edit.description;
        self.assignee = edit.assignee;
        self.is_closed = edit.is_closed;
        self.estimate_size = edit.estimate_size;
        Ok(())
    }

    /// Move the task to a board position.
    pub fn place(&mut self, board_id: BoardId, disp_order: i32) {
        self.board_id = board_id;
        self.disp_order = disp_order;
    }

    /// Drop the assignee (used when the assigned user is deleted).
    pub fn unassign(&mut self) {
        self.assignee = None;
    }
}

impl Versioned for Task {
    const KIND: &'static str = "Task";

    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

fn validate_edit(edit: &TaskEdit) -> Result<(), ValidationError> {
    if edit.name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    if edit.name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::out_of_range(
            "name",
            1,
            MAX_NAME_LENGTH as i64,
            edit.name.chars().count() as i64,
        ));
    }
    if edit.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::out_of_range(
            "description",
            0,
            MAX_DESCRIPTION_LENGTH as i64,
            edit.description.chars().count() as i64,
        ));
    }
    Ok(())
}
