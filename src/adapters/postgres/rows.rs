//! Row types and row-to-entity mapping.

use chrono::{DateTime, Utc};

use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, TaskId, Timestamp, UserId, Version};
use crate::domain::task::Task;
use crate::domain::user::{PasswordHash, User};

pub(super) const TASK_COLUMNS: &str = "id, name, description, assignee_user_id, board_id, \
     disp_order, created_at, is_closed, estimate_size, version";

pub(super) const BOARD_COLUMNS: &str = "id, name, is_system, disp_order, version";

pub(super) const USER_COLUMNS: &str = "id, name, password_hash, avatar, version";

/// Order used for every task listing.
pub(super) const TASK_ORDER: &str = "ORDER BY disp_order, created_at, name";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TaskRow {
    id: String,
    name: String,
    description: String,
    assignee_user_id: Option<String>,
    board_id: String,
    disp_order: i32,
    created_at: DateTime<Utc>,
    is_closed: bool,
    estimate_size: i32,
    version: i32,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task::reconstitute(
            TaskId::new(row.id)?,
            row.name,
            row.description,
            row.assignee_user_id.map(UserId::new).transpose()?,
            BoardId::new(row.board_id)?,
            row.disp_order,
            Timestamp::from_datetime(row.created_at),
            row.is_closed,
            row.estimate_size,
            version_from_db(row.version),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct BoardRow {
    id: String,
    name: String,
    is_system: bool,
    disp_order: i32,
    version: i32,
}

impl TryFrom<BoardRow> for Board {
    type Error = DomainError;

    fn try_from(row: BoardRow) -> Result<Self, Self::Error> {
        Ok(Board::reconstitute(
            BoardId::new(row.id)?,
            row.name,
            row.is_system,
            row.disp_order,
            version_from_db(row.version),
        ))
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: String,
    name: String,
    password_hash: String,
    avatar: String,
    version: i32,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::reconstitute(
            UserId::new(row.id)?,
            row.name,
            PasswordHash::new(row.password_hash),
            row.avatar,
            version_from_db(row.version),
        ))
    }
}

pub(super) fn version_from_db(raw: i32) -> Version {
    Version::from_raw(raw.max(0) as u32)
}

pub(super) fn version_to_db(version: Version) -> i32 {
    version.as_u32().min(i32::MAX as u32) as i32
}

/// Converts a batch of rows, failing on the first malformed one.
pub(super) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DomainError>
where
    T: TryFrom<R, Error = DomainError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_row_maps_to_entity() {
        let row = TaskRow {
            id: "task_1".to_string(),
            name: "Write".to_string(),
            description: String::new(),
            assignee_user_id: Some("user_1".to_string()),
            board_id: "todo".to_string(),
            disp_order: 3,
            created_at: Utc::now(),
            is_closed: false,
            estimate_size: 2,
            version: 4,
        };

        let task = Task::try_from(row).unwrap();

        assert_eq!(task.id().as_str(), "task_1");
        assert_eq!(task.assignee().map(|u| u.as_str()), Some("user_1"));
        assert_eq!(task.disp_order(), 3);
    }

    #[test]
    fn blank_id_is_rejected() {
        let row = BoardRow {
            id: " ".to_string(),
            name: "x".to_string(),
            is_system: false,
            disp_order: 0,
            version: 1,
        };
        assert!(Board::try_from(row).is_err());
    }

    #[test]
    fn version_conversion_saturates() {
        assert_eq!(version_from_db(-1), Version::from_raw(0));
        assert_eq!(version_to_db(Version::from_raw(u32::MAX)), i32::MAX);
        assert_eq!(version_to_db(Version::from_raw(7)), 7);
    }
}
