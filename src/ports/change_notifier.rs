//! Change notification port.
//!
//! After a mutation commits, connected clients are told *that* something
//! changed and which IDs are involved. They refetch through the ordinary
//! query path; the message never carries the new state.
//!
//! # Wire format
//!
//! One text frame per message:
//!
//! ```text
//! UPDATE_TASKS task_1 task_2
//! UPDATE_TASKBOARDS todo doing
//! UPDATE_USERS
//! ```

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{BoardId, TaskId, UserId, ValidationError};

/// What kind of state a client should refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Task fields changed.
    TaskUpdated,
    /// Board fields or the board list changed.
    BoardUpdated,
    /// A board's task list changed (create, delete, reorder).
    TaskBoardUpdated,
    /// User fields or the user list changed.
    UserUpdated,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::TaskUpdated => "UPDATE_TASKS",
            ChangeKind::BoardUpdated => "UPDATE_BOARDS",
            ChangeKind::TaskBoardUpdated => "UPDATE_TASKBOARDS",
            ChangeKind::UserUpdated => "UPDATE_USERS",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPDATE_TASKS" => Ok(ChangeKind::TaskUpdated),
            "UPDATE_BOARDS" => Ok(ChangeKind::BoardUpdated),
            "UPDATE_TASKBOARDS" => Ok(ChangeKind::TaskBoardUpdated),
            "UPDATE_USERS" => Ok(ChangeKind::UserUpdated),
            other => Err(ValidationError::invalid_format(
                "event",
                format!("unknown change kind '{}'", other),
            )),
        }
    }
}

/// One change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    pub kind: ChangeKind,
    pub ids: Vec<String>,
}

impl ChangeMessage {
    pub fn new(kind: ChangeKind, ids: Vec<String>) -> Self {
        Self { kind, ids }
    }

    pub fn tasks<'a>(ids: impl IntoIterator<Item = &'a TaskId>) -> Self {
        Self::new(
            ChangeKind::TaskUpdated,
            ids.into_iter().map(|id| id.to_string()).collect(),
        )
    }

    pub fn boards<'a>(ids: impl IntoIterator<Item = &'a BoardId>) -> Self {
        Self::new(
            ChangeKind::BoardUpdated,
            ids.into_iter().map(|id| id.to_string()).collect(),
        )
    }

    pub fn task_boards<'a>(ids: impl IntoIterator<Item = &'a BoardId>) -> Self {
        Self::new(
            ChangeKind::TaskBoardUpdated,
            ids.into_iter().map(|id| id.to_string()).collect(),
        )
    }

    pub fn users<'a>(ids: impl IntoIterator<Item = &'a UserId>) -> Self {
        Self::new(
            ChangeKind::UserUpdated,
            ids.into_iter().map(|id| id.to_string()).collect(),
        )
    }

    /// The user list itself changed (a user joined or left).
    pub fn user_list() -> Self {
        Self::new(ChangeKind::UserUpdated, Vec::new())
    }
}

impl fmt::Display for ChangeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        for id in &self.ids {
            write!(f, " {}", id)?;
        }
        Ok(())
    }
}

impl FromStr for ChangeMessage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let kind = parts
            .next()
            .ok_or_else(|| ValidationError::empty_field("event"))?
            .parse()?;
        Ok(Self::new(kind, parts.map(str::to_string).collect()))
    }
}

/// Identity a client declared for itself.
///
/// Supplied as the `from` query parameter when a WebSocket connects and as
/// the `taskboard-from-id` header on mutating requests. Blank values are
/// treated as "no identity".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Returns `None` for absent or blank input.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivers change notifications to connected clients.
///
/// Delivery is best-effort: implementations never fail the caller, and a
/// client that misses a message recovers by refetching.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Deliver `change` to every live client except the one registered
    /// under `origin`. With no origin, or an origin that has no live
    /// session, every client receives it.
    async fn notify(&self, origin: Option<&ClientIdentity>, change: &ChangeMessage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_renders_kind_then_ids() {
        let todo = BoardId::new("todo").unwrap();
        let doing = BoardId::new("doing").unwrap();
        let msg = ChangeMessage::task_boards([&todo, &doing]);
        assert_eq!(msg.to_string(), "UPDATE_TASKBOARDS todo doing");
    }

    #[test]
    fn message_without_ids_has_no_trailing_space() {
        assert_eq!(ChangeMessage::user_list().to_string(), "UPDATE_USERS");
    }

    #[test]
    fn message_parses_back_from_wire_text() {
        let msg: ChangeMessage = "UPDATE_TASKS task_1 task_2".parse().unwrap();
        assert_eq!(msg.kind, ChangeKind::TaskUpdated);
        assert_eq!(msg.ids, vec!["task_1", "task_2"]);

        let bare: ChangeMessage = "UPDATE_BOARDS ".parse().unwrap();
        assert!(bare.ids.is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("DELETE_EVERYTHING x".parse::<ChangeMessage>().is_err());
        assert!("".parse::<ChangeMessage>().is_err());
    }

    #[test]
    fn blank_identity_is_absent() {
        assert_eq!(ClientIdentity::parse(None), None);
        assert_eq!(ClientIdentity::parse(Some("")), None);
        assert_eq!(ClientIdentity::parse(Some("  ")), None);
        assert_eq!(
            ClientIdentity::parse(Some("alice")).map(|i| i.to_string()),
            Some("alice".to_string())
        );
    }

    #[test]
    fn change_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn ChangeNotifier) {}
    }
}
