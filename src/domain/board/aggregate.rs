//! Board entity and the built-in system boards.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BoardId, ValidationError, Version};
use crate::domain::optimistic_lock::Versioned;

/// Maximum length for a board name.
pub const MAX_NAME_LENGTH: usize = 255;

/// A protected board that always exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemBoard {
    pub id: &'static str,
    pub name: &'static str,
    pub disp_order: i32,
}

/// Boards created at startup when missing, in display order.
pub const SYSTEM_BOARDS: [SystemBoard; 4] = [
    SystemBoard { id: "icebox", name: "Icebox", disp_order: 0 },
    SystemBoard { id: "todo", name: "Todo", disp_order: 1 },
    SystemBoard { id: "doing", name: "Doing", disp_order: 2 },
    SystemBoard { id: "done", name: "Done", disp_order: 3 },
];

impl SystemBoard {
    /// The Icebox (backlog) board, default home of new tasks.
    pub fn icebox() -> BoardId {
        BoardId::system(SYSTEM_BOARDS[0].id)
    }

    /// Builds the entity for this system board.
    pub fn to_board(&self) -> Board {
        Board {
            id: BoardId::system(self.id),
            name: self.name.to_string(),
            is_system: true,
            disp_order: self.disp_order,
            version: Version::INITIAL,
        }
    }
}

/// Board entity.
///
/// # Invariants
///
/// - `name` is 1-255 characters
/// - system boards can be renamed and reordered but never deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    name: String,
    is_system: bool,
    disp_order: i32,
    version: Version,
}

impl Board {
    /// Create a new user-defined board.
    pub fn new(id: BoardId, name: String, disp_order: i32) -> Result<Self, ValidationError> {
        validate_name(&name)?;
        Ok(Self {
            id,
            name,
            is_system: false,
            disp_order,
            version: Version::INITIAL,
        })
    }

    /// Reconstitute a board from persistence (no validation).
    pub fn reconstitute(
        id: BoardId,
        name: String,
        is_system: bool,
        disp_order: i32,
        version: Version,
    ) -> Self {
        Self {
            id,
            name,
            is_system,
            disp_order,
            version,
        }
    }

    pub fn id(&self) -> &BoardId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn disp_order(&self) -> i32 {
        self.disp_order
    }

    /// Rename the board.
    pub fn rename(&mut self, name: String) -> Result<(), ValidationError> {
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Set the board's position among boards.
    pub fn set_disp_order(&mut self, disp_order: i32) {
        self.disp_order = disp_order;
    }

    /// Fails for boards that must never be deleted.
    pub fn ensure_deletable(&self) -> Result<(), ValidationError> {
        if self.is_system {
            return Err(ValidationError::invalid_format(
                "boardId",
                format!("system board '{}' cannot be deleted", self.name),
            ));
        }
        Ok(())
    }
}

impl Versioned for Board {
    const KIND: &'static str = "Board";

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

/// Checks a board name without constructing a board.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::out_of_range(
            "name",
            1,
            MAX_NAME_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_boards_are_ordered_and_protected() {
        for (i, system) in SYSTEM_BOARDS.iter().enumerate() {
            let board = system.to_board();
            assert_eq!(board.disp_order(), i as i32);
            assert!(board.is_system());
            assert!(board.ensure_deletable().is_err());
        }
        assert_eq!(SystemBoard::icebox().as_str(), "icebox");
    }

    #[test]
    fn user_board_is_deletable() {
        let board = Board::new(BoardId::generate(), "Review".to_string(), 4).unwrap();
        assert!(!board.is_system());
        assert!(board.ensure_deletable().is_ok());
        assert_eq!(board.version(), Version::INITIAL);
    }

    #[test]
    fn rename_rejects_empty_name() {
        let mut board = SYSTEM_BOARDS[1].to_board();
        assert!(board.rename(String::new()).is_err());
        assert_eq!(board.name(), "Todo");
    }
}
