//! Ordering engine.
//!
//! Computes display positions for drag-and-drop moves. Everything here is
//! pure: callers load the affected rows inside a transaction, ask for a plan,
//! and write back only the rows the plan names.
//!
//! Positions are `disp_order` integers, ascending = displayed order. They are
//! unique within one list and gapless by convention; every function below
//! keeps a gapless list gapless and never produces a duplicate.
//!
//! # Same-list move (p → q)
//!
//! ```text
//! p < q:  p < order <= q  shift -1      A0 B1 C2, A→2  =>  B0 C1 A2
//! q < p:  q <= order < p  shift +1      A0 B1 C2, C→0  =>  C0 A1 B2
//! ```
//!
//! # Cross-list move
//!
//! The source list closes the gap (`order > from` shifts -1) and the
//! destination opens a slot (`order >= to` shifts +1).
//!
//! # Clamping
//!
//! A same-list target past the last element moves to the end (the last
//! element's position). A cross-list target past `max + 1` appends at
//! `max + 1`, or 0 when the destination is empty.

use crate::domain::board::Board;
use crate::domain::foundation::{BoardId, DomainError, ErrorCode, TaskId, ValidationError};
use crate::domain::task::Task;

/// One entry of an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<K> {
    pub key: K,
    pub disp_order: i32,
}

impl<K> Slot<K> {
    pub fn new(key: K, disp_order: i32) -> Self {
        Self { key, disp_order }
    }
}

impl From<&Task> for Slot<TaskId> {
    fn from(task: &Task) -> Self {
        Slot::new(task.id().clone(), task.disp_order())
    }
}

impl From<&Board> for Slot<BoardId> {
    fn from(board: &Board) -> Self {
        Slot::new(board.id().clone(), board.disp_order())
    }
}

/// Result of placing one element: where it lands, and which neighbours move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repositioned<K> {
    pub disp_order: i32,
    pub shifted: Vec<Slot<K>>,
}

/// Position for appending to the end of a list.
pub fn append_position<K>(items: &[Slot<K>]) -> i32 {
    items
        .iter()
        .map(|s| s.disp_order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Moves `moving` from `from` to `to` inside one list.
///
/// `items` may or may not contain `moving` itself; it is skipped either way.
pub fn reposition<K: Clone + PartialEq>(
    items: &[Slot<K>],
    moving: &K,
    from: i32,
    to: i32,
) -> Repositioned<K> {
    let last = items
        .iter()
        .map(|s| s.disp_order)
        .fold(from, i32::max)
        .max(0);
    let to = to.clamp(0, last);

    let shifted = items
        .iter()
        .filter(|s| &s.key != moving)
        .filter_map(|s| {
            let order = s.disp_order;
            let moved = if from < to && order > from && order <= to {
                order - 1
            } else if to < from && order >= to && order < from {
                order + 1
            } else {
                return None;
            };
            Some(Slot::new(s.key.clone(), moved))
        })
        .collect();

    Repositioned {
        disp_order: to,
        shifted,
    }
}

/// Closes the hole left at `from` once `leaving` is gone from the list.
pub fn close_gap<K: Clone + PartialEq>(
    items: &[Slot<K>],
    leaving: &K,
    from: i32,
) -> Vec<Slot<K>> {
    items
        .iter()
        .filter(|s| &s.key != leaving && s.disp_order > from)
        .map(|s| Slot::new(s.key.clone(), s.disp_order - 1))
        .collect()
}

/// Opens a slot at `to` (clamped to append) for an element entering the list.
pub fn open_slot<K: Clone>(items: &[Slot<K>], to: i32) -> Repositioned<K> {
    let to = to.clamp(0, append_position(items));
    let shifted = items
        .iter()
        .filter(|s| s.disp_order >= to)
        .map(|s| Slot::new(s.key.clone(), s.disp_order + 1))
        .collect();
    Repositioned {
        disp_order: to,
        shifted,
    }
}

/// A drag-and-drop request: where the client saw the task, and where it
/// wants it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub from_board: BoardId,
    pub from_disp_order: i32,
    pub to_board: BoardId,
    pub to_disp_order: i32,
}

impl TaskMove {
    pub fn is_same_board(&self) -> bool {
        self.from_board == self.to_board
    }

    /// Rejects positions that can never be valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.from_disp_order < 0 {
            return Err(ValidationError::out_of_range(
                "fromDispOrder",
                0,
                i32::MAX as i64,
                self.from_disp_order as i64,
            ));
        }
        if self.to_disp_order < 0 {
            return Err(ValidationError::out_of_range(
                "toDispOrder",
                0,
                i32::MAX as i64,
                self.to_disp_order as i64,
            ));
        }
        Ok(())
    }

    /// Boards whose task lists change, source first, without duplicates.
    pub fn affected_boards(&self) -> Vec<BoardId> {
        if self.is_same_board() {
            vec![self.from_board.clone()]
        } else {
            vec![self.from_board.clone(), self.to_board.clone()]
        }
    }
}

/// Everything a transaction must write to carry out a [`TaskMove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    pub task_id: TaskId,
    pub board_id: BoardId,
    pub disp_order: i32,
    /// New positions for neighbours; they stay on their current board.
    pub shifted: Vec<Slot<TaskId>>,
}

/// Plans a task move.
///
/// `source` lists the tasks currently on the task's board (the task itself
/// included or not); `destination` lists the tasks on the target board and
/// is ignored for same-board moves.
///
/// # Errors
///
/// - `StaleOrder` when the task is no longer where the client saw it
pub fn plan_task_move(
    task: &Task,
    request: &TaskMove,
    source: &[Slot<TaskId>],
    destination: &[Slot<TaskId>],
) -> Result<ReorderPlan, DomainError> {
    if task.board_id() != &request.from_board || task.disp_order() != request.from_disp_order {
        return Err(DomainError::new(
            ErrorCode::StaleOrder,
            format!(
                "Task {} is at {}#{}, not {}#{}",
                task.id(),
                task.board_id(),
                task.disp_order(),
                request.from_board,
                request.from_disp_order
            ),
        )
        .with_detail("boardId", task.board_id().to_string())
        .with_detail("dispOrder", task.disp_order().to_string()));
    }

    if request.is_same_board() {
        let placed = reposition(
            source,
            task.id(),
            request.from_disp_order,
            request.to_disp_order,
        );
        return Ok(ReorderPlan {
            task_id: task.id().clone(),
            board_id: request.to_board.clone(),
            disp_order: placed.disp_order,
            shifted: placed.shifted,
        });
    }

    let mut shifted = close_gap(source, task.id(), request.from_disp_order);
    let destination: Vec<Slot<TaskId>> = destination
        .iter()
        .filter(|s| &s.key != task.id())
        .cloned()
        .collect();
    let opened = open_slot(&destination, request.to_disp_order);
    shifted.extend(opened.shifted);

    Ok(ReorderPlan {
        task_id: task.id().clone(),
        board_id: request.to_board.clone(),
        disp_order: opened.disp_order,
        shifted,
    })
}
