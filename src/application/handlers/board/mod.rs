//! Board command and query handlers.

mod create_board;
mod delete_board;
mod ensure_system_boards;
mod queries;
mod update_board;

pub use create_board::{CreateBoardCommand, CreateBoardHandler};
pub use delete_board::{DeleteBoardCommand, DeleteBoardHandler};
pub use ensure_system_boards::{ensure_system_boards, EnsureSystemBoards};
pub use queries::{GetBoardHandler, ListBoardsHandler};
pub use update_board::{UpdateBoardCommand, UpdateBoardHandler};
