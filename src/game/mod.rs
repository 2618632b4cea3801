//! 游戏核心逻辑模块（棋盘、规则、对局会话）。

pub mod rules;
pub mod session;
pub mod state;

pub use rules::{apply_move, evaluate, GameError, MoveRejection};
pub use session::{
    Controller,
    GameMode,
    GameSession,
    MoveResolution,
    SessionConfig,
    SessionPhase,
    SessionSnapshot,
};
pub use state::{Board, GameEvent, GameResult, Mark, WinLine, BOARD_CELLS, WIN_LINES};
