use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Board, GameResult, Mark, WIN_LINES};

/// 落子被拒绝的原因。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MoveRejection {
    OutOfRange,
    Occupied { by: Mark },
}

/// 调用方违反对局约定时返回的错误。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum GameError {
    #[error("invalid move at cell {index}: {reason:?}")]
    InvalidMove { index: usize, reason: MoveRejection },
    #[error("no empty cell left for the computer to play")]
    NoMoveAvailable,
    #[error("computer and human cannot both play {mark}")]
    SameMarks { mark: Mark },
    #[error("game already finished")]
    GameFinished,
    #[error("it is the computer's turn")]
    NotHumanTurn,
    #[error("it is a human player's turn")]
    NotComputerTurn,
    #[error("decision was computed for {actual}, but {expected} is to move")]
    DecisionMismatch { expected: Mark, actual: Mark },
}

/// 返回落子后的新棋盘，原棋盘不变。
pub fn apply_move(board: &Board, index: usize, mark: Mark) -> Result<Board, GameError> {
    let mut next = *board;
    next.place(index, mark)?;
    Ok(next)
}

/// 按 `WIN_LINES` 顺序扫描，第一条完整连线即为胜者；否则满盘为平局。
pub fn evaluate(board: &Board) -> GameResult {
    for line in WIN_LINES.iter() {
        if let Some(mark) = board.line_owner(line) {
            return GameResult::Win { mark, line: *line };
        }
    }

    if board.is_full() {
        GameResult::Draw
    } else {
        GameResult::InProgress
    }
}
