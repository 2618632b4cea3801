use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rules::{GameError, MoveRejection};

/// 棋盘格子数量（3x3）。
pub const BOARD_CELLS: usize = 9;

/// 一条获胜连线，按行优先的格子下标。
pub type WinLine = [usize; 3];

/// 8 条获胜连线：3 行、3 列、2 条对角线。表的顺序决定 `evaluate` 报告哪一条。
pub const WIN_LINES: [WinLine; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家落子使用的标记。反序列化时大小写均可。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl Default for Mark {
    fn default() -> Self {
        Mark::X
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Mark::X),
            "o" | "O" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

impl<'de> Deserialize<'de> for Mark {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Mark::from_str(&value).map_err(|_| de::Error::unknown_variant(&value, &["X", "O"]))
    }
}

/// 3x3 棋盘。`None` 表示空格，下标 0–8 行优先。
///
/// 序列化为长度为 9 的数组（`null` / `"X"` / `"O"`），长度不符的数组反序列化失败。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self { cells }
    }

    /// 越界或空格都返回 `None`。
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_empty_cell(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(None))
    }

    /// 所有空格下标，升序。
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(mark))
            .count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// 原地落子。失败时棋盘保持不变。
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), GameError> {
        let cell = self.cells.get_mut(index).ok_or(GameError::InvalidMove {
            index,
            reason: MoveRejection::OutOfRange,
        })?;
        if let Some(by) = *cell {
            return Err(GameError::InvalidMove {
                index,
                reason: MoveRejection::Occupied { by },
            });
        }
        *cell = Some(mark);
        Ok(())
    }

    /// 线上三格是否都属于同一个标记。
    pub fn line_owner(&self, line: &WinLine) -> Option<Mark> {
        let [a, b, c] = *line;
        let mark = self.get(a)?;
        (self.get(b) == Some(mark) && self.get(c) == Some(mark)).then_some(mark)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            for cell in row {
                match cell {
                    Some(mark) => write!(f, "{mark}")?,
                    None => f.write_str(".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 由棋盘推导出的对局结果，从不单独存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameResult {
    InProgress,
    Win { mark: Mark, line: WinLine },
    Draw,
}

impl GameResult {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }
}

/// 每次落子后前端需要响应的事件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MarkPlaced { index: usize, mark: Mark },
    GameWon { mark: Mark, line: WinLine },
    GameDrawn,
}
