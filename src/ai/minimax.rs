use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::game::{evaluate, Board, GameError, GameResult, Mark};

/// 一局胜负的基础分，实际得分按层数折算：越早赢分越高，越晚输扣分越少。
const WIN_SCORE: i32 = 10;

/// 中等难度下走随机步的概率。
const MEDIUM_RANDOM_PROBABILITY: f64 = 0.5;

/// 难度。反序列化与 `FromStr` 接受相同的别名，大小写不敏感。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Hard
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "random" => Ok(Difficulty::Easy),
            "medium" | "normal" | "mixed" => Ok(Difficulty::Medium),
            "hard" | "perfect" | "impossible" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Difficulty::from_str(&value)
            .map_err(|_| de::Error::unknown_variant(&value, &["easy", "medium", "hard"]))
    }
}

/// 本次决策实际采用的策略。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MovePolicy {
    Random,
    Minimax,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub index: usize,
    pub mark: Mark,
    pub difficulty: Difficulty,
    pub policy: MovePolicy,
    /// 所选落子的 minimax 分值，随机落子时为空。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub nodes: u64,
}

/// 完整 minimax 搜索的结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchOutcome {
    pub index: usize,
    pub score: i32,
    pub nodes: u64,
}

struct SearchStats {
    nodes: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self { nodes: 0 }
    }
}

/// 持有随机源的 AI。搜索本身无状态，随机源只用于简单和中等难度。
pub struct AiAgent {
    rng: SmallRng,
}

impl AiAgent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn choose_move(
        &mut self,
        board: &Board,
        ai_mark: Mark,
        human_mark: Mark,
        difficulty: Difficulty,
    ) -> Result<AiDecision, GameError> {
        choose_move(board, ai_mark, human_mark, difficulty, &mut self.rng)
    }
}

impl Default for AiAgent {
    fn default() -> Self {
        AiAgent::new()
    }
}

/// 按难度为 `ai_mark` 选择落子。棋盘只读，调用方的快照不会被修改。
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    ai_mark: Mark,
    human_mark: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<AiDecision, GameError> {
    if board.is_full() {
        return Err(GameError::NoMoveAvailable);
    }
    if ai_mark == human_mark {
        return Err(GameError::SameMarks { mark: ai_mark });
    }

    let policy = match difficulty {
        Difficulty::Easy => MovePolicy::Random,
        Difficulty::Medium => {
            if rng.gen_bool(MEDIUM_RANDOM_PROBABILITY) {
                MovePolicy::Random
            } else {
                MovePolicy::Minimax
            }
        }
        Difficulty::Hard => MovePolicy::Minimax,
    };

    match policy {
        MovePolicy::Random => {
            let index = random_move(board, rng).ok_or(GameError::NoMoveAvailable)?;
            Ok(AiDecision {
                index,
                mark: ai_mark,
                difficulty,
                policy,
                score: None,
                nodes: 0,
            })
        }
        MovePolicy::Minimax => {
            let outcome =
                best_move(board, ai_mark, human_mark).ok_or(GameError::NoMoveAvailable)?;
            Ok(AiDecision {
                index: outcome.index,
                mark: ai_mark,
                difficulty,
                policy,
                score: Some(outcome.score),
                nodes: outcome.nodes,
            })
        }
    }
}

/// 在所有空格中均匀随机选择一个。
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board.empty_cells().choose(rng).copied()
}

/// 穷举 minimax。分数相同的候选按下标升序取第一个。
pub fn best_move(board: &Board, ai_mark: Mark, human_mark: Mark) -> Option<SearchOutcome> {
    let mut stats = SearchStats::new();
    let mut best: Option<(usize, i32)> = None;

    for index in board.empty_cells() {
        let mut child = *board;
        if child.place(index, ai_mark).is_err() {
            continue;
        }
        let score = minimax_rec(&child, human_mark, ai_mark, human_mark, 1, &mut stats);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    best.map(|(index, score)| SearchOutcome {
        index,
        score,
        nodes: stats.nodes,
    })
}

fn minimax_rec(
    board: &Board,
    to_move: Mark,
    ai_mark: Mark,
    human_mark: Mark,
    depth: i32,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    match evaluate(board) {
        GameResult::Win { mark, .. } if mark == ai_mark => return WIN_SCORE - depth,
        GameResult::Win { .. } => return depth - WIN_SCORE,
        GameResult::Draw => return 0,
        GameResult::InProgress => {}
    }

    let maximizing = to_move == ai_mark;
    let next = if maximizing { human_mark } else { ai_mark };
    let mut value = if maximizing { i32::MIN } else { i32::MAX };

    // 每个分支在自己的棋盘副本上落子，无需撤销。
    for index in board.empty_cells() {
        let mut child = *board;
        if child.place(index, to_move).is_err() {
            continue;
        }
        let score = minimax_rec(&child, next, ai_mark, human_mark, depth + 1, stats);
        value = if maximizing {
            value.max(score)
        } else {
            value.min(score)
        };
    }

    value
}
