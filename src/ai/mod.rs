//! AI 算法模块（随机落子与穷举 minimax）。

pub mod minimax;

pub use minimax::{
    best_move, choose_move, random_move, AiAgent, AiDecision, Difficulty, MovePolicy,
    SearchOutcome,
};
