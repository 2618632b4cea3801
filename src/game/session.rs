use serde::{de, Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use super::rules::{apply_move, evaluate, GameError};
use super::state::{Board, GameEvent, GameResult, Mark};
use crate::ai::{AiAgent, AiDecision, Difficulty};

/// 对局模式：双人同屏或人机。反序列化接受 `FromStr` 的全部别名。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum GameMode {
    #[serde(rename = "pvp")]
    PlayerVsPlayer,
    #[serde(rename = "ai")]
    PlayerVsComputer,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::PlayerVsComputer
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pvp" | "local" | "two-player" => Ok(GameMode::PlayerVsPlayer),
            "ai" | "pvc" | "computer" => Ok(GameMode::PlayerVsComputer),
            _ => Err(()),
        }
    }
}

impl<'de> Deserialize<'de> for GameMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        GameMode::from_str(&value).map_err(|_| de::Error::unknown_variant(&value, &["pvp", "ai"]))
    }
}

/// 某个标记由谁操控。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    Human,
    Computer,
}

/// 开局前由前端选定的配置，一局之内不变。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: GameMode,
    /// 人机模式下玩家选择的标记，电脑使用另一个。
    #[serde(default)]
    pub human_mark: Mark,
    #[serde(default)]
    pub starting_mark: Mark,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl SessionConfig {
    pub fn player_vs_player() -> Self {
        Self {
            mode: GameMode::PlayerVsPlayer,
            ..Self::default()
        }
    }

    pub fn player_vs_computer(human_mark: Mark, difficulty: Difficulty) -> Self {
        Self {
            mode: GameMode::PlayerVsComputer,
            human_mark,
            difficulty,
            ..Self::default()
        }
    }

    pub fn with_starting_mark(mut self, mark: Mark) -> Self {
        self.starting_mark = mark;
        self
    }

    pub fn computer_mark(&self) -> Option<Mark> {
        match self.mode {
            GameMode::PlayerVsPlayer => None,
            GameMode::PlayerVsComputer => Some(self.human_mark.opponent()),
        }
    }

    pub fn controller_of(&self, mark: Mark) -> Controller {
        if self.computer_mark() == Some(mark) {
            Controller::Computer
        } else {
            Controller::Human
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            human_mark: Mark::X,
            starting_mark: Mark::X,
            difficulty: Difficulty::default(),
        }
    }
}

/// 由棋盘和配置推导出的对局阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SessionPhase {
    AwaitingFirstMove { mark: Mark, controller: Controller },
    AwaitingHumanMove { mark: Mark },
    AwaitingAiMove { mark: Mark },
    Terminal { result: GameResult },
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Terminal { .. })
    }
}

/// 一次落子的完整结果，供前端渲染。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub index: usize,
    pub mark: Mark,
    pub controller: Controller,
    pub board: Board,
    pub result: GameResult,
    pub phase: SessionPhase,
    pub events: Vec<GameEvent>,
}

/// 序列化给前端的会话快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub config: SessionConfig,
    pub board: Board,
    pub result: GameResult,
    pub phase: SessionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_move: Option<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 一局游戏。只保存配置和棋盘，轮次、结果和阶段都按需推导。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            board: Board::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn result(&self) -> GameResult {
        evaluate(&self.board)
    }

    pub fn computer_mark(&self) -> Option<Mark> {
        self.config.computer_mark()
    }

    pub fn controller_of(&self, mark: Mark) -> Controller {
        self.config.controller_of(mark)
    }

    /// 轮到谁落子；对局结束后为 `None`。
    pub fn to_move(&self) -> Option<Mark> {
        if self.result().is_terminal() {
            return None;
        }
        let starting = self.config.starting_mark;
        if self.board.filled() % 2 == 0 {
            Some(starting)
        } else {
            Some(starting.opponent())
        }
    }

    pub fn phase(&self) -> SessionPhase {
        let Some(mark) = self.to_move() else {
            return SessionPhase::Terminal {
                result: self.result(),
            };
        };

        let controller = self.controller_of(mark);
        if self.board.is_empty() {
            return SessionPhase::AwaitingFirstMove { mark, controller };
        }
        match controller {
            Controller::Human => SessionPhase::AwaitingHumanMove { mark },
            Controller::Computer => SessionPhase::AwaitingAiMove { mark },
        }
    }

    /// 结果提示文案，对局进行中为 `None`。
    pub fn result_message(&self) -> Option<String> {
        match self.result() {
            GameResult::InProgress => None,
            GameResult::Draw => Some("It's a Draw!".to_string()),
            GameResult::Win { mark, .. } => match self.controller_of(mark) {
                Controller::Computer => Some("Computer Wins!".to_string()),
                Controller::Human => Some(format!("{mark} Wins!")),
            },
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            config: self.config,
            board: self.board,
            result: self.result(),
            phase: self.phase(),
            to_move: self.to_move(),
            message: self.result_message(),
        }
    }

    /// 玩家落子，使用当前轮到的标记。
    pub fn play(&mut self, index: usize) -> Result<MoveResolution, GameError> {
        let mark = self.to_move().ok_or(GameError::GameFinished)?;
        if self.controller_of(mark) == Controller::Computer {
            return Err(GameError::NotHumanTurn);
        }
        self.commit(index, mark, Controller::Human)
    }

    /// 让电脑计算但不落子，用于前端的“思考”延迟。
    pub fn think(&self, agent: &mut AiAgent) -> Result<AiDecision, GameError> {
        let mark = self.computer_to_move()?;
        agent.choose_move(&self.board, mark, mark.opponent(), self.config.difficulty)
    }

    pub fn play_ai(
        &mut self,
        agent: &mut AiAgent,
    ) -> Result<(AiDecision, MoveResolution), GameError> {
        let decision = self.think(agent)?;
        let resolution = self.commit(decision.index, decision.mark, Controller::Computer)?;
        Ok((decision, resolution))
    }

    /// 应用之前由 `think` 得到的决策。
    pub fn apply_decision(&mut self, decision: &AiDecision) -> Result<MoveResolution, GameError> {
        let mark = self.computer_to_move()?;
        if decision.mark != mark {
            return Err(GameError::DecisionMismatch {
                expected: mark,
                actual: decision.mark,
            });
        }
        self.commit(decision.index, mark, Controller::Computer)
    }

    /// 再来一局，配置不变。
    pub fn reset(&mut self) {
        self.board = Board::new();
    }

    pub fn reconfigure(&mut self, config: SessionConfig) {
        self.config = config;
        self.board = Board::new();
    }

    fn computer_to_move(&self) -> Result<Mark, GameError> {
        let mark = self.to_move().ok_or(GameError::GameFinished)?;
        if self.controller_of(mark) != Controller::Computer {
            return Err(GameError::NotComputerTurn);
        }
        Ok(mark)
    }

    fn commit(
        &mut self,
        index: usize,
        mark: Mark,
        controller: Controller,
    ) -> Result<MoveResolution, GameError> {
        self.board = apply_move(&self.board, index, mark)?;

        let result = self.result();
        let mut events = vec![GameEvent::MarkPlaced { index, mark }];
        match result {
            GameResult::Win { mark, line } => events.push(GameEvent::GameWon { mark, line }),
            GameResult::Draw => events.push(GameEvent::GameDrawn),
            GameResult::InProgress => {}
        }

        Ok(MoveResolution {
            index,
            mark,
            controller,
            board: self.board,
            result,
            phase: self.phase(),
            events,
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new(SessionConfig::default())
    }
}
