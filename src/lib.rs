pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    best_move, choose_move, random_move, AiAgent, AiDecision, Difficulty, MovePolicy,
    SearchOutcome,
};
pub use game::{
    apply_move, evaluate, Board, Controller, GameError, GameEvent, GameMode, GameResult,
    GameSession, Mark, MoveRejection, MoveResolution, SessionConfig, SessionPhase,
    SessionSnapshot, WinLine, BOARD_CELLS, WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // 空格序列化为 null 而不是 undefined。
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn to_js_error(error: GameError) -> JsValue {
    utils::warn(&error.to_string());
    to_js(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mark(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| JsValue::from_str(&format!("unknown mark: {value}")))
}

fn parse_difficulty(value: Option<&str>, fallback: Difficulty) -> Difficulty {
    value
        .and_then(|value| Difficulty::from_str(value).ok())
        .unwrap_or(fallback)
}

fn parse_config(config_json: Option<&str>) -> Result<SessionConfig, JsValue> {
    match config_json {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(json).map_err(serde_to_js_error)
        }
        _ => Ok(SessionConfig::default()),
    }
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    applied: MoveResolution,
}

/// 前端持有的一局游戏。所有变更方法都返回 JSON 字符串。
#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
    agent: AiAgent,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameEngine, JsValue> {
        let config = parse_config(config_json.as_deref())?;
        utils::log(&format!(
            "tic-tac-toe session: mode={:?} human={} difficulty={}",
            config.mode, config.human_mark, config.difficulty
        ));
        Ok(GameEngine {
            session: GameSession::new(config),
            agent: AiAgent::new(),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(serde_to_js_error)
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.config()).map_err(serde_to_js_error)
    }

    pub fn play(&mut self, index: usize) -> Result<String, JsValue> {
        let resolution = self.session.play(index).map_err(to_js_error)?;
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    /// 立即让电脑落子。传入 `seed` 时使用可复现的随机源。
    pub fn apply_ai_move(&mut self, seed: Option<u64>) -> Result<String, JsValue> {
        let (decision, applied) = match seed {
            Some(seed) => self.session.play_ai(&mut AiAgent::with_seed(seed)),
            None => self.session.play_ai(&mut self.agent),
        }
        .map_err(to_js_error)?;

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 延迟 `delay_ms` 后给出电脑的决策，但不落子；由 `apply_decision_json` 应用。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let session = self.session.clone();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new();
            let decision = session.think(&mut agent).map_err(to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn apply_decision_json(&mut self, decision_json: &str) -> Result<String, JsValue> {
        let decision: AiDecision =
            serde_json::from_str(decision_json).map_err(serde_to_js_error)?;
        let resolution = self
            .session
            .apply_decision(&decision)
            .map_err(to_js_error)?;
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn reconfigure(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = parse_config(Some(config_json))?;
        self.session.reconfigure(config);
        Ok(())
    }

    pub fn result_message(&self) -> Option<String> {
        self.session.result_message()
    }
}

/// 返回一个空棋盘。
#[wasm_bindgen(js_name = "createBoard")]
pub fn create_board() -> Result<JsValue, JsValue> {
    to_js(&Board::new())
}

/// 在棋盘副本上落子并返回新棋盘，原棋盘不变。
#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move_js(board: JsValue, index: usize, mark: &str) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = parse_mark(mark)?;
    match apply_move(&board, index, mark) {
        Ok(next) => to_js(&next),
        Err(error) => Err(to_js_error(error)),
    }
}

#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_js(&evaluate(&board))
}

/// 为 `ai_mark` 计算落子；`human_mark` 缺省为对手标记，难度缺省为 hard。
#[wasm_bindgen(js_name = "chooseMove")]
pub fn choose_move_js(
    board: JsValue,
    ai_mark: &str,
    human_mark: Option<String>,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let ai_mark = parse_mark(ai_mark)?;
    let human_mark = match human_mark.as_deref() {
        Some(value) => parse_mark(value)?,
        None => ai_mark.opponent(),
    };
    let difficulty = parse_difficulty(difficulty.as_deref(), Difficulty::default());

    let mut agent = AiAgent::new();
    let decision = agent
        .choose_move(&board, ai_mark, human_mark, difficulty)
        .map_err(to_js_error)?;
    to_js(&decision)
}

/// 把难度名称规范化为 `easy` / `medium` / `hard`，无法识别时返回默认难度。
#[wasm_bindgen(js_name = "parseDifficulty")]
pub fn parse_difficulty_js(name: &str) -> String {
    parse_difficulty(Some(name), Difficulty::default())
        .as_str()
        .to_string()
}
