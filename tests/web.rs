//! 浏览器端绑定测试，使用 `wasm-pack test --headless --firefox` 运行。

#![cfg(target_arch = "wasm32")]

use tictactoe_wasm::{
    apply_move_js, choose_move_js, create_board, evaluate_board, parse_difficulty_js, Board,
    GameEngine, GameResult, Mark, SessionSnapshot,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn board_round_trips_through_js() {
    let board = create_board().expect("empty board");
    let board = apply_move_js(board, 4, "O").expect("center is free");
    let parsed: Board = serde_wasm_bindgen::from_value(board.clone()).expect("board shape");
    assert_eq!(parsed.get(4), Some(Mark::O));

    assert!(apply_move_js(board, 4, "X").is_err(), "occupied cell must fail");
}

#[wasm_bindgen_test]
fn evaluate_reports_winning_line() {
    let mut board = Board::new();
    for (index, mark) in [(0, Mark::X), (1, Mark::X), (2, Mark::X), (3, Mark::O), (4, Mark::O)] {
        board.place(index, mark).expect("free cell");
    }
    let js = serde_wasm_bindgen::to_value(&board).expect("serialize");
    let result: GameResult =
        serde_wasm_bindgen::from_value(evaluate_board(js).expect("evaluate")).expect("result");
    assert_eq!(
        result,
        GameResult::Win {
            mark: Mark::X,
            line: [0, 1, 2]
        }
    );
}

#[wasm_bindgen_test]
fn choose_move_rejects_full_board() {
    let board = Board::from_cells([
        Some(Mark::X),
        Some(Mark::O),
        Some(Mark::X),
        Some(Mark::X),
        Some(Mark::O),
        Some(Mark::O),
        Some(Mark::O),
        Some(Mark::X),
        Some(Mark::X),
    ]);
    let js = serde_wasm_bindgen::to_value(&board).expect("serialize");
    let error = choose_move_js(js, "O", None, Some("hard".into())).expect_err("no moves");
    assert_ne!(error, JsValue::UNDEFINED);
}

#[wasm_bindgen_test]
fn engine_plays_against_computer() {
    let mut engine =
        GameEngine::new(Some(r#"{"mode":"ai","human_mark":"X"}"#.into())).expect("engine");
    engine.play(4).expect("human move");
    engine.apply_ai_move(Some(1)).expect("computer move");

    let snapshot: SessionSnapshot =
        serde_json::from_str(&engine.state_json().expect("state")).expect("snapshot");
    assert_eq!(snapshot.board.filled(), 2);
    assert_eq!(snapshot.to_move, Some(Mark::X));
    assert!(engine.apply_ai_move(None).is_err(), "human is to move");
}

#[wasm_bindgen_test]
async fn thought_move_is_applied_after_the_promise_resolves() {
    let mut engine =
        GameEngine::new(Some(r#"{"human_mark":"x","difficulty":"Perfect"}"#.into()))
            .expect("aliases are accepted");
    engine.play(0).expect("human opens in a corner");

    let value = JsFuture::from(engine.think_ai(Some(0)))
        .await
        .expect("computer is to move");
    let decision_json = value.as_string().expect("decision is a JSON string");

    let before: SessionSnapshot =
        serde_json::from_str(&engine.state_json().expect("state")).expect("snapshot");
    assert_eq!(before.board.filled(), 1, "thinking must not move");

    engine
        .apply_decision_json(&decision_json)
        .expect("decision matches the session");
    let after: SessionSnapshot =
        serde_json::from_str(&engine.state_json().expect("state")).expect("snapshot");
    assert_eq!(after.board.get(4), Some(Mark::O), "center is the only drawing reply");
    assert!(
        engine.apply_decision_json(&decision_json).is_err(),
        "a decision cannot be applied twice"
    );
}

#[wasm_bindgen_test]
fn reset_and_reconfigure_start_a_fresh_board() {
    let mut engine = GameEngine::new(None).expect("default engine");
    engine.play(4).expect("human move");

    engine.reset();
    let snapshot: SessionSnapshot =
        serde_json::from_str(&engine.state_json().expect("state")).expect("snapshot");
    assert!(snapshot.board.is_empty());
    assert_eq!(snapshot.to_move, Some(Mark::X));

    engine
        .reconfigure(r#"{"mode":"pvp","difficulty":"Normal"}"#)
        .expect("aliases are accepted");
    engine.play(0).expect("X moves");
    engine.play(4).expect("O is also human in pvp");
    assert!(engine.apply_ai_move(None).is_err(), "no computer in pvp");
    assert!(engine.reconfigure(r#"{"mode":"online"}"#).is_err());
}

#[wasm_bindgen_test]
fn difficulty_names_normalize() {
    assert_eq!(parse_difficulty_js("Normal"), "medium");
    assert_eq!(parse_difficulty_js("nonsense"), "hard");
}
