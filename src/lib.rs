use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod game;
pub mod movegen;
pub mod types;

pub use board::Board;
pub use config::RulesConfig;
pub use game::GameController;
pub use movegen::valid_moves;
pub use types::{
    CaptureSet, Color, MoveMap, Phase, Piece, Position, Rank, RulesError, SelectOutcome, Snapshot,
};

/// The browser session. Every exported call locks it for its whole duration.
static SESSION: Lazy<Mutex<GameController>> = Lazy::new(|| Mutex::new(GameController::default()));

/// Routes panics to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Starts a new game. `config` may be `undefined` or a partial
/// `{ boardSize, rowsPerSide, firstTurn }` object.
#[wasm_bindgen]
pub fn new_game(config: JsValue) -> Result<JsValue, JsError> {
    let config: RulesConfig = if config.is_undefined() || config.is_null() {
        RulesConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
    };
    let game = GameController::new(config).map_err(|e| JsError::new(&e.to_string()))?;

    let mut session = lock_session()?;
    *session = game;
    to_js(&session.snapshot())
}

/// Forwards a cell click. Returns `{ kind: "moved" | "selected" | "deselected" | "ignored", ... }`.
#[wasm_bindgen]
pub fn select_cell(row: u8, col: u8) -> Result<JsValue, JsError> {
    let outcome = lock_session()?
        .select(row, col)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&outcome)
}

#[wasm_bindgen]
pub fn reset_game() -> Result<JsValue, JsError> {
    let mut session = lock_session()?;
    session.reset();
    to_js(&session.snapshot())
}

#[wasm_bindgen]
pub fn get_snapshot() -> Result<JsValue, JsError> {
    to_js(&lock_session()?.snapshot())
}

fn lock_session() -> Result<MutexGuard<'static, GameController>, JsError> {
    SESSION
        .lock()
        .map_err(|_| JsError::new("game session lock poisoned"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}
