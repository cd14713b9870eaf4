use serde::Deserialize;

use crate::types::{Color, RulesError};

const MIN_BOARD_SIZE: u8 = 4;
const MAX_BOARD_SIZE: u8 = 16;

/// Board geometry and the side that opens the game.
///
/// Deserializes from partial JS objects; omitted fields take the defaults
/// of the standard 8x8 game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulesConfig {
    pub board_size: u8,
    /// Rows of men each side starts with.
    pub rows_per_side: u8,
    pub first_turn: Color,
}

impl RulesConfig {
    pub const fn standard() -> Self {
        Self {
            board_size: 8,
            rows_per_side: 3,
            first_turn: Color::Blue,
        }
    }

    pub fn with_first_turn(mut self, color: Color) -> Self {
        self.first_turn = color;
        self
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(RulesError::InvalidConfig(format!(
                "board size must be in {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}, got {}",
                self.board_size
            )));
        }
        if self.board_size % 2 != 0 {
            return Err(RulesError::InvalidConfig(format!(
                "board size must be even, got {}",
                self.board_size
            )));
        }
        if self.rows_per_side == 0 || self.rows_per_side >= self.board_size / 2 {
            return Err(RulesError::InvalidConfig(format!(
                "rows per side must leave an empty middle row, got {} on a {}x{} board",
                self.rows_per_side, self.board_size, self.board_size
            )));
        }
        Ok(())
    }

    /// Men each side starts with.
    pub fn max_pieces_per_side(&self) -> u8 {
        self.rows_per_side.saturating_mul(self.board_size / 2)
    }

    /// Row on which a piece of `color` is promoted.
    pub fn promotion_row(&self, color: Color) -> u8 {
        match color {
            Color::White => self.board_size - 1,
            Color::Blue => 0,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::standard()
    }
}
