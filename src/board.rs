use std::fmt;

use crate::config::RulesConfig;
use crate::types::{Color, PerColor, Piece, Position, Rank, RulesError};

/// Checkers board: a square grid of optional pieces plus per-color live
/// and king counters.
///
/// Invariants: every counter matches the grid, a cell holds at most one
/// piece, and a stored piece's `row`/`col` always equal its cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: RulesConfig,
    cells: Vec<Option<Piece>>,
    counts: [u8; 2],
    kings: [u8; 2],
}

impl Board {
    /// Creates a board in the starting layout.
    pub fn new(config: RulesConfig) -> Result<Self, RulesError> {
        let mut board = Self::empty(config)?;
        board.setup();
        Ok(board)
    }

    /// Creates a board with no pieces on it.
    pub fn empty(config: RulesConfig) -> Result<Self, RulesError> {
        config.validate()?;
        let size = config.board_size as usize;
        Ok(Self {
            config,
            cells: vec![None; size * size],
            counts: [0; 2],
            kings: [0; 2],
        })
    }

    /// Resets to the starting layout: white men on the top rows, blue men on
    /// the bottom rows, dark squares only.
    pub fn setup(&mut self) {
        self.cells.fill(None);
        self.counts = [0; 2];
        self.kings = [0; 2];

        let size = self.config.board_size;
        let rows = self.config.rows_per_side;
        for row in 0..size {
            let color = if row < rows {
                Color::White
            } else if row >= size - rows {
                Color::Blue
            } else {
                continue;
            };
            for col in (0..size).filter(|&col| is_playable(row, col)) {
                let idx = self.flat(row, col);
                self.cells[idx] = Some(Piece::man(color, row, col));
                self.counts[color.index()] += 1;
            }
        }
        debug_assert!(
            Color::ALL
                .into_iter()
                .all(|color| self.count(color) == self.config.max_pieces_per_side())
        );
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn size(&self) -> u8 {
        self.config.board_size
    }

    /// Returns the piece on a cell.
    /// Fails with `OutOfRange` for coordinates outside the board.
    pub fn piece_at(&self, row: u8, col: u8) -> Result<Option<Piece>, RulesError> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx])
    }

    /// Bounds-free lookup for positions already known to be on the board.
    pub(crate) fn cell(&self, pos: Position) -> Option<Piece> {
        self.cells
            .get(self.flat(pos.row, pos.col))
            .copied()
            .flatten()
    }

    /// Puts a piece on its own `row`/`col`.
    pub fn place(&mut self, piece: Piece) -> Result<(), RulesError> {
        let idx = self.index(piece.row, piece.col)?;
        if self.cells[idx].is_some() {
            return Err(RulesError::Occupied {
                row: piece.row,
                col: piece.col,
            });
        }

        self.cells[idx] = Some(piece);
        self.counts[piece.color.index()] += 1;
        if piece.is_king() {
            self.kings[piece.color.index()] += 1;
        }
        Ok(())
    }

    /// Relocates the piece standing on `piece`'s cell to `(row, col)`,
    /// promoting it on the far row. Returns the piece as it now stands.
    ///
    /// Caller contract: the move was produced by the move generator. Only
    /// occupancy is checked here, not legality.
    pub fn move_piece(&mut self, piece: Piece, row: u8, col: u8) -> Result<Piece, RulesError> {
        let from = self.index(piece.row, piece.col)?;
        let to = self.index(row, col)?;

        let Some(mut moving) = self.cells[from] else {
            return Err(RulesError::EmptySquare {
                row: piece.row,
                col: piece.col,
            });
        };
        if self.cells[to].is_some() {
            return Err(RulesError::Occupied { row, col });
        }

        moving.row = row;
        moving.col = col;
        if moving.rank == Rank::Man && row == self.config.promotion_row(moving.color) {
            moving.rank = Rank::King;
            self.kings[moving.color.index()] += 1;
        }

        self.cells[from] = None;
        self.cells[to] = Some(moving);
        Ok(moving)
    }

    /// Clears the cells of `pieces` and updates the counters.
    /// Returns the number of pieces removed.
    ///
    /// Every listed piece must stand on its cell exactly as given; otherwise
    /// nothing is removed and the first offending cell is reported.
    pub fn remove_pieces(&mut self, pieces: &[Piece]) -> Result<usize, RulesError> {
        for piece in pieces {
            let idx = self.index(piece.row, piece.col)?;
            match self.cells[idx] {
                Some(stored) if stored == *piece => {}
                Some(_) => {
                    return Err(RulesError::PieceMismatch {
                        row: piece.row,
                        col: piece.col,
                    });
                }
                None => {
                    return Err(RulesError::EmptySquare {
                        row: piece.row,
                        col: piece.col,
                    });
                }
            }
        }

        let mut removed = 0;
        for piece in pieces {
            let idx = self.flat(piece.row, piece.col);
            if let Some(taken) = self.cells[idx].take() {
                self.counts[taken.color.index()] -= 1;
                if taken.is_king() {
                    self.kings[taken.color.index()] -= 1;
                }
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn is_eliminated(&self, color: Color) -> bool {
        self.count(color) == 0
    }

    /// Live pieces of `color`.
    pub fn count(&self, color: Color) -> u8 {
        self.counts[color.index()]
    }

    /// Live kings of `color`.
    pub fn kings(&self, color: Color) -> u8 {
        self.kings[color.index()]
    }

    pub fn counts(&self) -> PerColor<u8> {
        PerColor::from_fn(|color| self.count(color))
    }

    pub fn king_counts(&self) -> PerColor<u8> {
        PerColor::from_fn(|color| self.kings(color))
    }

    /// All pieces, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().filter_map(|cell| *cell)
    }

    /// Grid as `rows[row][col]`.
    pub fn rows(&self) -> Vec<Vec<Option<Piece>>> {
        self.cells
            .chunks(self.config.board_size as usize)
            .map(<[Option<Piece>]>::to_vec)
            .collect()
    }

    /// Encodes each cell as 0=empty, 1=white man, 2=white king,
    /// 3=blue man, 4=blue king.
    pub fn to_codes(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| cell_code(*cell)).collect()
    }

    /// CRC-32 over the size and cell codes.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&[self.config.board_size]);
        hasher.update(&self.to_codes());
        hasher.finalize()
    }

    fn index(&self, row: u8, col: u8) -> Result<usize, RulesError> {
        let size = self.config.board_size;
        if row >= size || col >= size {
            return Err(RulesError::OutOfRange { row, col });
        }
        Ok(self.flat(row, col))
    }

    fn flat(&self, row: u8, col: u8) -> usize {
        row as usize * self.config.board_size as usize + col as usize
    }
}

impl Default for Board {
    fn default() -> Self {
        let config = RulesConfig::standard();
        let size = config.board_size as usize;
        let mut board = Self {
            config,
            cells: vec![None; size * size],
            counts: [0; 2],
            kings: [0; 2],
        };
        board.setup();
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.config.board_size;
        write!(f, "  ")?;
        for col in 0..size {
            write!(f, " {:x}", col)?;
        }
        writeln!(f)?;

        for (row, cells) in self.cells.chunks(size as usize).enumerate() {
            write!(f, "{:x} ", row)?;
            for (col, cell) in cells.iter().enumerate() {
                let symbol = match cell {
                    Some(piece) => piece_symbol(piece),
                    None if is_playable(row as u8, col as u8) => '.',
                    None => ' ',
                };
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Dark squares, the only ones pieces ever stand on.
pub fn is_playable(row: u8, col: u8) -> bool {
    (row + col) % 2 == 1
}

fn cell_code(cell: Option<Piece>) -> u8 {
    match cell {
        None => 0,
        Some(piece) => match (piece.color, piece.rank) {
            (Color::White, Rank::Man) => 1,
            (Color::White, Rank::King) => 2,
            (Color::Blue, Rank::Man) => 3,
            (Color::Blue, Rank::King) => 4,
        },
    }
}

fn piece_symbol(piece: &Piece) -> char {
    match (piece.color, piece.rank) {
        (Color::White, Rank::Man) => 'w',
        (Color::White, Rank::King) => 'W',
        (Color::Blue, Rank::Man) => 'b',
        (Color::Blue, Rank::King) => 'B',
    }
}
