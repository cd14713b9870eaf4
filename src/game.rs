use crate::board::Board;
use crate::config::RulesConfig;
use crate::movegen::valid_moves;
use crate::types::{
    Color, MoveMap, MoveView, Phase, Piece, Position, RulesError, SelectOutcome, Snapshot,
};

/// Turn-level state machine over one board.
///
/// The only mutator of its `Board`. Callers sharing one controller across
/// threads must serialize `select`/`reset` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameController {
    config: RulesConfig,
    board: Board,
    turn: Color,
    selected: Option<Piece>,
    moves: MoveMap,
    winner: Option<Color>,
}

impl GameController {
    pub fn new(config: RulesConfig) -> Result<Self, RulesError> {
        let board = Board::new(config)?;
        Ok(Self::from_parts(config, board, config.first_turn))
    }

    /// Starts play from an arbitrary position with `turn` to move.
    /// A position where one side has no pieces starts already decided;
    /// one with no pieces at all is rejected.
    pub fn with_position(board: Board, turn: Color) -> Result<Self, RulesError> {
        if Color::ALL.into_iter().all(|color| board.is_eliminated(color)) {
            return Err(RulesError::EmptyPosition);
        }
        let config = *board.config();
        let mut game = Self::from_parts(config, board, turn);
        game.update_winner();
        Ok(game)
    }

    fn from_parts(config: RulesConfig, board: Board, turn: Color) -> Self {
        Self {
            config,
            board,
            turn,
            selected: None,
            moves: MoveMap::new(),
            winner: None,
        }
    }

    /// Handles a click on `(row, col)`.
    ///
    /// With a piece selected, a click on one of its destinations plays that
    /// move. Any other click drops the selection and is then retried once as
    /// a fresh selection, so clicking another own piece switches to it.
    ///
    /// Contract:
    /// - Out-of-range coordinates are the only error.
    /// - After game over every click is `Ignored` until `reset`.
    pub fn select(&mut self, row: u8, col: u8) -> Result<SelectOutcome, RulesError> {
        let clicked = self.board.piece_at(row, col)?;
        if self.winner.is_some() {
            return Ok(SelectOutcome::Ignored);
        }

        let mut dropped = false;
        if let Some(piece) = self.selected {
            let target = Position::new(row, col);
            if clicked.is_none() && self.moves.contains_key(&target) {
                return self.execute(piece, target);
            }
            self.clear_selection();
            dropped = true;
        }

        match clicked {
            Some(piece) if piece.color == self.turn => {
                self.moves = valid_moves(&self.board, &piece);
                self.selected = Some(piece);
                Ok(SelectOutcome::Selected)
            }
            _ if dropped => Ok(SelectOutcome::Deselected),
            _ => Ok(SelectOutcome::Ignored),
        }
    }

    /// Restores the starting position and the configured first turn.
    pub fn reset(&mut self) {
        self.board.setup();
        self.turn = self.config.first_turn;
        self.clear_selection();
        self.winner = None;
    }

    pub fn phase(&self) -> Phase {
        match (self.winner, self.selected) {
            (Some(winner), _) => Phase::GameOver(winner),
            (None, Some(piece)) => Phase::PieceSelected(piece),
            (None, None) => Phase::Idle,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn selected(&self) -> Option<Piece> {
        self.selected
    }

    /// Destinations of the selected piece; empty when nothing is selected.
    pub fn valid_moves(&self) -> &MoveMap {
        &self.moves
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.board.size(),
            grid: self.board.rows(),
            valid_moves: self
                .moves
                .iter()
                .map(|(to, captures)| MoveView {
                    to: *to,
                    captures: captures.iter().map(Piece::position).collect(),
                })
                .collect(),
            selected: self.selected.map(|piece| piece.position()),
            turn: self.turn,
            winner: self.winner,
            phase: self.phase(),
            counts: self.board.counts(),
            kings: self.board.king_counts(),
            fingerprint: self.board.fingerprint(),
        }
    }

    fn execute(&mut self, piece: Piece, target: Position) -> Result<SelectOutcome, RulesError> {
        let captures = self.moves.remove(&target).unwrap_or_default();

        let moved = self.board.move_piece(piece, target.row, target.col)?;
        let captured = self.board.remove_pieces(&captures)?;

        self.clear_selection();
        self.turn = self.turn.opponent();
        self.update_winner();

        Ok(SelectOutcome::Moved {
            captured,
            promoted: moved.is_king() && !piece.is_king(),
        })
    }

    fn update_winner(&mut self) {
        self.winner = Color::ALL
            .into_iter()
            .find(|&color| self.board.is_eliminated(color))
            .map(Color::opponent);
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.moves.clear();
    }
}

impl Default for GameController {
    fn default() -> Self {
        let config = RulesConfig::standard();
        Self::from_parts(config, Board::default(), config.first_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn game_with(pieces: &[Piece], turn: Color) -> GameController {
        let mut board = Board::empty(RulesConfig::standard()).unwrap();
        for piece in pieces {
            board.place(*piece).unwrap();
        }
        GameController::with_position(board, turn).unwrap()
    }

    fn total_pieces(game: &GameController) -> u8 {
        let counts = game.board().counts();
        counts.white + counts.blue
    }

    #[test]
    fn initial_snapshot_is_the_opening_position() {
        let game = GameController::default();
        let snapshot = game.snapshot();

        let pieces: Vec<Piece> = snapshot.grid.iter().flatten().flatten().copied().collect();
        assert_eq!(pieces.len(), 24);
        assert_eq!(pieces.iter().filter(|p| p.color == Color::White).count(), 12);
        assert!(pieces.iter().all(|p| p.rank == Rank::Man));
        assert_eq!(snapshot.turn, Color::Blue);
        assert_eq!(snapshot.winner, None);
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.valid_moves.is_empty());
    }

    #[test]
    fn selecting_an_own_man_lists_its_forward_neighbours() {
        let mut game =
            GameController::new(RulesConfig::standard().with_first_turn(Color::White)).unwrap();

        assert_eq!(game.select(2, 1).unwrap(), SelectOutcome::Selected);

        let moves = game.valid_moves();
        assert_eq!(moves.keys().copied().collect::<Vec<_>>(), vec![pos(3, 0), pos(3, 2)]);
        assert!(moves.values().all(Vec::is_empty));
        assert_eq!(game.phase(), Phase::PieceSelected(Piece::man(Color::White, 2, 1)));
    }

    #[test]
    fn clicks_on_empty_or_enemy_cells_are_ignored() {
        let mut game = GameController::default();
        let before = game.clone();

        assert_eq!(game.select(4, 1).unwrap(), SelectOutcome::Ignored);
        assert_eq!(game.select(2, 1).unwrap(), SelectOutcome::Ignored);
        assert_eq!(game, before);
    }

    #[test]
    fn out_of_range_click_is_an_error_and_changes_nothing() {
        let mut game = GameController::default();
        game.select(5, 0).unwrap();
        let before = game.clone();

        let err = game.select(8, 3).unwrap_err();

        assert_eq!(err, RulesError::OutOfRange { row: 8, col: 3 });
        assert_eq!(game, before);
    }

    #[test]
    fn simple_move_flips_turn_and_clears_selection() {
        let mut game = GameController::default();

        game.select(5, 0).unwrap();
        let outcome = game.select(4, 1).unwrap();

        assert_eq!(
            outcome,
            SelectOutcome::Moved {
                captured: 0,
                promoted: false
            }
        );
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.selected(), None);
        assert!(game.valid_moves().is_empty());
        assert_eq!(game.board().piece_at(4, 1).unwrap(), Some(Piece::man(Color::Blue, 4, 1)));
        assert_eq!(game.board().piece_at(5, 0).unwrap(), None);
    }

    #[test]
    fn clicking_another_own_piece_switches_selection_in_one_click() {
        let mut game = GameController::default();

        game.select(5, 0).unwrap();
        assert_eq!(game.select(5, 2).unwrap(), SelectOutcome::Selected);

        assert_eq!(game.selected(), Some(Piece::man(Color::Blue, 5, 2)));
        assert!(game.valid_moves().contains_key(&pos(4, 3)));
        assert_eq!(game.turn(), Color::Blue);
    }

    #[test]
    fn clicking_a_non_destination_drops_the_selection() {
        let mut game = GameController::default();

        game.select(5, 0).unwrap();
        assert_eq!(game.select(3, 4).unwrap(), SelectOutcome::Deselected);

        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.turn(), Color::Blue);
    }

    #[test]
    fn capture_removes_the_jumped_piece() {
        let mut game = game_with(
            &[
                Piece::man(Color::White, 3, 2),
                Piece::man(Color::Blue, 4, 3),
                Piece::man(Color::Blue, 7, 0),
            ],
            Color::White,
        );

        game.select(3, 2).unwrap();
        assert_eq!(
            game.valid_moves().get(&pos(5, 4)),
            Some(&vec![Piece::man(Color::Blue, 4, 3)])
        );
        let outcome = game.select(5, 4).unwrap();

        assert_eq!(
            outcome,
            SelectOutcome::Moved {
                captured: 1,
                promoted: false
            }
        );
        assert_eq!(game.board().piece_at(4, 3).unwrap(), None);
        assert_eq!(game.board().count(Color::Blue), 1);
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn double_capture_removes_both_pieces() {
        let mut game = game_with(
            &[
                Piece::man(Color::White, 2, 1),
                Piece::man(Color::Blue, 3, 2),
                Piece::man(Color::Blue, 5, 4),
                Piece::man(Color::Blue, 7, 0),
            ],
            Color::White,
        );

        game.select(2, 1).unwrap();
        game.select(6, 5).unwrap();

        assert_eq!(game.board().count(Color::Blue), 1);
        assert_eq!(game.board().piece_at(3, 2).unwrap(), None);
        assert_eq!(game.board().piece_at(5, 4).unwrap(), None);
        assert_eq!(game.board().piece_at(6, 5).unwrap().map(|p| p.color), Some(Color::White));
    }

    #[test]
    fn reaching_the_far_row_promotes() {
        let mut game = game_with(
            &[Piece::man(Color::White, 6, 1), Piece::man(Color::Blue, 5, 6)],
            Color::White,
        );

        game.select(6, 1).unwrap();
        let outcome = game.select(7, 2).unwrap();

        assert_eq!(
            outcome,
            SelectOutcome::Moved {
                captured: 0,
                promoted: true
            }
        );
        let snapshot = game.snapshot();
        assert_eq!(snapshot.grid[7][2].map(|p| p.rank), Some(Rank::King));
        assert_eq!(snapshot.kings.white, 1);
    }

    #[test]
    fn capturing_the_last_piece_ends_the_game() {
        let mut game = game_with(
            &[Piece::man(Color::White, 3, 2), Piece::man(Color::Blue, 4, 3)],
            Color::White,
        );

        game.select(3, 2).unwrap();
        game.select(5, 4).unwrap();

        assert_eq!(game.winner(), Some(Color::White));
        assert_eq!(game.phase(), Phase::GameOver(Color::White));

        let before = game.clone();
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(game.select(row, col).unwrap(), SelectOutcome::Ignored);
            }
        }
        assert_eq!(game, before);
        assert_eq!(game.snapshot().winner, Some(Color::White));
    }

    #[test]
    fn no_winner_while_both_sides_have_pieces() {
        let game = game_with(
            &[Piece::man(Color::White, 0, 1), Piece::man(Color::Blue, 7, 0)],
            Color::Blue,
        );

        assert_eq!(game.winner(), None);
    }

    #[test]
    fn position_without_one_side_starts_decided() {
        let game = game_with(&[Piece::man(Color::Blue, 7, 0)], Color::White);

        assert_eq!(game.winner(), Some(Color::Blue));
    }

    #[test]
    fn position_without_any_pieces_is_rejected() {
        let board = Board::empty(RulesConfig::standard()).unwrap();

        let err = GameController::with_position(board, Color::White).unwrap_err();

        assert_eq!(err, RulesError::EmptyPosition);
    }

    #[test]
    fn reset_restores_the_opening() {
        let mut game = GameController::default();
        game.select(5, 0).unwrap();
        game.select(4, 1).unwrap();
        game.select(2, 1).unwrap();

        game.reset();

        assert_eq!(game, GameController::default());
    }

    #[test]
    fn scripted_game_conserves_pieces_and_alternates_turns() {
        let mut game = GameController::default();
        let script = [
            ((5, 2), (4, 3)),
            ((2, 3), (3, 4)),
            ((5, 0), (4, 1)),
            ((3, 4), (5, 2)),
            ((6, 1), (4, 3)),
        ];

        let mut total = total_pieces(&game);
        for (from, to) in script {
            let turn = game.turn();
            let opponent_before = game.board().count(turn.opponent());

            assert_eq!(game.select(from.0, from.1).unwrap(), SelectOutcome::Selected);
            let SelectOutcome::Moved { captured, .. } = game.select(to.0, to.1).unwrap() else {
                panic!("expected a move from {from:?} to {to:?}");
            };

            assert_eq!(game.turn(), turn.opponent());
            assert_eq!(opponent_before - game.board().count(turn.opponent()), captured as u8);
            assert!(total_pieces(&game) <= total);
            total = total_pieces(&game);
        }

        assert_eq!(total, 22);
    }

    #[test]
    fn kings_stay_kings() {
        let mut game = game_with(
            &[Piece::king(Color::White, 7, 2), Piece::man(Color::Blue, 0, 1)],
            Color::White,
        );

        game.select(7, 2).unwrap();
        game.select(6, 3).unwrap();

        assert_eq!(game.board().piece_at(6, 3).unwrap().map(|p| p.rank), Some(Rank::King));
        assert_eq!(game.board().kings(Color::White), 1);
    }
}
