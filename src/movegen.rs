use crate::board::Board;
use crate::types::{CaptureSet, Color, MoveMap, Piece, Position};

const COLUMN_DIRECTIONS: [i8; 2] = [-1, 1];

/// Computes every destination reachable by `piece` in one move, each paired
/// with the opponent pieces captured on the way.
///
/// Men travel along their forward row direction only, kings along both. A
/// step onto an adjacent empty cell is a simple move. A step over one enemy
/// onto the empty cell beyond is a capture, after which the search continues
/// from the landing cell in the same row direction, accumulating captures.
/// Simple moves are not offered after a capture.
///
/// Captures are not mandatory: simple and capturing moves appear side by side.
pub fn valid_moves(board: &Board, piece: &Piece) -> MoveMap {
    let mut moves = MoveMap::new();
    let origin = piece.position();

    for dr in piece.row_directions() {
        for dc in COLUMN_DIRECTIONS {
            scan(board, piece.color, origin, dr, dc, &[], &mut moves);
        }
    }

    moves
}

/// Walks one diagonal from `from`. `captured` holds the pieces already
/// jumped earlier in the chain and is never mutated in place.
fn scan(
    board: &Board,
    color: Color,
    from: Position,
    dr: i8,
    dc: i8,
    captured: &[Piece],
    moves: &mut MoveMap,
) {
    let size = board.size();
    let mut cursor = from;
    let mut jumped: Option<Piece> = None;

    loop {
        let Some(next) = cursor.offset(dr, dc, size) else {
            return;
        };

        match (board.cell(next), jumped) {
            (None, None) => {
                if captured.is_empty() {
                    record(moves, next, CaptureSet::new());
                }
                return;
            }
            (None, Some(enemy)) => {
                let mut chain = captured.to_vec();
                chain.push(enemy);
                for dc in COLUMN_DIRECTIONS {
                    scan(board, color, next, dr, dc, &chain, moves);
                }
                record(moves, next, chain);
                return;
            }
            (Some(occupant), _) if occupant.color == color => return,
            // Two enemies back to back: no landing cell between them.
            (Some(_), Some(_)) => return,
            (Some(enemy), None) => {
                jumped = Some(enemy);
                cursor = next;
            }
        }
    }
}

/// Keeps one entry per destination, preferring the longer chain.
fn record(moves: &mut MoveMap, to: Position, captures: CaptureSet) {
    if moves
        .get(&to)
        .is_some_and(|existing| existing.len() >= captures.len())
    {
        return;
    }
    moves.insert(to, captures);
}
