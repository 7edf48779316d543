//! Movement scenarios for each piece kind, mostly on miniature boards.
//!
//! Miniature boards keep the full board's zones: rows 0..=4 are Red's half,
//! rows 5..=9 Black's, and the palaces sit on files 3..=5.

use std::collections::BTreeSet;

use xiangqi_mcts::board::{Board, Color, Piece, PieceKind, Point};
use xiangqi_mcts::position::Position;
use xiangqi_mcts::rules::{
    has_crossed_river, horse_leg, in_own_half, in_palace, legal_destinations, pieces_between,
};

// =============================================================================
// Helper functions
// =============================================================================

fn board(rows: &[&str]) -> Board {
    Board::from_rows(rows).unwrap()
}

fn set(points: &[Point]) -> BTreeSet<Point> {
    points.iter().copied().collect()
}

/// Ten rows of four empty cells, with the given (row, line) overrides.
fn tall_board(overrides: &[(usize, &str)]) -> Board {
    let mut rows = vec!["...."; 10];
    for &(row, line) in overrides {
        rows[row] = line;
    }
    board(&rows)
}

// =============================================================================
// Cannon
// =============================================================================

#[test]
fn test_cannon_blocked_quiet_and_capture() {
    let b = board(&["....", ".cp.", "cR.R", "....", ".r.."]);

    // The Red chariot directly below is adjacent, so it cannot be captured, and
    // past it the Black chariot is the cannon's own piece.
    assert_eq!(legal_destinations(&b, (1, 1)), set(&[(0, 1), (1, 0)]));
}

#[test]
fn test_cannon_captures_over_one_screen() {
    let b = board(&["....", ".cp.", "cR.R", "....", ".r.."]);

    // The near Red chariot screens the far one.
    assert_eq!(
        legal_destinations(&b, (2, 0)),
        set(&[(0, 0), (1, 0), (3, 0), (4, 0), (2, 3)])
    );
}

#[test]
fn test_cannon_cannot_capture_over_two_screens() {
    let b = board(&["C.pPr"]);
    assert_eq!(legal_destinations(&b, (0, 0)), set(&[(0, 1)]));
}

// =============================================================================
// Chariot
// =============================================================================

#[test]
fn test_chariot_slides_and_captures_first_enemy() {
    let b = board(&["....", "r.RR", "....", "....", "c...", "...."]);

    assert_eq!(
        legal_destinations(&b, (1, 0)),
        set(&[(0, 0), (1, 1), (1, 2), (2, 0), (3, 0)])
    );
}

// =============================================================================
// Horse
// =============================================================================

#[test]
fn test_horse_is_hobbled_by_leg() {
    let b = board(&["....", "R...", "n.RR", "....", "....", "c..r", ".rRR"]);

    // The Red chariot on (1, 0) blocks the jump to (0, 1).
    assert_eq!(legal_destinations(&b, (2, 0)), set(&[(3, 2), (1, 2), (4, 1)]));
}

#[test]
fn test_horse_in_open_center() {
    let b = board(&[".....", ".....", "..N..", ".....", "....."]);
    assert_eq!(
        legal_destinations(&b, (2, 2)),
        set(&[
            (0, 1),
            (0, 3),
            (1, 0),
            (1, 4),
            (3, 0),
            (3, 4),
            (4, 1),
            (4, 3)
        ])
    );
}

// =============================================================================
// Elephant
// =============================================================================

#[test]
fn test_elephant_from_back_corner() {
    let b = tall_board(&[(9, "b...")]);
    assert_eq!(legal_destinations(&b, (9, 0)), set(&[(7, 2)]));
}

#[test]
fn test_elephant_in_open_field() {
    let b = tall_board(&[(7, "..b.")]);
    assert_eq!(legal_destinations(&b, (7, 2)), set(&[(9, 0), (5, 0)]));
}

#[test]
fn test_elephant_eye_blocked_by_enemy() {
    let b = tall_board(&[(7, "..b."), (8, ".P..")]);
    assert_eq!(legal_destinations(&b, (7, 2)), set(&[(5, 0)]));
}

#[test]
fn test_elephant_captures_enemy() {
    let b = tall_board(&[(7, "..b."), (9, "P...")]);
    assert_eq!(legal_destinations(&b, (7, 2)), set(&[(5, 0), (9, 0)]));
}

#[test]
fn test_elephant_cannot_take_own_piece() {
    let b = tall_board(&[(7, "..b."), (9, "r...")]);
    assert_eq!(legal_destinations(&b, (7, 2)), set(&[(5, 0)]));
}

#[test]
fn test_elephant_cannot_cross_river() {
    let b = tall_board(&[(5, "b...")]);
    assert_eq!(legal_destinations(&b, (5, 0)), set(&[(7, 2)]));

    let b = tall_board(&[(4, "B...")]);
    assert_eq!(legal_destinations(&b, (4, 0)), set(&[(2, 2)]));
}

// =============================================================================
// Advisor
// =============================================================================

fn advisor_board() -> Board {
    Board::from_fen("RNBAK1BNR/4A4/1C5C1/P1P1P1P1P/9/9/p1p1p1p1p/1c5c1/4a4/rnbak1bnr").unwrap()
}

#[test]
fn test_black_advisor_stays_in_palace() {
    assert_eq!(
        legal_destinations(&advisor_board(), (8, 4)),
        set(&[(7, 3), (7, 5), (9, 5)])
    );
}

#[test]
fn test_red_advisor_stays_in_palace() {
    assert_eq!(
        legal_destinations(&advisor_board(), (1, 4)),
        set(&[(0, 5), (2, 3), (2, 5)])
    );
}

#[test]
fn test_advisor_in_palace_corner() {
    let b = Board::from_fen("3A5/9/9/9/9/9/9/9/9/9").unwrap();
    assert_eq!(legal_destinations(&b, (0, 3)), set(&[(1, 4)]));
}

// =============================================================================
// General
// =============================================================================

#[test]
fn test_general_orthogonal_within_palace() {
    let b = Board::from_fen("9/9/9/9/9/9/9/9/9/4k4").unwrap();
    assert_eq!(legal_destinations(&b, (9, 4)), set(&[(8, 4), (9, 3), (9, 5)]));

    let b = Board::from_fen("9/9/9/9/9/9/9/3k5/9/9").unwrap();
    assert_eq!(legal_destinations(&b, (7, 3)), set(&[(8, 3), (7, 4)]));
}

// =============================================================================
// Soldier
// =============================================================================

#[test]
fn test_soldier_before_river_only_advances() {
    let b = tall_board(&[(3, "P..."), (6, "..p.")]);
    assert_eq!(legal_destinations(&b, (3, 0)), set(&[(4, 0)]));
    assert_eq!(legal_destinations(&b, (6, 2)), set(&[(5, 2)]));
}

#[test]
fn test_soldier_after_river_moves_sideways() {
    let b = tall_board(&[(4, "..p."), (5, ".P..")]);
    assert_eq!(legal_destinations(&b, (4, 2)), set(&[(3, 2), (4, 1), (4, 3)]));
    assert_eq!(legal_destinations(&b, (5, 1)), set(&[(6, 1), (5, 0), (5, 2)]));
}

#[test]
fn test_soldier_never_retreats_at_last_row() {
    let b = tall_board(&[(9, ".P..")]);
    assert_eq!(legal_destinations(&b, (9, 1)), set(&[(9, 0), (9, 2)]));
}

// =============================================================================
// Shared pipeline
// =============================================================================

#[test]
fn test_empty_cell_has_no_destinations() {
    let b = board(&["...", ".c.", ".R."]);
    assert!(legal_destinations(&b, (0, 0)).is_empty());
}

#[test]
fn test_small_board_successor_count() {
    let pos = Position::unchecked(board(&["...", ".c.", ".R."]), Color::Black);
    assert_eq!(pos.successors(Color::Black).len(), 3);
}

#[test]
fn test_destinations_are_on_board_and_never_own_pieces() {
    let b = Board::standard();
    for color in [Color::Red, Color::Black] {
        for (from, piece) in b.pieces(color) {
            for to in legal_destinations(&b, from) {
                assert!(to.0 < b.rows() && to.1 < b.cols(), "{piece:?} {from:?} -> {to:?}");
                assert!(
                    b.get(to).is_none_or(|target| target.color != color),
                    "{piece:?} {from:?} -> {to:?} lands on own piece"
                );
            }
        }
    }
}

/// Check every movement rule for one destination.
fn assert_destination_rules(board: &Board, from: Point, piece: Piece, to: Point) {
    let ctx = || format!("{piece:?} {from:?} -> {to:?} on {board:?}");
    assert!(to.0 < board.rows() && to.1 < board.cols(), "off board: {}", ctx());
    assert!(
        board.get(to).is_none_or(|target| target.color != piece.color),
        "own piece: {}", ctx()
    );

    let dr = to.0 as isize - from.0 as isize;
    let dc = to.1 as isize - from.1 as isize;
    let color = piece.color;
    match piece.kind {
        PieceKind::Chariot => {
            assert_eq!(pieces_between(board, from, to), Some(0), "{}", ctx());
        }
        PieceKind::Cannon => match pieces_between(board, from, to) {
            Some(0) => assert!(board.is_empty_at(to), "cannon capture without screen: {}", ctx()),
            Some(1) => assert!(!board.is_empty_at(to), "cannon quiet move over screen: {}", ctx()),
            other => panic!("cannon with {other:?} screens: {}", ctx()),
        },
        PieceKind::Horse => {
            assert!(
                matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1)),
                "not a horse jump: {}", ctx()
            );
            assert!(board.is_empty_at(horse_leg(from, to)), "hobbled horse: {}", ctx());
        }
        PieceKind::Elephant => {
            assert!(dr.abs() == 2 && dc.abs() == 2, "not an elephant step: {}", ctx());
            let eye = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
            assert!(board.is_empty_at(eye), "blocked eye: {}", ctx());
            assert!(in_own_half(color, to.0), "elephant crossed river: {}", ctx());
        }
        PieceKind::Advisor => {
            assert!(dr.abs() == 1 && dc.abs() == 1, "not an advisor step: {}", ctx());
            assert!(in_palace(color, to), "advisor left palace: {}", ctx());
        }
        PieceKind::General => {
            assert_eq!(dr.abs() + dc.abs(), 1, "not a general step: {}", ctx());
            assert!(in_palace(color, to), "general left palace: {}", ctx());
        }
        PieceKind::Soldier => {
            let forward = dr == color.forward() && dc == 0;
            let sideways = dr == 0 && dc.abs() == 1 && has_crossed_river(color, from.0);
            assert!(forward || sideways, "bad soldier move: {}", ctx());
        }
    }
}

#[test]
fn test_rules_hold_along_random_games() {
    let mut rng = fastrand::Rng::with_seed(2024);
    let mut checked = 0usize;

    for _ in 0..20 {
        let mut position = Position::start();
        for _ in 0..100 {
            if position.is_terminal() {
                break;
            }
            let board = position.board();
            for color in [Color::Red, Color::Black] {
                for (from, piece) in board.pieces(color) {
                    for to in legal_destinations(board, from) {
                        assert_destination_rules(board, from, piece, to);
                        checked += 1;
                    }
                }
            }
            match position.random_successor(position.side_to_move(), &mut rng) {
                Some(next) => position = next,
                None => break,
            }
        }
    }
    assert!(checked > 1_000, "only {checked} destinations checked");
}
