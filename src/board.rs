//! Board grid, piece encoding, and placement notation.
//!
//! Each cell is a single byte: zero for an empty cell, otherwise a piece-kind
//! tag in the low three bits plus a color bit. Boards compare and hash on the
//! raw bytes, so two boards with the same placement are always equal.

use std::fmt;

use crate::constants::{BOARD_CELLS, COLS, ROWS};
use crate::error::{EngineError, Result};

/// Standard opening placement, Red on rows 0..=4, Black on rows 5..=9.
pub const START_PLACEMENT: &str =
    "RNBAKABNR/9/1C5C1/P1P1P1P1P/9/9/p1p1p1p1p/1c5c1/9/rnbakabnr";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// Row direction of a forward step for this side.
    pub fn forward(self) -> isize {
        match self {
            Color::Red => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.pad("red"),
            Color::Black => f.pad("black"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Soldier = 1,
    Chariot = 2,
    Cannon = 3,
    Horse = 4,
    Elephant = 5,
    Advisor = 6,
    General = 7,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::Soldier,
        PieceKind::Chariot,
        PieceKind::Cannon,
        PieceKind::Horse,
        PieceKind::Elephant,
        PieceKind::Advisor,
        PieceKind::General,
    ];

    fn from_tag(tag: u8) -> Option<PieceKind> {
        PieceKind::ALL.get((tag as usize).wrapping_sub(1)).copied()
    }

    /// Uppercase placement letter.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Soldier => 'P',
            PieceKind::Chariot => 'R',
            PieceKind::Cannon => 'C',
            PieceKind::Horse => 'N',
            PieceKind::Elephant => 'B',
            PieceKind::Advisor => 'A',
            PieceKind::General => 'K',
        }
    }

    fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Soldier),
            'R' => Some(PieceKind::Chariot),
            'C' => Some(PieceKind::Cannon),
            'N' => Some(PieceKind::Horse),
            'B' => Some(PieceKind::Elephant),
            'A' => Some(PieceKind::Advisor),
            'K' => Some(PieceKind::General),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Placement letter: uppercase for Red, lowercase for Black.
    pub fn letter(self) -> char {
        match self.color {
            Color::Red => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    pub fn from_letter(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::Red
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }
}

/// One-byte cell encoding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);

    const BLACK_BIT: u8 = 0b1000;
    const KIND_MASK: u8 = 0b0111;

    pub fn new(piece: Option<Piece>) -> Self {
        match piece {
            None => Cell::EMPTY,
            Some(p) => {
                let color = match p.color {
                    Color::Red => 0,
                    Color::Black => Cell::BLACK_BIT,
                };
                Cell(color | p.kind as u8)
            }
        }
    }

    pub fn piece(self) -> Option<Piece> {
        let kind = PieceKind::from_tag(self.0 & Cell::KIND_MASK)?;
        let color = if self.0 & Cell::BLACK_BIT != 0 {
            Color::Black
        } else {
            Color::Red
        };
        Some(Piece::new(color, kind))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw byte, stable across versions; suitable as evaluator input.
    #[inline]
    pub fn byte(self) -> u8 {
        self.0
    }
}

/// A board coordinate: `(row, col)`.
pub type Point = (usize, usize);

/// A rectangular grid of at most 10 rows by 9 columns.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: u8,
    cols: u8,
    cells: [Cell; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Create an empty board. Dimensions must fit within 10x9.
    pub fn empty(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || rows > ROWS || cols == 0 || cols > COLS {
            return Err(EngineError::InvalidBoard(format!(
                "dimensions {rows}x{cols} outside 1..={ROWS} x 1..={COLS}"
            )));
        }
        Ok(Self {
            rows: rows as u8,
            cols: cols as u8,
            cells: [Cell::EMPTY; BOARD_CELLS],
        })
    }

    /// The standard opening placement.
    pub fn standard() -> Self {
        let mut board = Self {
            rows: ROWS as u8,
            cols: COLS as u8,
            cells: [Cell::EMPTY; BOARD_CELLS],
        };
        for (row, line) in START_PLACEMENT.split('/').enumerate() {
            let mut col = 0;
            for c in line.chars() {
                match c.to_digit(10) {
                    Some(run) => col += run as usize,
                    None => {
                        board.set((row, col), Piece::from_letter(c));
                        col += 1;
                    }
                }
            }
        }
        board
    }

    /// Build a board from one string per row, `.` marking an empty cell.
    ///
    /// ```
    /// use xiangqi_mcts::board::Board;
    /// let board = Board::from_rows(&["..r", "C.."]).unwrap();
    /// assert_eq!(board.rows(), 2);
    /// assert_eq!(board.to_fen(), "2r/C2");
    /// ```
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut board = Self::empty(rows.len(), width)?;
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(EngineError::InvalidBoard(format!(
                    "row {row} has {} cells, expected {width}",
                    line.chars().count()
                )));
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let piece = Piece::from_letter(c).ok_or_else(|| {
                    EngineError::InvalidBoard(format!("unknown piece letter '{c}'"))
                })?;
                board.set((row, col), Some(piece));
            }
        }
        Ok(board)
    }

    /// Parse a placement string: rows separated by `/`, row 0 first, digits for
    /// runs of empty cells.
    pub fn from_fen(placement: &str) -> Result<Self> {
        let expanded = placement
            .split('/')
            .map(|line| {
                let mut row = String::new();
                for c in line.chars() {
                    match c.to_digit(10) {
                        Some(0) => {
                            return Err(EngineError::InvalidBoard(
                                "zero-length empty run".to_string(),
                            ));
                        }
                        Some(run) => row.extend(std::iter::repeat_n('.', run as usize)),
                        None => row.push(c),
                    }
                }
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;
        let rows: Vec<&str> = expanded.iter().map(String::as_str).collect();
        Self::from_rows(&rows)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows() {
            if row > 0 {
                out.push('/');
            }
            let mut run = 0;
            for col in 0..self.cols() {
                match self.get((row, col)) {
                    None => run += 1,
                    Some(piece) => {
                        if run > 0 {
                            out.push_str(&run.to_string());
                            run = 0;
                        }
                        out.push(piece.letter());
                    }
                }
            }
            if run > 0 {
                out.push_str(&run.to_string());
            }
        }
        out
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    #[inline]
    fn idx(&self, (row, col): Point) -> usize {
        row * COLS + col
    }

    /// Whether a signed coordinate lies on this board.
    #[inline]
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    #[inline]
    pub fn cell(&self, pt: Point) -> Cell {
        self.cells[self.idx(pt)]
    }

    #[inline]
    pub fn get(&self, pt: Point) -> Option<Piece> {
        self.cell(pt).piece()
    }

    #[inline]
    pub fn is_empty_at(&self, pt: Point) -> bool {
        self.cell(pt).is_empty()
    }

    pub fn set(&mut self, pt: Point, piece: Option<Piece>) {
        debug_assert!(
            pt.0 < self.rows() && pt.1 < self.cols(),
            "{pt:?} outside {}x{} board",
            self.rows(),
            self.cols()
        );
        let i = self.idx(pt);
        self.cells[i] = Cell::new(piece);
    }

    /// Every on-board point in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.rows()).flat_map(move |row| (0..self.cols()).map(move |col| (row, col)))
    }

    /// Pieces of one color in row-major order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Point, Piece)> + '_ {
        self.points().filter_map(move |pt| {
            self.get(pt)
                .filter(|piece| piece.color == color)
                .map(|piece| (pt, piece))
        })
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.points().filter(|&pt| self.get(pt) == Some(piece)).count()
    }

    /// On-board cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.points().map(|pt| self.cell(pt))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            write!(f, "{row} ")?;
            for col in 0..self.cols() {
                let ch = self.get((row, col)).map_or('.', Piece::letter);
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for col in 0..self.cols() {
            write!(f, "{} ", (b'a' + col as u8) as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_encoding_covers_every_piece() {
        for color in [Color::Red, Color::Black] {
            for kind in PieceKind::ALL {
                let piece = Piece::new(color, kind);
                let cell = Cell::new(Some(piece));
                assert!(!cell.is_empty());
                assert_eq!(cell.piece(), Some(piece));
            }
        }
        assert_eq!(Cell::new(None), Cell::EMPTY);
        assert_eq!(Cell::EMPTY.piece(), None);
    }

    #[test]
    fn test_standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.rows(), ROWS);
        assert_eq!(board.cols(), COLS);
        assert_eq!(
            board.get((0, 4)),
            Some(Piece::new(Color::Red, PieceKind::General))
        );
        assert_eq!(
            board.get((9, 4)),
            Some(Piece::new(Color::Black, PieceKind::General))
        );
        assert_eq!(
            board.get((7, 1)),
            Some(Piece::new(Color::Black, PieceKind::Cannon))
        );
        assert_eq!(board.pieces(Color::Red).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        assert_eq!(board.to_fen(), START_PLACEMENT);
    }

    #[test]
    fn test_fen_and_rows_agree() {
        let from_fen = Board::from_fen("4/1cp1/cr1r/4/1r2").unwrap();
        let from_rows = Board::from_rows(&["....", ".cp.", "cr.r", "....", ".r.."]).unwrap();
        assert_eq!(from_fen, from_rows);
        assert_eq!(from_fen.rows(), 5);
        assert_eq!(from_fen.cols(), 4);
    }

    #[test]
    fn test_invalid_boards_rejected() {
        assert!(Board::from_fen("9/9/9/9/9/9/9/9/9/9/9").is_err());
        assert!(Board::from_fen("10").is_err());
        assert!(Board::from_fen("3/4").is_err());
        assert!(Board::from_fen("2x").is_err());
        assert!(Board::from_rows(&[]).is_err());
        assert!(Board::empty(0, 3).is_err());
    }

    #[test]
    fn test_equal_placements_are_equal_boards() {
        let mut a = Board::empty(3, 3).unwrap();
        let mut b = Board::empty(3, 3).unwrap();
        let horse = Piece::new(Color::Black, PieceKind::Horse);
        a.set((1, 1), Some(horse));
        b.set((0, 0), Some(horse));
        assert_ne!(a, b);
        b.set((0, 0), None);
        b.set((1, 1), Some(horse));
        assert_eq!(a, b);
    }

    #[test]
    fn test_color_opponent_and_forward() {
        assert_eq!(Color::Red.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::Red);
        assert_eq!(Color::Red.forward(), 1);
        assert_eq!(Color::Black.forward(), -1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 1x4 board")]
    fn test_set_outside_width_panics() {
        let mut board = Board::empty(1, 4).unwrap();
        board.set((0, 5), Some(Piece::new(Color::Red, PieceKind::Chariot)));
    }
}
