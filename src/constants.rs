//! Constants for board geometry, piece zones, and search parameters.
//!
//! Rows are numbered from Red's back rank (row 0) to Black's back rank (row 9).
//! Red advances toward higher rows, Black toward lower rows. Zones are absolute
//! row/column ranges, so a smaller test board keeps the same midline and palace.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of rows on a full board.
pub const ROWS: usize = 10;

/// Number of columns (files) on a full board.
pub const COLS: usize = 9;

/// Cell storage per board. Smaller boards use a prefix of it.
pub const BOARD_CELLS: usize = ROWS * COLS;

/// Last row of Red's half. Black's half starts at `RED_HALF_MAX + 1`.
pub const RED_HALF_MAX: usize = 4;

/// First row of Black's half.
pub const BLACK_HALF_MIN: usize = RED_HALF_MAX + 1;

// =============================================================================
// Palace
// =============================================================================

/// Leftmost palace file.
pub const PALACE_COL_MIN: usize = 3;

/// Rightmost palace file.
pub const PALACE_COL_MAX: usize = 5;

/// Deepest row of Red's palace (rows 0..=2).
pub const RED_PALACE_ROW_MAX: usize = 2;

/// Shallowest row of Black's palace (rows 7..=9).
pub const BLACK_PALACE_ROW_MIN: usize = 7;

// =============================================================================
// Move Encoding
// =============================================================================

/// Size of the dense move index space: from-row, from-col, to-row, to-col.
pub const MOVE_INDEX_SPACE: usize = ROWS * COLS * ROWS * COLS;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of search rounds per `search()` call.
pub const DEFAULT_ROUNDS: u32 = 800;

/// Default ply bound for a single random rollout.
pub const DEFAULT_ROLLOUT_PLIES: u32 = 300;

/// UCT exploration constant, multiplied into `sqrt(2 ln N / n)`.
pub const EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Number of rounds between progress traces during a search.
pub const REPORT_PERIOD: u32 = 200;
