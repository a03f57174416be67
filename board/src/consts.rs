//! Shared numeric constants for the board crate.

// ── Chunking ────────────────────────────────────────────────────

/// Rows materialized per chunk.
pub const ROWS_PER_CHUNK: usize = 4;

/// Hard ceiling on rows per user pane.
pub const MAX_ROWS: usize = 60;

/// Rows a pane should hold when the window is maximized.
pub const MAXIMIZED_FILL_ROWS: usize = 20;

/// Rows below which a normal-sized window loads one more chunk.
pub const NORMAL_FILL_ROWS: usize = 8;

// ── Layout ──────────────────────────────────────────────────────

/// Column headers shown above every user's pane.
pub const COLUMN_HEADERS: [&str; 4] = ["Start Date", "End Date", "Description", "Time Spent"];
