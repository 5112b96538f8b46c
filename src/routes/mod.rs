/// Router Module Index
///
/// Splits the HTTP surface by whether the edge gate applies.

/// Routes mounted outside the gate: health checks and static assets.
pub mod public;

/// The gated dashboard shell. Every request reaching it has passed `edge_router`.
pub mod dashboard;
