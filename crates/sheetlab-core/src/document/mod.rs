//! Document state and logic (UI-agnostic).

mod check;
mod mode;
mod ops;
mod state;

pub use check::Mismatch;
pub use mode::{Mode, ModeEvent};
pub use ops::CommitReport;
pub use state::Document;
