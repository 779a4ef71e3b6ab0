pub mod conversion;
pub mod due;

pub use conversion::{can_be_converted, is_converted};
pub use due::{compute_due_state, due_bounds, validate_soon_days, DueBounds, DueState, MAX_SOON_DAYS};
