pub mod controller;
pub mod state;

pub use controller::{EditOutcome, PlannerController, PlannerView};
pub use state::{PlannerState, Selection};
