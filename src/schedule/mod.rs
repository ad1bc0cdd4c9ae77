pub mod collisions;
pub mod config;
pub mod constraints;
pub mod layout;
pub mod week;

pub use collisions::{collision_slot, overlaps, CollisionSlot};
pub use config::{LayoutConfig, SLOT_MARGIN_PX};
pub use constraints::{
    clamp_duration_to_midnight, minutes_until_midnight, validate_start_against_opening,
    validate_start_time, ClampOutcome, ValidationOutcome,
};
pub use layout::{compute_week_layout, PositionedSession};
pub use week::{day_index, in_week, week_end, week_label, week_start_of, WeekDays};
