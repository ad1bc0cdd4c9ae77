use crate::db::models::Session;

/// Horizontal slot of one session among the sessions it overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionSlot {
    pub column_index: usize,
    pub column_count: usize,
}

/// Half-open interval intersection: touching end-to-start is not an overlap.
pub fn overlaps(a: &Session, b: &Session) -> bool {
    a.starts_at < b.ends_at() && a.ends_at() > b.starts_at
}

/// Computes the slot of `day[position]` from its own collision set.
///
/// The set is local to this session, not a clustering of the whole day: in a
/// chain A-B-C where only neighbours overlap, A and C each see two columns
/// while B sees three.
pub fn collision_slot(day: &[&Session], position: usize) -> CollisionSlot {
    let me = day[position];

    // The session itself is always part of its set, even with a zero duration
    // where the interval test alone would drop it. Do not filter it out.
    let collisions: Vec<usize> = day
        .iter()
        .enumerate()
        .filter(|(index, other)| *index == position || overlaps(me, other))
        .map(|(index, _)| index)
        .collect();

    let column_index = collisions
        .iter()
        .position(|&index| index == position)
        .unwrap_or(0);

    CollisionSlot {
        column_index,
        column_count: collisions.len(),
    }
}
