use std::collections::{BTreeMap, BTreeSet};

use ulid::Ulid;

use super::gaps::covers;
use crate::model::*;

// ── Pool Availability Algorithm ───────────────────────────────────

/// Per-hour view of which units of a pool are free.
pub fn free_units_by_hour(unit_free: &[(Ulid, Vec<HourSpan>)]) -> BTreeMap<Hour, BTreeSet<Ulid>> {
    let mut by_hour: BTreeMap<Hour, BTreeSet<Ulid>> = BTreeMap::new();
    for (unit, free) in unit_free {
        for span in free {
            for h in span.each_hour() {
                by_hour.entry(h).or_default().insert(*unit);
            }
        }
    }
    by_hour
}

/// Merge the hours where at least `quantity` units are free into pool-level gaps.
///
/// `unit_free` holds, for every unit of the pool, its single-resource free
/// intervals. An hour qualifies when `quantity` or more units are free in it.
/// A qualifying hour extends the current interval only when it directly follows
/// it, its free set contains or is contained in the free set of the interval's
/// first hour, and at least `quantity` units stay free across the whole
/// extended interval. Otherwise it opens a new interval. Every returned gap
/// therefore has `quantity` units free for its entire span.
pub fn pool_gaps(unit_free: &[(Ulid, Vec<HourSpan>)], quantity: usize) -> Vec<HourSpan> {
    if quantity == 0 || unit_free.len() < quantity {
        return Vec::new();
    }

    let by_hour = free_units_by_hour(unit_free);

    let mut result: Vec<HourSpan> = Vec::new();
    // First hour of the interval currently being extended.
    let mut anchor: Option<Hour> = None;
    // Units free in every hour of the current interval.
    let mut held: BTreeSet<Ulid> = BTreeSet::new();

    for (&hour, free) in &by_hour {
        if free.len() < quantity {
            continue;
        }

        let kept = match (anchor, result.last()) {
            (Some(a), Some(last)) if last.end == hour => {
                let anchor_set = &by_hour[&a];
                if free.is_superset(anchor_set) || free.is_subset(anchor_set) {
                    let kept: BTreeSet<Ulid> = held.intersection(free).copied().collect();
                    (kept.len() >= quantity).then_some(kept)
                } else {
                    None
                }
            }
            _ => None,
        };

        match kept {
            Some(kept) => {
                held = kept;
                if let Some(last) = result.last_mut() {
                    last.end = hour + 1;
                }
            }
            None => {
                result.push(HourSpan::new(hour, hour + 1));
                anchor = Some(hour);
                held = free.clone();
            }
        }
    }

    result
}

/// Whether every hour of `window` lies inside some pool gap.
pub fn gaps_cover_hours(gaps: &[HourSpan], window: &HourSpan) -> bool {
    window
        .each_hour()
        .all(|h| gaps.iter().any(|g| g.contains_hour(h)))
}

/// Units free for the whole `window`, in pool order.
pub fn units_free_for(unit_free: &[(Ulid, Vec<HourSpan>)], window: &HourSpan) -> Vec<Ulid> {
    unit_free
        .iter()
        .filter(|(_, free)| covers(free, window))
        .map(|(unit, _)| *unit)
        .collect()
}
