use crate::model::*;

// ── Gap Algorithm ─────────────────────────────────────────────────

/// Free intervals inside `[open, close)` left over by `booked`.
///
/// `booked` may arrive in any order; it is sorted by start before the sweep.
/// Callers must not pass overlapping committed intervals, but an overlap is
/// absorbed by the cursor rather than producing a bogus gap.
pub fn compute_gaps(booked: &[HourSpan], open: Hour, close: Hour) -> Vec<HourSpan> {
    if open >= close {
        return Vec::new();
    }
    if booked.is_empty() {
        return vec![HourSpan::new(open, close)];
    }

    let mut sorted = booked.to_vec();
    sorted.sort_by_key(|s| s.start);

    let mut gaps = Vec::new();
    let mut cursor = open;
    for span in &sorted {
        let start = span.start.min(close);
        if start > cursor {
            gaps.push(HourSpan::new(cursor, start));
        }
        cursor = cursor.max(span.end);
    }

    if cursor < close {
        gaps.push(HourSpan::new(cursor, close));
    }

    gaps
}

/// Whether some free interval fully contains `window`.
pub fn covers(gaps: &[HourSpan], window: &HourSpan) -> bool {
    gaps.iter().any(|g| g.contains_span(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::{CLOSING_HOUR, OPENING_HOUR};

    fn s(start: Hour, end: Hour) -> HourSpan {
        HourSpan::new(start, end)
    }

    fn day_gaps(booked: &[HourSpan]) -> Vec<HourSpan> {
        compute_gaps(booked, OPENING_HOUR, CLOSING_HOUR)
    }

    /// Heap's algorithm: every ordering of `items`.
    fn permutations(items: &[HourSpan]) -> Vec<Vec<HourSpan>> {
        fn heap(k: usize, a: &mut Vec<HourSpan>, out: &mut Vec<Vec<HourSpan>>) {
            if k <= 1 {
                out.push(a.clone());
                return;
            }
            for i in 0..k {
                heap(k - 1, a, out);
                if k % 2 == 0 {
                    a.swap(i, k - 1);
                } else {
                    a.swap(0, k - 1);
                }
            }
        }
        let mut a = items.to_vec();
        let mut out = Vec::new();
        heap(a.len(), &mut a, &mut out);
        out
    }

    #[test]
    fn empty_day_is_fully_free() {
        assert_eq!(day_gaps(&[]), vec![s(9, 21)]);
    }

    #[test]
    fn full_day_has_no_gaps() {
        assert!(day_gaps(&[s(9, 21)]).is_empty());
    }

    #[test]
    fn adjacent_bookings_share_boundary() {
        assert_eq!(day_gaps(&[s(9, 12), s(12, 15)]), vec![s(15, 21)]);
    }

    #[test]
    fn single_booking_midday() {
        assert_eq!(day_gaps(&[s(12, 14)]), vec![s(9, 12), s(14, 21)]);
    }

    #[test]
    fn booking_at_close() {
        assert_eq!(day_gaps(&[s(18, 21)]), vec![s(9, 18)]);
    }

    #[test]
    fn multiple_punches() {
        let booked = vec![s(10, 11), s(13, 15), s(19, 20)];
        assert_eq!(
            day_gaps(&booked),
            vec![s(9, 10), s(11, 13), s(15, 19), s(20, 21)]
        );
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let booked = vec![s(19, 20), s(10, 11), s(13, 15)];
        assert_eq!(
            day_gaps(&booked),
            vec![s(9, 10), s(11, 13), s(15, 19), s(20, 21)]
        );
    }

    #[test]
    fn nested_overlap_does_not_rewind_cursor() {
        // [10,16) swallows [11,12); the cursor must stay at 16.
        assert_eq!(day_gaps(&[s(10, 16), s(11, 12)]), vec![s(9, 10), s(16, 21)]);
    }

    #[test]
    fn custom_window() {
        assert_eq!(compute_gaps(&[s(12, 13)], 10, 14), vec![s(10, 12), s(13, 14)]);
        assert!(compute_gaps(&[], 14, 14).is_empty());
    }

    #[test]
    fn every_permutation_gives_same_gaps() {
        let booked = vec![s(9, 10), s(11, 13), s(15, 16), s(20, 21)];
        let expected = day_gaps(&booked);
        for perm in permutations(&booked) {
            assert_eq!(day_gaps(&perm), expected, "ordering {perm:?}");
        }
    }

    #[test]
    fn gaps_and_bookings_tile_the_day() {
        let layouts: Vec<Vec<HourSpan>> = vec![
            vec![],
            vec![s(9, 21)],
            vec![s(9, 10)],
            vec![s(20, 21)],
            vec![s(10, 12), s(12, 13), s(17, 19)],
            vec![s(9, 11), s(14, 15), s(15, 21)],
        ];
        for booked in layouts {
            let gaps = day_gaps(&booked);
            for h in OPENING_HOUR..CLOSING_HOUR {
                let in_booked = booked.iter().filter(|b| b.contains_hour(h)).count();
                let in_gap = gaps.iter().filter(|g| g.contains_hour(h)).count();
                assert_eq!(in_booked + in_gap, 1, "hour {h} in {booked:?}");
            }
            for w in gaps.windows(2) {
                assert!(w[0].end < w[1].start, "gaps must be maximal and ordered");
            }
        }
    }

    #[test]
    fn covers_requires_full_containment() {
        let gaps = vec![s(9, 12), s(14, 21)];
        assert!(covers(&gaps, &s(9, 12)));
        assert!(covers(&gaps, &s(15, 17)));
        assert!(!covers(&gaps, &s(11, 15)));
        assert!(!covers(&[], &s(9, 10)));
    }
}
