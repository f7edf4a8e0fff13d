//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{Assignment, RevealOrder};
use crate::orchestrator::{CycleReport, Phase, RevealPath};

/// An assignment covers every seat and seats nobody twice
pub fn assert_assignment_invariants(assignment: &Assignment, seat_count: usize) {
    debug_assert_eq!(
        assignment.seat_count(),
        seat_count,
        "Assignment has {} seats, grid has {}",
        assignment.seat_count(),
        seat_count
    );

    let mut seen = HashSet::new();
    for seat in 0..assignment.seat_count() {
        if let Some(index) = assignment.roster_index(seat) {
            debug_assert!(
                seen.insert(index),
                "Roster entry {} seated twice (again at seat {})",
                index,
                seat
            );
        }
    }
}

/// A reveal order visits every seat exactly once
pub fn assert_reveal_order_invariants(order: &RevealOrder, seat_count: usize) {
    debug_assert_eq!(
        order.len(),
        seat_count,
        "Reveal order length {} does not match {} seats",
        order.len(),
        seat_count
    );

    let unique: HashSet<_> = order.as_slice().iter().collect();
    debug_assert!(
        unique.len() == order.len() && order.as_slice().iter().all(|&i| i < seat_count),
        "Reveal order {:?} is not a permutation of 0..{}",
        order.as_slice(),
        seat_count
    );
}

/// A finished cycle went through a legal stage path
pub fn assert_report_invariants(report: &CycleReport) {
    debug_assert_eq!(
        report.stages.last(),
        Some(&Phase::Settle),
        "Cycle {} did not end in settle: {:?}",
        report.cycle_id,
        report.stages
    );

    if report.path == RevealPath::Instant {
        debug_assert!(
            !report
                .stages
                .iter()
                .any(|s| matches!(s, Phase::Countdown | Phase::QuickPreview)),
            "Instant cycle {} entered a timed stage: {:?}",
            report.cycle_id,
            report.stages
        );
    }

    for &seat in &report.revealed {
        debug_assert!(
            report.assignment.occupant(seat).is_some(),
            "Cycle {} revealed empty seat {}",
            report.cycle_id,
            seat
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Roster, Student};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_valid_assignment() {
        let roster = Roster::new(vec![Student::new("a"), Student::new("b")]);
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = Assignment::shuffled(&roster, 14, &mut rng);
        assert_assignment_invariants(&assignment, 14);
    }

    #[test]
    fn test_valid_reveal_order() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_reveal_order_invariants(&RevealOrder::random(14, &mut rng), 14);
        assert_reveal_order_invariants(&RevealOrder::canonical(0), 0);
    }

    #[test]
    fn test_duplicate_names_pass() {
        // Identity is positional, so two students sharing a name are fine
        let roster = Roster::new(vec![Student::new("a"), Student::new("a")]);
        let mut rng = StdRng::seed_from_u64(1);
        let assignment = Assignment::shuffled(&roster, 2, &mut rng);
        assert_assignment_invariants(&assignment, 2);
    }

    #[test]
    #[should_panic(expected = "seats, grid has")]
    fn test_wrong_seat_count_detected() {
        assert_assignment_invariants(&Assignment::empty(3), 14);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_short_order_detected() {
        assert_reveal_order_invariants(&RevealOrder::canonical(3), 4);
    }
}
