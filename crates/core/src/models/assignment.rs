//! Per-cycle seat assignment and reveal ordering

use rand::Rng;

use super::{Roster, Student};
use crate::randomizer::{random_permutation, shuffle};

/// A seated roster entry, remembering its roster position
#[derive(Debug, Clone, PartialEq, Eq)]
struct Seated {
    roster_index: usize,
    student: Student,
}

/// Seat index -> occupant for one reveal cycle. Built fresh every cycle and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    seats: Vec<Option<Seated>>,
}

impl Assignment {
    /// Shuffle the roster and seat it front to back. Extra students beyond
    /// `seat_count` are left out; seats beyond the roster stay empty.
    pub fn shuffled<R: Rng + ?Sized>(roster: &Roster, seat_count: usize, rng: &mut R) -> Self {
        let indexed: Vec<Seated> = roster
            .students()
            .iter()
            .cloned()
            .enumerate()
            .map(|(roster_index, student)| Seated {
                roster_index,
                student,
            })
            .collect();
        let mut order = shuffle(&indexed, rng).into_iter();
        let seats = (0..seat_count).map(|_| order.next()).collect();
        Self { seats }
    }

    /// Assignment with every seat empty
    pub fn empty(seat_count: usize) -> Self {
        Self {
            seats: vec![None; seat_count],
        }
    }

    pub fn occupant(&self, seat: usize) -> Option<&Student> {
        self.seated(seat).map(|s| &s.student)
    }

    /// Roster position of the student in `seat`
    pub fn roster_index(&self, seat: usize) -> Option<usize> {
        self.seated(seat).map(|s| s.roster_index)
    }

    /// Occupants in seat order, `None` for empty seats
    pub fn occupants(&self) -> impl Iterator<Item = Option<&Student>> + '_ {
        self.seats.iter().map(|s| s.as_ref().map(|s| &s.student))
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    fn seated(&self, seat: usize) -> Option<&Seated> {
        self.seats.get(seat).and_then(|s| s.as_ref())
    }
}

/// The sequence in which seats are revealed. Always a bijection over
/// `0..seat_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealOrder {
    sequence: Vec<usize>,
}

impl RevealOrder {
    /// Row-major order
    pub fn canonical(seat_count: usize) -> Self {
        Self {
            sequence: (0..seat_count).collect(),
        }
    }

    pub fn random<R: Rng + ?Sized>(seat_count: usize, rng: &mut R) -> Self {
        Self {
            sequence: random_permutation(seat_count, rng),
        }
    }

    /// Accept a caller-supplied order, falling back to canonical order when it
    /// has the wrong length or is not a permutation.
    pub fn resolve(candidate: Option<Vec<usize>>, seat_count: usize) -> Self {
        match candidate {
            Some(sequence) if is_permutation(&sequence, seat_count) => Self { sequence },
            Some(sequence) => {
                tracing::debug!(
                    len = sequence.len(),
                    seat_count,
                    "Malformed reveal order, using canonical order"
                );
                Self::canonical(seat_count)
            }
            None => Self::canonical(seat_count),
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn last(&self) -> Option<usize> {
        self.sequence.last().copied()
    }
}

fn is_permutation(sequence: &[usize], n: usize) -> bool {
    if sequence.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in sequence {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: usize) -> Roster {
        Roster::new((0..n).map(|i| Student::new(format!("s{}", i))).collect())
    }

    #[test]
    fn test_small_roster_leaves_trailing_seats_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let assignment = Assignment::shuffled(&roster(9), 14, &mut rng);

        assert_eq!(assignment.seat_count(), 14);
        assert!((0..9).all(|seat| assignment.occupant(seat).is_some()));
        assert!((9..14).all(|seat| assignment.occupant(seat).is_none()));
    }

    #[test]
    fn test_large_roster_uses_only_seat_count_entries() {
        let mut rng = StdRng::seed_from_u64(5);
        let big = roster(20);
        let assignment = Assignment::shuffled(&big, 14, &mut rng);

        assert_eq!(assignment.seat_count(), 14);
        assert_eq!(assignment.occupied_count(), 14);

        // Same draws as the underlying shuffle: first 14 post-shuffle entries
        let mut rng = StdRng::seed_from_u64(5);
        let expected = shuffle(big.students(), &mut rng);
        let seated: Vec<_> = assignment.occupants().flatten().cloned().collect();
        assert_eq!(seated, expected[..14].to_vec());
    }

    #[test]
    fn test_each_student_seated_at_most_once() {
        let mut rng = StdRng::seed_from_u64(11);
        let assignment = Assignment::shuffled(&roster(14), 14, &mut rng);
        let mut indices: Vec<_> = (0..14).filter_map(|s| assignment.roster_index(s)).collect();
        indices.sort();
        assert_eq!(indices, (0..14).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_names_are_distinct_entries() {
        let twins = Roster::new(vec![Student::new("Alex"), Student::new("Alex")]);
        let mut rng = StdRng::seed_from_u64(2);
        let assignment = Assignment::shuffled(&twins, 3, &mut rng);

        assert_eq!(assignment.occupied_count(), 2);
        assert_ne!(assignment.roster_index(0), assignment.roster_index(1));
        assert_eq!(assignment.occupant(0), assignment.occupant(1));
    }

    #[test]
    fn test_empty_roster() {
        let mut rng = StdRng::seed_from_u64(0);
        let assignment = Assignment::shuffled(&Roster::default(), 14, &mut rng);
        assert_eq!(assignment, Assignment::empty(14));
    }

    #[test]
    fn test_resolve_rejects_malformed_orders() {
        let canonical = RevealOrder::canonical(3);
        assert_eq!(RevealOrder::resolve(None, 3), canonical);
        assert_eq!(RevealOrder::resolve(Some(vec![0, 1]), 3), canonical);
        assert_eq!(RevealOrder::resolve(Some(vec![0, 0, 1]), 3), canonical);
        assert_eq!(RevealOrder::resolve(Some(vec![0, 1, 3]), 3), canonical);
        assert_eq!(
            RevealOrder::resolve(Some(vec![2, 0, 1]), 3).as_slice(),
            &[2, 0, 1]
        );
    }

    #[test]
    fn test_random_order_is_bijection() {
        let mut rng = StdRng::seed_from_u64(8);
        let order = RevealOrder::random(14, &mut rng);
        assert!(is_permutation(order.as_slice(), 14));
    }
}
