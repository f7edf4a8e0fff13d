//! Fisher-Yates shuffling for rosters and reveal orders
//!
//! Both functions draw from a caller-supplied RNG and hold no state, so a
//! seeded `StdRng` makes every cycle reproducible in tests.

use rand::Rng;

/// Return a uniformly shuffled copy of `items`. The input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    fisher_yates(&mut out, rng);
    out
}

/// A uniformly random permutation of `0..n`
pub fn random_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut out: Vec<usize> = (0..n).collect();
    fisher_yates(&mut out, rng);
    out
}

fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    // i == 0 can only swap with itself
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
