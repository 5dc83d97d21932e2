//! Deterministic pseudo-random source for the whole generation pipeline.
//!
//! Mulberry32: a 32-bit state advanced by a fixed odd constant with two
//! xorshift/multiply mixing rounds per draw. Every component draws through
//! one instance of this generator in a fixed call order, which is what makes
//! whole-district output reproducible from a single seed.
//!
//! The draw path uses integer bit operations only. Do not introduce
//! transcendental float math or any other platform-sensitive operation here;
//! identical seeds must produce bit-identical sequences everywhere.

use serde::{Deserialize, Serialize};

const STATE_INCREMENT: u32 = 0x6D2B_79F5;

/// Seeded Mulberry32 generator.
///
/// State 0 is a fixed point of the mixing function, so it is remapped to 1
/// at every entry point that can set state (construction, `set_state`,
/// deserialization).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedRngState")]
pub struct DeterministicRng {
    state: u32,
}

#[derive(Deserialize)]
struct PersistedRngState {
    state: u32,
}

impl From<PersistedRngState> for DeterministicRng {
    fn from(persisted: PersistedRngState) -> Self {
        let mut rng = DeterministicRng { state: persisted.state };
        if rng.state == 0 {
            rng.state = 1;
        }
        rng
    }
}

impl DeterministicRng {
    /// Create a generator from any integer seed.
    ///
    /// Seeds outside the 32-bit unsigned range (including negative values)
    /// are coerced with two's-complement wrapping, matching an unsigned
    /// 32-bit coercion of the seed.
    pub fn new(seed: i64) -> Self {
        let mut state = seed as u32;
        if state == 0 {
            state = 1;
        }
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform integer in `[min, max]`, inclusive on both ends.
    ///
    /// Panics if `min > max`.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "invalid range: min ({min}) must be <= max ({max})");
        let span = f64::from(max) - f64::from(min) + 1.0;
        ((self.next() * span).floor() + f64::from(min)) as i32
    }

    /// Uniform float in `[min, max)`.
    ///
    /// Panics if `min > max`.
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "invalid range: min ({min}) must be <= max ({max})");
        self.next() * (max - min) + min
    }

    /// `true` with the given probability.
    ///
    /// Panics if `chance` is outside `[0, 1]`.
    pub fn next_bool(&mut self, chance: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&chance),
            "invalid chance: {chance} must be in range [0, 1]"
        );
        self.next() < chance
    }

    /// Uniformly chosen element.
    ///
    /// Panics if `items` is empty.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot choose from an empty slice");
        let index = self.next_int(0, items.len() as i32 - 1) as usize;
        &items[index]
    }

    /// In-place Fisher-Yates shuffle. A no-op on empty or single-element
    /// slices (no draws are consumed).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as i32) as usize;
            items.swap(i, j);
        }
    }

    /// Raw 32-bit state, for checkpointing.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Restore a checkpointed state. Zero is remapped to 1.
    pub fn set_state(&mut self, state: u32) {
        self.state = if state == 0 { 1 } else { state };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_identical_sequences() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(42);
        for _ in 0..1_000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge_immediately() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(43);
        assert_ne!(a.next(), b.next());
    }

    #[test]
    fn zero_seed_is_remapped_to_state_one() {
        let rng = DeterministicRng::new(0);
        assert_eq!(rng.state(), 1);
    }

    #[test]
    fn negative_and_oversized_seeds_coerce_to_32_bits() {
        assert_eq!(DeterministicRng::new(-1).state(), u32::MAX);
        assert_eq!(DeterministicRng::new(1 << 40).state(), DeterministicRng::new(0).state());
        assert_eq!(DeterministicRng::new((1 << 32) + 7).state(), 7);
    }

    #[test]
    fn next_stays_in_unit_interval() {
        let mut rng = DeterministicRng::new(12_345);
        for _ in 0..10_000 {
            let value = rng.next();
            assert!((0.0..1.0).contains(&value), "next() out of range: {value}");
        }
    }

    #[test]
    fn next_int_is_inclusive_on_both_ends_and_in_range() {
        let mut rng = DeterministicRng::new(999);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..10_000 {
            let value = rng.next_int(3, 9);
            assert!((3..=9).contains(&value), "next_int out of range: {value}");
            saw_min |= value == 3;
            saw_max |= value == 9;
        }
        assert!(saw_min, "lower bound should be reachable");
        assert!(saw_max, "upper bound should be reachable");
    }

    #[test]
    fn next_int_distribution_is_roughly_uniform() {
        let mut rng = DeterministicRng::new(777);
        let draws = 10_000;
        let mut buckets = [0_u32; 10];
        for _ in 0..draws {
            buckets[rng.next_int(0, 9) as usize] += 1;
        }
        let expected = draws as f64 / buckets.len() as f64;
        for (bucket, &count) in buckets.iter().enumerate() {
            let deviation = (f64::from(count) - expected).abs() / expected;
            assert!(deviation < 0.2, "bucket {bucket} deviates {deviation:.3} from uniform");
        }
    }

    #[test]
    #[should_panic(expected = "invalid range")]
    fn next_int_rejects_inverted_range() {
        DeterministicRng::new(1).next_int(5, 4);
    }

    #[test]
    fn next_float_respects_half_open_bounds() {
        let mut rng = DeterministicRng::new(555);
        for _ in 0..10_000 {
            let value = rng.next_float(1.5, 3.5);
            assert!(value >= 1.5 && value < 3.5, "next_float out of range: {value}");
        }
    }

    #[test]
    fn next_bool_extremes_are_exact() {
        let mut rng = DeterministicRng::new(42);
        for _ in 0..100 {
            assert!(!rng.next_bool(0.0));
            assert!(rng.next_bool(1.0));
        }
    }

    #[test]
    #[should_panic(expected = "invalid chance")]
    fn next_bool_rejects_out_of_range_probability() {
        DeterministicRng::new(1).next_bool(1.5);
    }

    #[test]
    #[should_panic(expected = "empty slice")]
    fn choice_rejects_empty_input() {
        let empty: [u8; 0] = [];
        DeterministicRng::new(1).choice(&empty);
    }

    #[test]
    fn shuffle_permutes_in_place_and_is_seed_deterministic() {
        let mut first = (0..32).collect::<Vec<i32>>();
        let mut second = first.clone();
        DeterministicRng::new(2_024).shuffle(&mut first);
        DeterministicRng::new(2_024).shuffle(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<i32>>(), "shuffle must preserve elements");
        assert_ne!(first, sorted, "32 elements should not shuffle into identity for this seed");
    }

    #[test]
    fn shuffle_of_empty_slice_consumes_no_draws() {
        let mut rng = DeterministicRng::new(9);
        let mut witness = rng.clone();
        let mut empty: [u8; 0] = [];
        rng.shuffle(&mut empty);
        assert_eq!(rng.next(), witness.next());
    }

    #[test]
    fn clone_branches_into_independent_sequences() {
        let mut original = DeterministicRng::new(31_337);
        original.next();
        let mut branched = original.clone();
        assert_eq!(original.state(), branched.state());
        original.next();
        assert_ne!(original.state(), branched.state());
        branched.next();
        assert_eq!(original.state(), branched.state());
    }

    #[test]
    fn state_checkpoint_replays_the_same_draws() {
        let mut rng = DeterministicRng::new(8_080);
        rng.next();
        let checkpoint = rng.state();
        let ahead = [rng.next(), rng.next(), rng.next()];
        rng.set_state(checkpoint);
        assert_eq!([rng.next(), rng.next(), rng.next()], ahead);
    }

    #[test]
    fn set_state_remaps_zero() {
        let mut rng = DeterministicRng::new(5);
        rng.set_state(0);
        assert_eq!(rng.state(), 1);
    }

    #[test]
    fn serde_round_trip_resumes_the_sequence() {
        let mut rng = DeterministicRng::new(42);
        for _ in 0..100 {
            rng.next();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: DeterministicRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next(), restored.next());
        }
    }

    #[test]
    fn deserializing_a_zero_state_applies_the_remap() {
        let restored: DeterministicRng = serde_json::from_str(r#"{"state":0}"#).unwrap();
        assert_eq!(restored.state(), 1);
    }

    #[test]
    fn fresh_instances_agree_on_the_first_draws_for_seed_42() {
        let first: Vec<f64> = {
            let mut rng = DeterministicRng::new(42);
            (0..3).map(|_| rng.next()).collect()
        };
        let second: Vec<f64> = {
            let mut rng = DeterministicRng::new(42);
            (0..3).map(|_| rng.next()).collect()
        };
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (0.0..1.0).contains(v)));
    }
}
