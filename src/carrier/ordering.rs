//! Key-derived ordering of payload bit slots.
//!
//! Eligible pixel-channels (outside the header, depth > 0) are shuffled with
//! a Fisher-Yates pass driven by ChaCha20 seeded from the ordering seed. The
//! swap index is drawn as `u32` so the permutation is identical on 32- and
//! 64-bit targets.
//!
//! The slot sequence is cut into `REDUNDANCY` equal lanes. Copy `k` of logical
//! bit `i` sits at position `k * lane + i`, so the copies of a bit land in
//! different pixel-channels and bit 0 and bit 1 of one sample carry unrelated
//! bits.

use crate::carrier::plan::{EmbeddingPlan, HEADER_CHANNELS};
use crate::config::REDUNDANCY;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// One writable bit: bit plane `bit` of pixel-channel `channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitSlot {
    pub channel: usize,
    pub bit: u8,
}

/// Deterministic permutation of the eligible pixel-channels.
#[derive(Debug, Clone)]
pub struct BitOrdering {
    channels: Vec<u32>,
}

impl BitOrdering {
    /// Shuffle the plan's eligible channels with the given seed.
    pub fn new(plan: &EmbeddingPlan, seed: &[u8; 32]) -> Self {
        let mut channels: Vec<u32> = (HEADER_CHANNELS..plan.channel_count())
            .filter(|&i| plan.depth(i) > 0)
            .map(|i| i as u32)
            .collect();

        let mut rng = ChaCha20Rng::from_seed(*seed);
        for i in (1..channels.len()).rev() {
            let j = rng.gen_range(0..=(i as u32)) as usize;
            channels.swap(i, j);
        }

        Self { channels }
    }

    /// Shuffled pixel-channel indices.
    pub fn channels(&self) -> &[u32] {
        &self.channels
    }

    /// Number of eligible pixel-channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Walk every slot in order: each channel yields bit 0, then bit 1 when
    /// its depth is 2.
    pub fn slots<'a>(&'a self, plan: &'a EmbeddingPlan) -> impl Iterator<Item = BitSlot> + 'a {
        self.channels.iter().flat_map(move |&c| {
            let channel = c as usize;
            (0..plan.depth(channel)).map(move |bit| BitSlot { channel, bit })
        })
    }

    /// Slots per copy lane. Also the number of logical bits the payload
    /// region can hold.
    pub fn lane_len(&self, plan: &EmbeddingPlan) -> usize {
        plan.raw_capacity_bits() / REDUNDANCY
    }

    /// The copy slots of each logical bit, in bit order.
    ///
    /// A pixel-channel covers at most two neighbouring positions, so copies a
    /// lane apart never share one once a lane is two slots long. Any plan
    /// that fits a single payload byte has lanes of at least eight.
    pub fn copies<'a>(
        &'a self,
        plan: &'a EmbeddingPlan,
    ) -> impl Iterator<Item = [BitSlot; REDUNDANCY]> + 'a {
        let lane = self.lane_len(plan);
        let first = self.slots(plan);
        let second = self.slots(plan).skip(lane);
        let third = self.slots(plan).skip(2 * lane);
        first
            .zip(second)
            .zip(third)
            .take(lane)
            .map(|((a, b), c)| [a, b, c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::PixelGrid;
    use crate::config::PlannerConfig;
    use std::collections::HashSet;

    fn textured_plan() -> EmbeddingPlan {
        let grid = PixelGrid::from_fn(48, 48, |x, y, c| {
            ((x * 37 + y * 91 + c as u32 * 13) % 11 * 23) as u8
        })
        .unwrap();
        EmbeddingPlan::compute(&grid, &PlannerConfig::default()).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let plan = textured_plan();
        let a = BitOrdering::new(&plan, &[42u8; 32]);
        let b = BitOrdering::new(&plan, &[42u8; 32]);
        assert_eq!(a.channels(), b.channels());
    }

    #[test]
    fn test_different_seeds_differ() {
        let plan = textured_plan();
        let a = BitOrdering::new(&plan, &[1u8; 32]);
        let b = BitOrdering::new(&plan, &[2u8; 32]);
        assert_ne!(a.channels(), b.channels());
    }

    #[test]
    fn test_is_permutation_of_eligible_channels() {
        let plan = textured_plan();
        let ordering = BitOrdering::new(&plan, &[7u8; 32]);

        let eligible: HashSet<u32> = (HEADER_CHANNELS..plan.channel_count())
            .filter(|&i| plan.depth(i) > 0)
            .map(|i| i as u32)
            .collect();
        let shuffled: HashSet<u32> = ordering.channels().iter().copied().collect();

        assert_eq!(ordering.len(), eligible.len());
        assert_eq!(shuffled, eligible);
    }

    #[test]
    fn test_slot_count_matches_capacity() {
        let plan = textured_plan();
        let ordering = BitOrdering::new(&plan, &[3u8; 32]);

        let slots: Vec<BitSlot> = ordering.slots(&plan).collect();
        assert_eq!(slots.len(), plan.raw_capacity_bits());

        let unique: HashSet<BitSlot> = slots.iter().copied().collect();
        assert_eq!(unique.len(), slots.len());
        assert!(slots.iter().all(|s| s.channel >= HEADER_CHANNELS && s.bit < 2));
    }

    #[test]
    fn test_copies_in_distinct_channels() {
        let plan = textured_plan();
        let ordering = BitOrdering::new(&plan, &[9u8; 32]);

        let copies: Vec<[BitSlot; REDUNDANCY]> = ordering.copies(&plan).collect();
        assert_eq!(copies.len(), ordering.lane_len(&plan));
        assert!(copies.len() * REDUNDANCY <= plan.raw_capacity_bits());

        for triple in &copies {
            let channels: HashSet<usize> = triple.iter().map(|s| s.channel).collect();
            assert_eq!(channels.len(), REDUNDANCY, "copies share a channel: {:?}", triple);
        }

        let all: HashSet<BitSlot> = copies.iter().flatten().copied().collect();
        assert_eq!(all.len(), copies.len() * REDUNDANCY);
    }

    #[test]
    fn test_copies_follow_lanes() {
        let plan = textured_plan();
        let ordering = BitOrdering::new(&plan, &[4u8; 32]);
        let lane = ordering.lane_len(&plan);
        let slots: Vec<BitSlot> = ordering.slots(&plan).collect();

        for (i, triple) in ordering.copies(&plan).enumerate().step_by(97) {
            assert_eq!(triple, [slots[i], slots[lane + i], slots[2 * lane + i]]);
        }
    }
}
