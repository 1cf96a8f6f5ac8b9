//! Subset-and-order encoding and its variation operators.
//!
//! An individual pairs a selection mask over the candidate pool with a
//! permutation of the whole pool. The realized tour is the selected members
//! in permutation order.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index::sample;

use crate::error::{PlanError, PlanResult};
use crate::traits::NodeId;

/// The fixed, ordered set of POIs eligible for a mission.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    members: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
}

impl CandidatePool {
    pub fn new(members: Vec<NodeId>) -> PlanResult<Self> {
        let mut index = HashMap::with_capacity(members.len());
        for (position, &node) in members.iter().enumerate() {
            if index.insert(node, position).is_some() {
                return Err(PlanError::DuplicatePoi(node));
            }
        }
        Ok(Self { members, index })
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of `node` in the pool.
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    /// Member at `position`, or `None` past the end of the pool.
    pub fn member(&self, position: usize) -> Option<NodeId> {
        self.members.get(position).copied()
    }
}

/// Selection mask plus visiting order, both indexed by pool position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    mask: Vec<bool>,
    order: Vec<usize>,
}

impl Individual {
    /// Builds an individual, rejecting masks or orders that do not match the pool.
    pub fn new(mask: Vec<bool>, order: Vec<usize>, pool: &CandidatePool) -> PlanResult<Self> {
        let individual = Self { mask, order };
        individual.validate(pool.len())?;
        Ok(individual)
    }

    /// Selects exactly `selection`, visiting it first in the given order.
    pub fn from_selection(selection: &[NodeId], pool: &CandidatePool) -> PlanResult<Self> {
        let mut mask = vec![false; pool.len()];
        let mut order = Vec::with_capacity(pool.len());
        for &node in selection {
            let position = pool.position(node).ok_or(PlanError::UnknownNode(node))?;
            if !mask[position] {
                mask[position] = true;
                order.push(position);
            }
        }
        order.extend((0..pool.len()).filter(|&position| !mask[position]));
        Ok(Self { mask, order })
    }

    /// Random order and random mask with at least one POI selected.
    pub fn random<R: Rng + ?Sized>(pool_len: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..pool_len).collect();
        order.shuffle(rng);
        let mut mask: Vec<bool> = (0..pool_len).map(|_| rng.gen_bool(0.5)).collect();
        if pool_len > 0 && !mask.contains(&true) {
            mask[rng.gen_range(0..pool_len)] = true;
        }
        Self { mask, order }
    }

    pub fn validate(&self, pool_len: usize) -> PlanResult<()> {
        if self.mask.len() != pool_len {
            return Err(PlanError::MaskLengthMismatch {
                expected: pool_len,
                actual: self.mask.len(),
            });
        }
        if !is_permutation(&self.order, pool_len) {
            return Err(PlanError::NotAPermutation { pool_size: pool_len });
        }
        Ok(())
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn selected_count(&self) -> usize {
        self.mask.iter().filter(|&&bit| bit).count()
    }

    /// Selected pool positions in visiting order.
    pub fn selected_positions(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&position| self.mask[position])
            .collect()
    }

    /// The realized tour: selected POIs in permutation order.
    pub fn decode(&self, pool: &CandidatePool) -> PlanResult<Vec<NodeId>> {
        self.validate(pool.len())?;
        Ok(self.decode_unchecked(pool))
    }

    pub(crate) fn decode_unchecked(&self, pool: &CandidatePool) -> Vec<NodeId> {
        self.order
            .iter()
            .filter(|&&position| self.mask[position])
            .filter_map(|&position| pool.member(position))
            .collect()
    }

    pub(crate) fn set_selected(&mut self, position: usize, selected: bool) {
        self.mask[position] = selected;
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &position in order {
        if position >= len || seen[position] {
            return false;
        }
        seen[position] = true;
    }
    true
}

/// Index of the fittest of `tournament_size` distinct, uniformly drawn individuals.
///
/// Ties go to the earlier draw.
pub fn tournament_select<R: Rng + ?Sized>(
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    if fitness.is_empty() {
        return 0;
    }
    let size = tournament_size.clamp(1, fitness.len());
    let mut winner: Option<usize> = None;
    for candidate in sample(rng, fitness.len(), size).iter() {
        if winner.is_none_or(|best| fitness[candidate] > fitness[best]) {
            winner = Some(candidate);
        }
    }
    winner.unwrap_or(0)
}

/// Swaps each mask position between the two children with probability 1/2.
pub fn uniform_crossover<R: Rng + ?Sized>(
    a: &[bool],
    b: &[bool],
    rng: &mut R,
) -> (Vec<bool>, Vec<bool>) {
    let mut first = a.to_vec();
    let mut second = b.to_vec();
    for i in 0..first.len().min(second.len()) {
        if rng.gen_bool(0.5) {
            std::mem::swap(&mut first[i], &mut second[i]);
        }
    }
    (first, second)
}

/// Order crossover with a random slice `[start, end]`.
pub fn order_crossover<R: Rng + ?Sized>(
    a: &[usize],
    b: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = a.len();
    if n < 2 {
        return (a.to_vec(), b.to_vec());
    }
    let cuts = sample(rng, n, 2);
    let (start, end) = {
        let (x, y) = (cuts.index(0), cuts.index(1));
        (x.min(y), x.max(y))
    };
    (
        order_crossover_slice(a, b, start, end),
        order_crossover_slice(b, a, start, end),
    )
}

/// Child keeping `keep[start..=end]` in place; the other positions are
/// filled from `fill` starting after `end`, wrapping around and skipping
/// members already placed.
///
/// # Panics
///
/// `keep` and `fill` must be permutations of `0..n` of the same length, and
/// `start <= end < n` unless both parents are empty.
pub fn order_crossover_slice(keep: &[usize], fill: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = keep.len();
    if n == 0 {
        return Vec::new();
    }
    let mut child = vec![usize::MAX; n];
    let mut placed = vec![false; n];
    for i in start..=end {
        child[i] = keep[i];
        placed[keep[i]] = true;
    }

    let mut slot = (end + 1) % n;
    for offset in 1..=n {
        let member = fill[(end + offset) % n];
        if placed[member] {
            continue;
        }
        child[slot] = member;
        placed[member] = true;
        slot = (slot + 1) % n;
    }
    child
}

/// Flips mask bits independently and swaps two order positions at most once.
pub fn mutate<R: Rng + ?Sized>(
    individual: &mut Individual,
    bit_rate: f64,
    swap_rate: f64,
    rng: &mut R,
) {
    for bit in individual.mask.iter_mut() {
        if rng.gen_bool(bit_rate) {
            *bit = !*bit;
        }
    }
    let n = individual.order.len();
    if n >= 2 && rng.gen_bool(swap_rate) {
        let picks = sample(rng, n, 2);
        individual.order.swap(picks.index(0), picks.index(1));
    }
}

/// Recombines two parents into two children.
pub fn crossover<R: Rng + ?Sized>(
    a: &Individual,
    b: &Individual,
    rng: &mut R,
) -> (Individual, Individual) {
    let (mask_a, mask_b) = uniform_crossover(&a.mask, &b.mask, rng);
    let (order_a, order_b) = order_crossover(&a.order, &b.order, rng);
    (
        Individual {
            mask: mask_a,
            order: order_a,
        },
        Individual {
            mask: mask_b,
            order: order_b,
        },
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn pool(n: usize) -> CandidatePool {
        CandidatePool::new((10..10 + n).collect()).unwrap()
    }

    #[test]
    fn test_pool_rejects_duplicates() {
        assert!(matches!(
            CandidatePool::new(vec![3, 4, 3]),
            Err(PlanError::DuplicatePoi(3))
        ));
    }

    #[test]
    fn test_pool_member_out_of_range() {
        let pool = pool(2);
        assert_eq!(pool.member(1), Some(11));
        assert_eq!(pool.member(2), None);
    }

    #[test]
    fn test_decode_keeps_permutation_order() {
        let pool = pool(4);
        let individual =
            Individual::new(vec![true, false, true, true], vec![3, 1, 0, 2], &pool).unwrap();
        assert_eq!(individual.decode(&pool).unwrap(), vec![13, 10, 12]);
        assert_eq!(individual.selected_positions(), vec![3, 0, 2]);
    }

    #[test]
    fn test_new_rejects_bad_encodings() {
        let pool = pool(3);
        assert!(matches!(
            Individual::new(vec![true, false], vec![0, 1, 2], &pool),
            Err(PlanError::MaskLengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            Individual::new(vec![true; 3], vec![0, 0, 2], &pool),
            Err(PlanError::NotAPermutation { pool_size: 3 })
        ));
    }

    #[test]
    fn test_decode_rejects_foreign_pool() {
        let individual = Individual::from_selection(&[10], &pool(2)).unwrap();
        assert!(individual.decode(&pool(3)).is_err());
    }

    #[test]
    fn test_from_selection_puts_selection_first() {
        let pool = pool(4);
        let individual = Individual::from_selection(&[12, 10], &pool).unwrap();
        assert_eq!(individual.order(), &[2, 0, 1, 3]);
        assert_eq!(individual.decode(&pool).unwrap(), vec![12, 10]);
        assert!(Individual::from_selection(&[99], &pool).is_err());
    }

    #[test]
    fn test_random_individual_selects_something() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let individual = Individual::random(5, &mut rng);
            assert!(individual.validate(5).is_ok());
            assert!(individual.selected_count() >= 1);
        }
        assert_eq!(Individual::random(0, &mut rng).selected_count(), 0);
    }

    #[test]
    fn test_order_crossover_known_slice() {
        let a = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let b = vec![7, 6, 5, 4, 3, 2, 1, 0];
        let child = order_crossover_slice(&a, &b, 2, 4);
        // Slice [2, 3, 4] stays; the rest follows b from position 5 on: 1, 0, 7, 6, 5.
        assert_eq!(child, vec![6, 5, 2, 3, 4, 1, 0, 7]);
    }

    #[test]
    fn test_order_crossover_whole_slice_copies_parent() {
        let a = vec![2, 0, 1];
        let b = vec![0, 1, 2];
        assert_eq!(order_crossover_slice(&a, &b, 0, 2), a);
    }

    #[test]
    fn test_order_crossover_of_empty_parents() {
        assert!(order_crossover_slice(&[], &[], 0, 0).is_empty());
    }

    #[test]
    fn test_tournament_picks_fittest_when_everyone_competes() {
        let mut rng = StdRng::seed_from_u64(1);
        let fitness = [1.0, 5.0, -3.0, 2.0];
        assert_eq!(tournament_select(&fitness, 4, &mut rng), 1);
        assert_eq!(tournament_select(&fitness, 10, &mut rng), 1);
    }

    #[test]
    fn test_mutation_keeps_encoding_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut individual = Individual::random(6, &mut rng);
        for _ in 0..50 {
            mutate(&mut individual, 0.3, 1.0, &mut rng);
            assert!(individual.validate(6).is_ok());
        }
    }

    #[test]
    fn test_full_bit_mutation_inverts_mask() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = pool(3);
        let mut individual = Individual::new(vec![true, false, true], vec![0, 1, 2], &pool).unwrap();
        mutate(&mut individual, 1.0, 0.0, &mut rng);
        assert_eq!(individual.mask(), &[false, true, false]);
        assert_eq!(individual.order(), &[0, 1, 2]);
    }
}
