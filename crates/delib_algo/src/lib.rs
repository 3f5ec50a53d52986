//! delib_algo — the Schulze Tabulator (spec §4.5).
//!
//! Pure function: from a set of total orderings over K candidates, returns
//! a winner index, the pairwise preference matrix, and the strongest-path
//! matrix. No I/O, no RNG, no async. Grounded on the teacher crate's
//! `ranked_condorcet` tabulator (`pairwise` accumulation + a Schulze
//! strongest-path closure + deterministic lowest-index tiebreak), adapted
//! from vote-count ballots to the one-ranking-per-voter shape this spec
//! needs and to the "winning votes" pairwise definition spec §4.5 specifies
//! directly (no margin-zeroing before the closure).

use std::collections::BTreeMap;

use delib_core::ids::{CandidateIndex, ParticipantPosition};
use delib_core::model::Ranking;

/// Outcome of one Schulze election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchulzeResult {
    pub winner: CandidateIndex,
    /// `pairwise[a][b]` = number of ballots that rank `a` ahead of `b`.
    pub pairwise: Vec<Vec<u64>>,
    /// `strongest[a][b]` = strength of the strongest path from `a` to `b`.
    pub strongest: Vec<Vec<u64>>,
}

/// Tabulate a Schulze election over `k` candidates from one total ordering
/// per voter. Deterministic: equal inputs always produce equal output
/// (spec §3 invariant, tested in `schulze::tests::deterministic_on_equal_input`).
///
/// # Panics
/// Panics if `k == 0`, or if any ranking's length differs from `k` — both
/// are caller bugs (`Ranking::new` already enforces the permutation
/// invariant per ballot; this function only combines already-valid ballots).
pub fn schulze(rankings: &BTreeMap<ParticipantPosition, Ranking>, k: usize) -> SchulzeResult {
    assert!(k > 0, "schulze: k must be positive");
    for ranking in rankings.values() {
        assert_eq!(ranking.len(), k, "schulze: ranking length must equal k");
    }

    let pairwise = build_pairwise(rankings, k);
    let strongest = strongest_paths(&pairwise, k);
    let winner = undominated_winner(&strongest, k);

    SchulzeResult {
        winner,
        pairwise,
        strongest,
    }
}

/// Pairwise step (spec §4.5): for each ranking, for every ordered pair
/// `(a, b)` where `a` precedes `b`, increment `pairwise[a][b]`.
pub fn build_pairwise(rankings: &BTreeMap<ParticipantPosition, Ranking>, k: usize) -> Vec<Vec<u64>> {
    let mut pairwise = vec![vec![0u64; k]; k];
    for ranking in rankings.values() {
        let order = ranking.order();
        for i in 0..order.len() {
            for j in (i + 1)..order.len() {
                let a = order[i].index();
                let b = order[j].index();
                pairwise[a][b] += 1;
            }
        }
    }
    pairwise
}

/// Strongest-path step (spec §4.5), the Floyd–Warshall max-min closure
/// applied directly to the pairwise matrix.
pub fn strongest_paths(pairwise: &[Vec<u64>], k: usize) -> Vec<Vec<u64>> {
    let mut strongest = vec![vec![0u64; k]; k];
    for i in 0..k {
        for j in 0..k {
            if i != j {
                strongest[i][j] = pairwise[i][j];
            }
        }
    }
    for kk in 0..k {
        for i in 0..k {
            if i == kk {
                continue;
            }
            for j in 0..k {
                if i == j || j == kk {
                    continue;
                }
                let via = strongest[i][kk].min(strongest[kk][j]);
                if via > strongest[i][j] {
                    strongest[i][j] = via;
                }
            }
        }
    }
    strongest
}

/// Candidate `i` is undominated iff for all `j != i`, `strongest[i][j] >=
/// strongest[j][i]`. Schulze's theorem guarantees this set is non-empty; we
/// assert that rather than silently defaulting to candidate 0 (spec §9: "We
/// tightened this... the implementation must assert this rather than fall
/// through"). Ties broken by lowest index (spec §3).
fn undominated_winner(strongest: &[Vec<u64>], k: usize) -> CandidateIndex {
    for i in 0..k {
        let is_undominated = (0..k).all(|j| i == j || strongest[i][j] >= strongest[j][i]);
        if is_undominated {
            return CandidateIndex::new(i as u32);
        }
    }
    unreachable!("schulze: undominated set must be non-empty by Schulze's theorem");
}

#[cfg(test)]
mod tests {
    use super::*;
    use delib_core::model::Ranking;
    use proptest::prelude::*;

    fn ranking(order: &[u32], k: usize) -> Ranking {
        Ranking::new(order.iter().map(|&i| CandidateIndex::new(i)).collect(), k, false).unwrap()
    }

    fn voters(rankings: Vec<(u32, Ranking)>) -> BTreeMap<ParticipantPosition, Ranking> {
        rankings
            .into_iter()
            .map(|(p, r)| (ParticipantPosition::new(p), r))
            .collect()
    }

    /// Turns each voter's row of draw keys into a permutation over `0..k` by
    /// argsorting the first `k` keys (most preferred = smallest key), then
    /// wraps the result as a `Ranking` per voter.
    fn voters_from_keys(voter_keys: &[Vec<u16>], k: usize) -> BTreeMap<ParticipantPosition, Ranking> {
        voter_keys
            .iter()
            .enumerate()
            .map(|(p, keys)| {
                let mut order: Vec<usize> = (0..k).collect();
                order.sort_by_key(|&i| keys[i]);
                let order = order.into_iter().map(|i| CandidateIndex::new(i as u32)).collect();
                let ranking = Ranking::new(order, k, false).unwrap();
                (ParticipantPosition::new(p as u32), ranking)
            })
            .collect()
    }

    /// Scenario S2: Condorcet singleton.
    #[test]
    fn condorcet_singleton() {
        let rankings = voters(vec![
            (0, ranking(&[0, 1, 2], 3)),
            (1, ranking(&[0, 2, 1], 3)),
            (2, ranking(&[1, 0, 2], 3)),
        ]);
        let result = schulze(&rankings, 3);
        assert_eq!(result.winner, CandidateIndex::new(0));
    }

    /// Scenario S3: three-cycle tie resolved by lowest-index tiebreak.
    #[test]
    fn three_cycle_tie_break() {
        let rankings = voters(vec![
            (0, ranking(&[0, 1, 2], 3)),
            (1, ranking(&[1, 2, 0], 3)),
            (2, ranking(&[2, 0, 1], 3)),
        ]);
        let result = schulze(&rankings, 3);
        assert_eq!(result.winner, CandidateIndex::new(0));
    }

    /// Scenario S1 ("classic five"): 1-based rankings from spec §8,
    /// converted to 0-based.
    #[test]
    fn classic_five() {
        let rankings = voters(vec![
            (0, ranking(&[1, 0, 2, 3], 4)), // P1: 2,1,3,4
            (1, ranking(&[1, 3, 2, 0], 4)), // P2: 2,4,3,1
            (2, ranking(&[1, 0, 2, 3], 4)), // P3: 2,1,3,4
            (3, ranking(&[0, 1, 2, 3], 4)), // P4: 1,2,3,4
            (4, ranking(&[1, 3, 2, 0], 4)), // P5: 2,4,3,1
        ]);
        let result = schulze(&rankings, 4);
        assert_eq!(result.winner, CandidateIndex::new(1)); // candidate 2 (1-based)
    }

    #[test]
    fn deterministic_on_equal_input() {
        let rankings = voters(vec![
            (0, ranking(&[0, 1, 2], 3)),
            (1, ranking(&[1, 2, 0], 3)),
            (2, ranking(&[2, 0, 1], 3)),
        ]);
        let a = schulze(&rankings, 3);
        let b = schulze(&rankings, 3);
        assert_eq!(a, b);
    }

    proptest! {
        /// Whenever some candidate beats every other candidate pairwise, the
        /// Schulze winner must be that candidate, regardless of how the rest
        /// of the ballots are shaped.
        #[test]
        fn condorcet_winner_criterion_property(
            k in 2usize..6,
            voter_keys in prop::collection::vec(prop::collection::vec(0u16..1000, 6), 1usize..10),
        ) {
            let rankings = voters_from_keys(&voter_keys, k);
            let result = schulze(&rankings, k);

            for c in 0..k {
                let beats_everyone =
                    (0..k).all(|j| j == c || result.pairwise[c][j] > result.pairwise[j][c]);
                if beats_everyone {
                    prop_assert_eq!(result.winner, CandidateIndex::new(c as u32));
                }
            }
        }
    }
}
