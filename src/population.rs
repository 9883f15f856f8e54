/*
 * Copyright 2019 Zejun Li
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::error::{BrkgaError, Result};

pub type Chromosome = Vec<f64>;

/// Storage for `p` chromosomes of length `n`, plus the sorted fitness index
/// that makes the i-th best chromosome an O(1) lookup.
///
/// All public methods here require `rank` to already be sorted (a call to
/// [`Population::sort_rank`] beforehand). The engine is the only caller that
/// ever sees an unsorted `Population`, between `record_fitness` and
/// `sort_rank`; nothing outside this crate can reach the mutators that would
/// let a caller observe that window.
#[derive(Clone, Debug)]
pub struct Population {
    n: usize,
    p: usize,
    storage: Vec<Chromosome>,
    rank: Vec<(f64, usize)>,
}

impl Population {
    /// Allocates storage for `p` all-zero chromosomes of length `n` and a
    /// `rank` of `p` entries. Contents are undefined until the engine fills
    /// them; [`Population::sort_rank`] must run before any public getter is
    /// meaningful.
    pub(crate) fn new(n: usize, p: usize) -> Self {
        debug_assert!(n >= 1 && p >= 1);
        Population {
            n,
            p,
            storage: vec![vec![0.0; n]; p],
            rank: vec![(0.0, 0); p],
        }
    }

    pub fn size_n(&self) -> usize {
        self.n
    }

    pub fn size_p(&self) -> usize {
        self.p
    }

    /// Fitness of the i-th best chromosome, `i` in `[0, p)`.
    pub fn fitness_at(&self, i: usize) -> Result<f64> {
        self.check_index(i)?;
        Ok(self.rank[i].0)
    }

    /// Equivalent to `fitness_at(0)`.
    pub fn best_fitness(&self) -> f64 {
        self.rank[0].0
    }

    /// Read-only reference to the i-th best chromosome, `i` in `[0, p)`.
    pub fn chromosome_at(&self, i: usize) -> Result<&[f64]> {
        self.check_index(i)?;
        Ok(&self.storage[self.rank[i].1])
    }

    /// True if the i-th and j-th best chromosomes are allele-for-allele
    /// identical. Not part of the evolution path; a convenience for callers
    /// wanting to detect convergence.
    pub fn is_repeated(&self, i: usize, j: usize) -> Result<bool> {
        Ok(self.chromosome_at(i)? == self.chromosome_at(j)?)
    }

    fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.p {
            Err(BrkgaError::InvalidIndex(i, self.p))
        } else {
            Ok(())
        }
    }

    // --- engine-internal privileged interface -----------------------------

    /// Mutable access to physical slot `j` of `storage`, bypassing `rank`
    /// entirely. Only ever called by the engine while filling a generation,
    /// before `record_fitness`/`sort_rank` run for that slot.
    pub(crate) fn slot_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.storage[j]
    }

    pub(crate) fn slot(&self, j: usize) -> &[f64] {
        &self.storage[j]
    }

    /// Mutable access to a contiguous run of physical slots, for the
    /// parallel decode driver to split into disjoint per-worker chunks.
    pub(crate) fn storage_range_mut(&mut self, lo: usize, hi: usize) -> &mut [Chromosome] {
        &mut self.storage[lo..hi]
    }

    /// Sets `rank[j] := (f, j)`. Called exactly once per slot per
    /// generation before [`Population::sort_rank`]; leaves `rank` unsorted.
    pub(crate) fn record_fitness(&mut self, j: usize, f: f64) {
        self.rank[j] = (f, j);
    }

    /// Directly overwrites the fitness half of an already-ranked position,
    /// keeping its `slot_index` untouched. Used only by elite migration,
    /// where the physical chromosome at that rank position has just been
    /// overwritten from another population but the permutation invariant
    /// (R2) must survive until the next sort.
    pub(crate) fn set_rank_fitness(&mut self, rank_pos: usize, f: f64) {
        self.rank[rank_pos].0 = f;
    }

    pub(crate) fn rank_slot_index(&self, rank_pos: usize) -> usize {
        self.rank[rank_pos].1
    }

    /// Sorts `rank` ascending by `(fitness, slot_index)`, restoring R1.
    pub(crate) fn sort_rank(&mut self) {
        self.rank
            .sort_unstable_by(|a, b| a.partial_cmp(b).expect("fitness must not be NaN"));
    }

    #[cfg(test)]
    pub(crate) fn rank_permutation(&self) -> Vec<usize> {
        self.rank.iter().map(|&(_, idx)| idx).collect()
    }
}
