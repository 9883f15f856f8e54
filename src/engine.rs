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

use log::{debug, trace};

use crate::decode;
use crate::decoder::Decoder;
use crate::error::{BrkgaError, Result};
use crate::params::{CanonicalParams, Params};
use crate::population::Population;
use crate::rng::RandomSource;

/// Holds `K` coevolving populations and orchestrates initialization, one-
/// generation evolution, elite migration, full reset, and best-across-all
/// queries.
///
/// The engine itself is single-threaded: `evolve`, `reset`, `exchange_elite`
/// and the queries are meant to be called by one owner thread and must not
/// be invoked concurrently with themselves or each other on the same
/// instance. Decoding within a generation fans out across the `max_threads`-
/// sized worker pool built once at construction and rejoins before the sort,
/// so external observers only ever see the serial owner-thread timeline.
pub struct Engine<D: Decoder, R: RandomSource> {
    params: CanonicalParams,
    decoder: D,
    rng: R,
    current: Vec<Population>,
    previous: Vec<Population>,
    decode_pool: decode::DecodePool,
}

impl<D: Decoder, R: RandomSource> Engine<D, R> {
    /// Validates `params`, then initializes `K` populations with fresh
    /// random keys decoded through `decoder`. `previous[k]` is seeded as a
    /// copy of `current[k]` so the first `evolve` call's buffer swap is
    /// well-defined. The decode worker pool is built once here and reused
    /// for every subsequent `evolve`/`reset` call.
    pub fn new(params: Params, decoder: D, seed: u64) -> Result<Self> {
        let canon = params.canonicalize()?;
        let decode_pool = decode::DecodePool::new(canon.max_threads)?;
        let mut rng = R::new_seeded(seed);

        let mut current: Vec<Population> = (0..canon.k)
            .map(|_| Population::new(canon.n, canon.p))
            .collect();
        for pop in current.iter_mut() {
            Self::initialize_population(&canon, &decode_pool, &mut rng, &decoder, pop)?;
        }
        let previous = current.clone();

        debug!(
            "BRKGA engine constructed: n={} p={} pe={} pm={} K={} T={}",
            canon.n, canon.p, canon.pe, canon.pm, canon.k, canon.max_threads
        );

        Ok(Engine {
            params: canon,
            decoder,
            rng,
            current,
            previous,
            decode_pool,
        })
    }

    /// Reinitializes every population with brand-new random keys. Equivalent
    /// to the work the constructor performs, minus (re-)validating `params`
    /// and rebuilding the decode pool.
    pub fn reset(&mut self) -> Result<()> {
        for k in 0..self.params.k {
            Self::initialize_population(
                &self.params,
                &self.decode_pool,
                &mut self.rng,
                &self.decoder,
                &mut self.current[k],
            )?;
            self.previous[k] = self.current[k].clone();
        }
        debug!("reset {} population(s)", self.params.k);
        Ok(())
    }

    fn initialize_population(
        params: &CanonicalParams,
        pool: &decode::DecodePool,
        rng: &mut R,
        decoder: &D,
        pop: &mut Population,
    ) -> Result<()> {
        for j in 0..params.p {
            let slot = pop.slot_mut(j);
            for allele in slot.iter_mut() {
                *allele = rng.uniform01();
            }
        }
        decode::decode_range(pop, decoder, 0, params.p, pool)?;
        pop.sort_rank();
        Ok(())
    }

    /// Runs `generations` generations on every population. Each generation,
    /// for every population: elite carry-over, biased crossover, mutant
    /// injection, parallel decode of the non-elite tier, and a sort — then
    /// the `current`/`previous` buffers are swapped before the next
    /// generation begins.
    pub fn evolve(&mut self, generations: u32) -> Result<()> {
        if generations == 0 {
            return Err(BrkgaError::Config(
                "evolve requires generations >= 1".into(),
            ));
        }

        for _ in 0..generations {
            for k in 0..self.params.k {
                Self::evolve_step(
                    &self.params,
                    &self.decode_pool,
                    &mut self.rng,
                    &self.decoder,
                    &self.current[k],
                    &mut self.previous[k],
                )?;
                std::mem::swap(&mut self.current[k], &mut self.previous[k]);
            }
        }
        trace!("evolved {} generation(s)", generations);
        Ok(())
    }

    fn evolve_step(
        params: &CanonicalParams,
        pool: &decode::DecodePool,
        rng: &mut R,
        decoder: &D,
        src: &Population,
        dst: &mut Population,
    ) -> Result<()> {
        let (n, p, pe, pm) = (params.n, params.p, params.pe, params.pm);

        // Elite carry-over: the pe best chromosomes survive untouched, and
        // their fitness is propagated without re-decoding.
        for i in 0..pe {
            let src_slot = src.rank_slot_index(i);
            dst.slot_mut(i).copy_from_slice(src.slot(src_slot));
            dst.record_fitness(i, src.fitness_at(i)?);
        }

        // Crossover offspring: pe..(p - pm).
        for i in pe..(p - pm) {
            let elite_rank = rng.uniform_int((pe - 1) as u32) as usize;
            let nonelite_rank = pe + rng.uniform_int((p - pe - 1) as u32) as usize;
            let elite_slot = src.rank_slot_index(elite_rank);
            let nonelite_slot = src.rank_slot_index(nonelite_rank);

            for a in 0..n {
                let from_elite = rng.uniform01() < params.rho_e;
                let allele = if from_elite {
                    src.slot(elite_slot)[a]
                } else {
                    src.slot(nonelite_slot)[a]
                };
                dst.slot_mut(i)[a] = allele;
            }
        }

        // Mutants: (p - pm)..p, fresh random keys bypassing crossover.
        for i in (p - pm)..p {
            let slot = dst.slot_mut(i);
            for allele in slot.iter_mut() {
                *allele = rng.uniform01();
            }
        }

        // Decode the non-elite tier in parallel, then restore R1.
        decode::decode_range(dst, decoder, pe, p, pool)?;
        dst.sort_rank();
        Ok(())
    }

    /// Migrates `M` elites from every other population into each
    /// population's worst slots. Requires `K >= 2` and `1 <= M` with
    /// `M * (K - 1) < p`, so every destination's replacement budget fits
    /// inside its population without the destination cursor underflowing.
    pub fn exchange_elite(&mut self, m: usize) -> Result<()> {
        let k = self.params.k;
        let p = self.params.p;

        if k < 2 {
            return Err(BrkgaError::Config(
                "exchange_elite requires at least two populations (K >= 2)".into(),
            ));
        }
        if m == 0 || m * (k - 1) >= p {
            return Err(BrkgaError::Config(format!(
                "M must satisfy 1 <= M and M*(K-1) < p; got M={}, K={}, p={}",
                m, k, p
            )));
        }

        for i in 0..k {
            let mut dest = p - 1;
            for j in 0..k {
                if j == i {
                    continue;
                }
                for mm in 0..m {
                    let incoming: Vec<f64> = self.current[j].chromosome_at(mm)?.to_vec();
                    let incoming_fitness = self.current[j].fitness_at(mm)?;

                    let dest_slot = self.current[i].rank_slot_index(dest);
                    self.current[i]
                        .slot_mut(dest_slot)
                        .copy_from_slice(&incoming);
                    self.current[i].set_rank_fitness(dest, incoming_fitness);

                    dest -= 1;
                }
            }
        }

        for pop in self.current.iter_mut() {
            pop.sort_rank();
        }
        debug!("exchanged {} elite(s) across {} population(s)", m, k);
        Ok(())
    }

    /// Minimum fitness across all `K` populations.
    pub fn best_fitness(&self) -> f64 {
        self.current
            .iter()
            .map(|pop| pop.best_fitness())
            .fold(f64::INFINITY, f64::min)
    }

    /// Chromosome of the population achieving [`Engine::best_fitness`];
    /// ties go to the lowest population index.
    pub fn best_chromosome(&self) -> &[f64] {
        let mut best_k = 0;
        for k in 1..self.current.len() {
            if self.current[k].best_fitness() < self.current[best_k].best_fitness() {
                best_k = k;
            }
        }
        self.current[best_k]
            .chromosome_at(0)
            .expect("every non-empty population has a best chromosome")
    }

    /// Read-only access to population `k`'s current generation.
    pub fn population(&self, k: usize) -> Result<&Population> {
        self.current
            .get(k)
            .ok_or_else(|| BrkgaError::InvalidIndex(k, self.current.len()))
    }

    pub fn n(&self) -> usize {
        self.params.n
    }

    pub fn p(&self) -> usize {
        self.params.p
    }

    pub fn pe(&self) -> usize {
        self.params.pe
    }

    pub fn pm(&self) -> usize {
        self.params.pm
    }

    /// Derived count of non-elite, non-mutant slots: `p - pe - pm`.
    pub fn po(&self) -> usize {
        self.params.po()
    }

    pub fn rho_e(&self) -> f64 {
        self.params.rho_e
    }

    pub fn k(&self) -> usize {
        self.params.k
    }

    pub fn max_threads(&self) -> usize {
        self.params.max_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SetSize;
    use crate::rng::DefaultRng;
    use std::convert::Infallible;

    /// f(x) = sum_i (i+1) * x_i, a weighted-sum decoder with a known
    /// minimum (the all-zero chromosome) to drive convergence checks.
    struct WeightedSumDecoder;

    impl Decoder for WeightedSumDecoder {
        type Error = Infallible;

        fn decode(&self, chromosome: &mut [f64]) -> std::result::Result<f64, Self::Error> {
            Ok(chromosome
                .iter()
                .enumerate()
                .map(|(i, x)| (i + 1) as f64 * x)
                .sum())
        }
    }

    /// Routes the engine's `log` output through `env_logger` so `RUST_LOG=debug
    /// cargo test -- --nocapture` shows generation/reset/migration events.
    /// Safe to call from multiple tests; `try_init` ignores a second call.
    fn init_logging() {
        let _ = env_logger::try_init();
    }

    fn weighted_sum_params(p: usize, pe: usize, pm: usize, k: usize) -> Params {
        Params {
            n: 10,
            p,
            pe: SetSize::Count(pe),
            pm: SetSize::Count(pm),
            rho_e: 0.7,
            k,
            max_threads: 1,
        }
    }

    #[test]
    fn construction_rejects_pe_plus_pm_over_p() {
        let params = weighted_sum_params(10, 8, 5, 1);
        let result = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0);
        assert!(result.is_err());
    }

    #[test]
    fn evolve_zero_generations_is_an_error() {
        let params = weighted_sum_params(20, 4, 2, 1);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        assert!(engine.evolve(0).is_err());
    }

    #[test]
    fn best_fitness_is_monotone_non_increasing() {
        let params = weighted_sum_params(20, 4, 2, 1);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        let mut prev = engine.best_fitness();
        for _ in 0..50 {
            engine.evolve(1).unwrap();
            let curr = engine.best_fitness();
            assert!(curr <= prev, "fitness regressed: {} -> {}", prev, curr);
            prev = curr;
        }
    }

    #[test]
    fn sum_of_weights_scenario_reaches_low_fitness() {
        init_logging();
        let params = weighted_sum_params(100, 10, 10, 3);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        for gen in 1..=1000u32 {
            engine.evolve(1).unwrap();
            if gen % 100 == 0 {
                engine.exchange_elite(2).unwrap();
            }
            for k in 0..engine.k() {
                let pop = engine.population(k).unwrap();
                let mut perm = pop.rank_permutation();
                perm.sort_unstable();
                assert_eq!(perm, (0..pop.size_p()).collect::<Vec<_>>());
            }
        }
        assert!(engine.best_fitness() < 5.0, "got {}", engine.best_fitness());
    }

    #[test]
    fn all_alleles_are_produced_in_unit_interval_after_reset() {
        let params = weighted_sum_params(20, 4, 2, 1);
        let engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        let pop = engine.population(0).unwrap();
        for i in 0..pop.size_p() {
            for &allele in pop.chromosome_at(i).unwrap() {
                assert!((0.0..1.0).contains(&allele));
            }
        }
    }

    #[test]
    fn exchange_elite_requires_at_least_two_populations() {
        let params = weighted_sum_params(20, 4, 2, 1);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        assert!(engine.exchange_elite(1).is_err());
    }

    #[test]
    fn exchange_elite_rejects_oversized_m() {
        let params = weighted_sum_params(10, 2, 2, 2);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        // M * (K-1) = 10 * 1 >= p = 10.
        assert!(engine.exchange_elite(10).is_err());
    }

    #[test]
    fn migration_lands_elites_in_the_other_population() {
        init_logging();
        let params = weighted_sum_params(10, 3, 2, 2);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        engine.evolve(5).unwrap();

        let elites_of_0: Vec<Vec<f64>> = (0..2)
            .map(|i| engine.population(0).unwrap().chromosome_at(i).unwrap().to_vec())
            .collect();
        let elites_of_1: Vec<Vec<f64>> = (0..2)
            .map(|i| engine.population(1).unwrap().chromosome_at(i).unwrap().to_vec())
            .collect();

        engine.exchange_elite(2).unwrap();

        let pop0: Vec<Vec<f64>> = (0..10)
            .map(|i| engine.population(0).unwrap().chromosome_at(i).unwrap().to_vec())
            .collect();
        let pop1: Vec<Vec<f64>> = (0..10)
            .map(|i| engine.population(1).unwrap().chromosome_at(i).unwrap().to_vec())
            .collect();

        for elite in &elites_of_1 {
            assert!(pop0.contains(elite), "elite of pop1 missing from pop0");
        }
        for elite in &elites_of_0 {
            assert!(pop1.contains(elite), "elite of pop0 missing from pop1");
        }
    }

    #[test]
    fn evolve_batched_matches_evolve_looped() {
        let mut batched = Engine::<_, DefaultRng>::new(
            weighted_sum_params(20, 4, 2, 1),
            WeightedSumDecoder,
            123,
        )
        .unwrap();
        let mut looped = Engine::<_, DefaultRng>::new(
            weighted_sum_params(20, 4, 2, 1),
            WeightedSumDecoder,
            123,
        )
        .unwrap();

        batched.evolve(5).unwrap();
        for _ in 0..5 {
            looped.evolve(1).unwrap();
        }

        assert_eq!(batched.best_fitness(), looped.best_fitness());
        assert_eq!(batched.best_chromosome(), looped.best_chromosome());
    }

    #[test]
    fn reset_changes_best_fitness() {
        let params = weighted_sum_params(20, 4, 2, 1);
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        engine.evolve(20).unwrap();
        let evolved_best = engine.best_fitness();
        engine.reset().unwrap();
        assert_ne!(engine.best_fitness(), evolved_best);
    }

    #[test]
    fn single_allele_chromosome_boundary() {
        // n = 1: crossover reduces to a Bernoulli trial.
        let params = Params {
            n: 1,
            p: 2,
            pe: SetSize::Count(1),
            pm: SetSize::Count(0),
            rho_e: 0.7,
            k: 1,
            max_threads: 1,
        };
        let mut engine = Engine::<_, DefaultRng>::new(params, WeightedSumDecoder, 0).unwrap();
        engine.evolve(10).unwrap();
        assert_eq!(engine.n(), 1);
    }
}
