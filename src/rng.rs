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

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The random-number capability the engine requires. Mutated only by the
/// owner thread (see the concurrency model): decode workers never touch it.
///
/// Implementors that wrap a non-reentrant generator do not need to be
/// `Sync`; the engine never shares this trait object across threads.
pub trait RandomSource {
    /// Construct a fresh generator from a 64-bit seed.
    fn new_seeded(seed: u64) -> Self
    where
        Self: Sized;

    /// A uniform deviate in `[0, 1)`.
    fn uniform01(&mut self) -> f64;

    /// A uniform integer in `[0, n]`, inclusive, with `n < 2^32`.
    fn uniform_int(&mut self, n: u32) -> u32;
}

/// Default seedable generator backing the engine when a caller has no
/// specific RNG of their own. Wraps [`rand::rngs::SmallRng`], the fast
/// non-cryptographic generator the sibling genetic-algorithm crates in
/// this ecosystem reach for in their inner loops.
pub struct DefaultRng {
    inner: SmallRng,
}

impl RandomSource for DefaultRng {
    fn new_seeded(seed: u64) -> Self {
        DefaultRng {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    fn uniform01(&mut self) -> f64 {
        self.inner.gen()
    }

    fn uniform_int(&mut self, n: u32) -> u32 {
        self.inner.gen_range(0..=n)
    }
}
