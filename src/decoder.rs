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

use std::fmt;

/// The only problem-specific code a user of this crate supplies: a mapping
/// from a chromosome (a length-`n` vector of random keys) to a fitness
/// scalar. Lower fitness is better.
///
/// `decode` takes `&mut [f64]` so implementations that want to normalize or
/// otherwise touch the chromosome in place can do so; the engine carries the
/// mutation forward into the population's stored chromosome. Implementations
/// that never mutate simply ignore the exclusive access.
///
/// When `T > 1` in the engine's hyperparameters, `decode` is invoked from
/// multiple worker threads concurrently on distinct chromosome buffers, so
/// the decoder must be `Sync`. With `T == 1` the engine never spawns workers
/// and this bound is not required on the call path (though the trait itself
/// always requires it, since the engine is generic over one decoder type
/// regardless of the configured thread count).
pub trait Decoder: Sync {
    /// Problem-specific decode failure, e.g. an infeasible or malformed
    /// chromosome. Fatal for the in-flight `reset`/`evolve` call.
    type Error: fmt::Display + Send;

    fn decode(&self, chromosome: &mut [f64]) -> Result<f64, Self::Error>;
}
