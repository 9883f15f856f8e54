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

use crate::decoder::Decoder;
#[cfg(feature = "rayon")]
use crate::error::BrkgaError;
use crate::error::{decoder_failed, Result};
use crate::population::Population;

/// A decode worker pool sized once at engine construction and reused for
/// every generation. Building a `rayon::ThreadPool` is not free, so this is
/// constructed exactly once per [`crate::Engine`] rather than per call.
#[cfg(feature = "rayon")]
pub(crate) struct DecodePool(Option<rayon::ThreadPool>);

#[cfg(feature = "rayon")]
impl DecodePool {
    /// `max_threads <= 1` stores no pool at all; decoding then runs serially
    /// on the calling thread with no pool overhead and no `Sync` traffic.
    pub(crate) fn new(max_threads: usize) -> Result<Self> {
        if max_threads <= 1 {
            return Ok(DecodePool(None));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .map_err(|e| {
                BrkgaError::Config(format!("failed to build decode thread pool: {}", e))
            })?;
        Ok(DecodePool(Some(pool)))
    }
}

#[cfg(not(feature = "rayon"))]
pub(crate) struct DecodePool;

#[cfg(not(feature = "rayon"))]
impl DecodePool {
    pub(crate) fn new(_max_threads: usize) -> Result<Self> {
        Ok(DecodePool)
    }
}

/// Invokes `decoder.decode` for every slot in `[lo, hi)` of `population`,
/// using `pool`'s workers, and records the resulting fitness at
/// `population.rank[i] := (f, i)` for each `i`.
///
/// Each `i` is visited exactly once; writes to distinct slots never alias.
/// The driver does not return until every `i` has finished, and the first
/// decoder error encountered (in slot order) aborts the whole call before
/// any partial result is recorded.
pub(crate) fn decode_range<D: Decoder>(
    population: &mut Population,
    decoder: &D,
    lo: usize,
    hi: usize,
    pool: &DecodePool,
) -> Result<()> {
    if lo == hi {
        return Ok(());
    }

    let results = decode_slice(population.storage_range_mut(lo, hi), decoder, pool);

    for (offset, result) in results.into_iter().enumerate() {
        let fitness = result.map_err(decoder_failed)?;
        population.record_fitness(lo + offset, fitness);
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn decode_slice<D: Decoder>(
    slice: &mut [Vec<f64>],
    decoder: &D,
    pool: &DecodePool,
) -> Vec<std::result::Result<f64, D::Error>> {
    use rayon::prelude::*;

    // No stored pool means max_threads <= 1: a serial sweep with no thread
    // crossing at all, so decoders used only with T = 1 never need to be
    // thread-safe in practice (the trait bound is still Sync, but nothing
    // ever crosses a thread boundary in this branch).
    match &pool.0 {
        None => slice.iter_mut().map(|c| decoder.decode(c)).collect(),
        Some(pool) => pool.install(|| slice.par_iter_mut().map(|c| decoder.decode(c)).collect()),
    }
}

#[cfg(not(feature = "rayon"))]
fn decode_slice<D: Decoder>(
    slice: &mut [Vec<f64>],
    decoder: &D,
    _pool: &DecodePool,
) -> Vec<std::result::Result<f64, D::Error>> {
    slice.iter_mut().map(|c| decoder.decode(c)).collect()
}
