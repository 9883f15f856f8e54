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

//! A Biased Random-Key Genetic Algorithm (BRKGA) core: a reusable
//! black-box optimizer for combinatorial minimization problems in which
//! candidate solutions are encoded as fixed-length vectors of random keys
//! in `[0,1)` and a user-supplied [`Decoder`] maps each such vector to a
//! fitness scalar.
//!
//! The crate maintains one or more coevolving populations, advances them
//! through elitism, biased uniform crossover, and mutant injection, and
//! exposes the best solutions found. It does not ship any concrete
//! decoder, command-line driver, or instance-file reader; those are
//! problem-specific and live outside this crate.

mod decode;
mod decoder;
mod engine;
mod error;
mod params;
mod population;
mod rng;

pub use decoder::Decoder;
pub use engine::Engine;
pub use error::{BrkgaError, Result};
pub use params::{Params, SetSize};
pub use population::{Chromosome, Population};
pub use rng::{DefaultRng, RandomSource};
