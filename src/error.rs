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

use quick_error::quick_error;

quick_error! {
    /// Every error the engine can surface: bad hyperparameters at
    /// construction or call time, out-of-range queries, and decoder
    /// failures propagated out of the decode phase.
    #[derive(Debug)]
    pub enum BrkgaError {
        Config(msg: String) {
            display("invalid BRKGA configuration: {}", msg)
        }
        InvalidIndex(index: usize, bound: usize) {
            display("index {} out of range, population has {} slots", index, bound)
        }
        Decoder(msg: String) {
            display("decoder failed: {}", msg)
        }
    }
}

pub type Result<T> = std::result::Result<T, BrkgaError>;

/// Wraps a decoder-reported error into [`BrkgaError::Decoder`] so the
/// parallel decode driver can carry arbitrary decoder error types out of
/// a rayon scope without a generic error parameter leaking through the
/// whole engine.
pub(crate) fn decoder_failed<E: fmt::Display>(err: E) -> BrkgaError {
    BrkgaError::Decoder(err.to_string())
}
