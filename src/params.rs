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

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BrkgaError, Result};

/// Elite-set / mutant-set size, given either as a fraction of the
/// population or as an absolute count. The canonical representation used
/// internally is always a count (see [`Params::canonicalize`]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetSize {
    Fraction(f64),
    Count(usize),
}

impl SetSize {
    fn as_count(self, p: usize) -> usize {
        match self {
            SetSize::Fraction(f) => (f * p as f64) as usize,
            SetSize::Count(n) => n,
        }
    }
}

impl From<usize> for SetSize {
    fn from(n: usize) -> Self {
        SetSize::Count(n)
    }
}

impl From<f64> for SetSize {
    fn from(f: f64) -> Self {
        SetSize::Fraction(f)
    }
}

/// Hyperparameters accepted at construction. `pe`/`pm` may be given as
/// fractions in `(0,1]`/`[0,1]` or as counts; [`Params::canonicalize`]
/// resolves them to counts and validates every cross-constraint between
/// them.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    /// Number of genes (alleles) in each chromosome.
    pub n: usize,
    /// Number of individuals in each population.
    pub p: usize,
    /// Elite-set size, as a fraction or a count.
    pub pe: SetSize,
    /// Mutant-set size, as a fraction or a count.
    pub pm: SetSize,
    /// Probability that an offspring allele is inherited from its elite
    /// parent rather than its non-elite parent.
    pub rho_e: f64,
    /// Number of independent, coevolving populations.
    pub k: usize,
    /// Maximum worker threads used to parallelize decoding.
    pub max_threads: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            n: 1,
            p: 1,
            pe: SetSize::Count(1),
            pm: SetSize::Count(0),
            rho_e: 0.7,
            k: 1,
            max_threads: 1,
        }
    }
}

/// Canonical, validated hyperparameters: `pe`/`pm` resolved to counts and
/// every cross-constraint between them checked.
#[derive(Copy, Clone, Debug)]
pub(crate) struct CanonicalParams {
    pub n: usize,
    pub p: usize,
    pub pe: usize,
    pub pm: usize,
    pub rho_e: f64,
    pub k: usize,
    pub max_threads: usize,
}

impl CanonicalParams {
    pub fn po(&self) -> usize {
        self.p - self.pe - self.pm
    }
}

impl Params {
    pub(crate) fn canonicalize(&self) -> Result<CanonicalParams> {
        if self.n == 0 {
            return Err(BrkgaError::Config("chromosome size n must be >= 1".into()));
        }
        if self.p == 0 {
            return Err(BrkgaError::Config("population size p must be >= 1".into()));
        }
        if self.k == 0 {
            return Err(BrkgaError::Config(
                "number of populations K must be >= 1".into(),
            ));
        }
        if self.max_threads == 0 {
            return Err(BrkgaError::Config("max_threads must be >= 1".into()));
        }

        let pe = self.pe.as_count(self.p);
        let pm = self.pm.as_count(self.p);

        if pe == 0 {
            return Err(BrkgaError::Config("elite-set size pe must be >= 1".into()));
        }
        if pe > self.p {
            return Err(BrkgaError::Config(
                "elite-set size pe greater than population size p".into(),
            ));
        }
        if pm > self.p {
            return Err(BrkgaError::Config(
                "mutant-set size pm greater than population size p".into(),
            ));
        }
        if pe + pm > self.p {
            return Err(BrkgaError::Config(
                "pe + pm greater than population size p".into(),
            ));
        }

        Ok(CanonicalParams {
            n: self.n,
            p: self.p,
            pe,
            pm,
            rho_e: self.rho_e,
            k: self.k,
            max_threads: self.max_threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Params {
        Params {
            n: 10,
            p: 20,
            pe: SetSize::Count(4),
            pm: SetSize::Count(2),
            rho_e: 0.7,
            k: 1,
            max_threads: 1,
        }
    }

    #[test]
    fn accepts_valid_counts() {
        assert!(base().canonicalize().is_ok());
    }

    #[test]
    fn accepts_fractions() {
        let mut params = base();
        params.pe = SetSize::Fraction(0.2);
        params.pm = SetSize::Fraction(0.1);
        let canon = params.canonicalize().unwrap();
        assert_eq!(canon.pe, 4);
        assert_eq!(canon.pm, 2);
    }

    #[test]
    fn rejects_pe_plus_pm_over_p() {
        let mut params = base();
        params.pe = SetSize::Count(15);
        params.pm = SetSize::Count(10);
        assert!(params.canonicalize().is_err());
    }

    #[test]
    fn rejects_zero_elite() {
        let mut params = base();
        params.pe = SetSize::Count(0);
        assert!(params.canonicalize().is_err());
    }

    #[test]
    fn rejects_zero_chromosome_length() {
        let mut params = base();
        params.n = 0;
        assert!(params.canonicalize().is_err());
    }

    #[test]
    fn po_is_the_remainder() {
        let canon = base().canonicalize().unwrap();
        assert_eq!(canon.po(), 20 - 4 - 2);
    }
}
