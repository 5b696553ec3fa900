//! Queries, results and operation bookkeeping.

use std::fmt;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::types::VarId;

/// Inference algorithm used to answer a [`Query`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Algorithm {
    /// Brute-force summation over every hidden assignment.
    Enumeration,
    /// Variable elimination, hidden variables eliminated in name order.
    EliminationLexical,
    /// Variable elimination, smallest created factor first.
    EliminationMinFill,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::Enumeration,
        Algorithm::EliminationLexical,
        Algorithm::EliminationMinFill,
    ];

    /// Maps the numeric selector used in query scripts (`1`, `2`, `3`).
    pub fn from_selector(selector: u32) -> Result<Self> {
        match selector {
            1 => Ok(Algorithm::Enumeration),
            2 => Ok(Algorithm::EliminationLexical),
            3 => Ok(Algorithm::EliminationMinFill),
            _ => Err(Error::InvalidQuery(format!(
                "unknown algorithm selector {}",
                selector
            ))),
        }
    }

    pub fn selector(self) -> u32 {
        match self {
            Algorithm::Enumeration => 1,
            Algorithm::EliminationLexical => 2,
            Algorithm::EliminationMinFill => 3,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Enumeration => "enumeration",
            Algorithm::EliminationLexical => "elimination-lexical",
            Algorithm::EliminationMinFill => "elimination-minfill",
        };
        f.write_str(name)
    }
}

/// `P(target = value | evidence)`, answered with a given [`Algorithm`].
///
/// Structural checks (evidence on the target, repeated evidence keys) happen
/// in [`Query::new`]; range checks against a concrete network happen in
/// [`Query::validate`], which every engine calls before touching a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    target: VarId,
    value: usize,
    evidence: Vec<(VarId, usize)>,
    algorithm: Algorithm,
}

impl Query {
    pub fn new(
        target: VarId,
        value: usize,
        evidence: impl IntoIterator<Item = (VarId, usize)>,
        algorithm: Algorithm,
    ) -> Result<Self> {
        let evidence: Vec<(VarId, usize)> = evidence.into_iter().collect();
        for (i, &(var, _)) in evidence.iter().enumerate() {
            if var == target {
                return Err(Error::InvalidQuery(format!(
                    "query variable {} appears in the evidence",
                    var
                )));
            }
            if evidence[..i].iter().any(|&(other, _)| other == var) {
                return Err(Error::InvalidQuery(format!(
                    "evidence variable {} given twice",
                    var
                )));
            }
        }
        Ok(Self {
            target,
            value,
            evidence,
            algorithm,
        })
    }

    pub fn target(&self) -> VarId {
        self.target
    }

    pub fn value(&self) -> usize {
        self.value
    }

    /// Evidence pairs, in the order given.
    pub fn evidence(&self) -> &[(VarId, usize)] {
        &self.evidence
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn is_evidence(&self, var: VarId) -> bool {
        self.evidence.iter().any(|&(v, _)| v == var)
    }

    /// Checks every key and value index against `network`.
    pub fn validate(&self, network: &Network) -> Result<()> {
        network.check_value(self.target, self.value)?;
        for &(var, value) in &self.evidence {
            network.check_value(var, value)?;
        }
        Ok(())
    }

    /// Per-variable pinned values: `Some(value)` for evidence, `None` otherwise.
    pub fn pinned(&self, network: &Network) -> Vec<Option<usize>> {
        let mut pinned = vec![None; network.len()];
        for &(var, value) in &self.evidence {
            pinned[var.index()] = Some(value);
        }
        pinned
    }

    /// Variables that are neither the target nor evidence, in network order.
    pub fn hidden(&self, network: &Network) -> Vec<VarId> {
        network
            .ids()
            .filter(|&v| v != self.target && !self.is_evidence(v))
            .collect()
    }
}

/// Running count of arithmetic operations.
///
/// Every reduction follows the same rule: its first term is free, each
/// further combination costs one operation.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct OpCount {
    pub additions: u64,
    pub multiplications: u64,
}

/// Answer to a single query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QueryResult {
    pub probability: f64,
    pub additions: u64,
    pub multiplications: u64,
}

impl QueryResult {
    pub fn new(probability: f64, ops: OpCount) -> Self {
        Self {
            probability,
            additions: ops.additions,
            multiplications: ops.multiplications,
        }
    }
}

/// Returns `values[index] / Σ values`, charging one addition per term after the first.
pub fn normalize(values: &[f64], index: usize, ops: &mut OpCount) -> Result<f64> {
    let Some((&first, rest)) = values.split_first() else {
        return Err(Error::DegenerateNormalization);
    };
    let mut total = first;
    for &v in rest {
        total += v;
        ops.additions += 1;
    }
    if total == 0.0 {
        return Err(Error::DegenerateNormalization);
    }
    let numerator = values
        .get(index)
        .copied()
        .ok_or_else(|| Error::InvalidFactor(format!("index {} outside of {} values", index, values.len())))?;
    Ok(numerator / total)
}
