//! Inference by enumeration.
//!
//! For every value `x` of the query variable, sums the full joint
//! `Π_v P(v | parents(v))` over every assignment of the hidden variables,
//! then normalizes over `x`. Exponential in the number of hidden variables;
//! kept as the reference the elimination engine is checked against.
//!
//! Operation counts:
//!
//! - each joint term costs `n - 1` multiplications (the first CPT factor is free),
//! - each term after the first, per query value, costs one addition,
//! - normalization costs one addition per query value after the first.

use log::debug;

use crate::error::Result;
use crate::network::Network;
use crate::query::{normalize, OpCount, Query, QueryResult};
use crate::utils::Odometer;

/// Answers `query` by brute-force enumeration.
pub fn enumerate(network: &Network, query: &Query) -> Result<QueryResult> {
    query.validate(network)?;

    let target = query.target();
    let hidden = query.hidden(network);
    let lengths = hidden
        .iter()
        .map(|&h| network.length_of(h))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "enumerate: target = {}, hidden = {:?}, terms per value = {}",
        target,
        hidden,
        lengths.iter().product::<usize>()
    );

    let mut assignment = vec![0; network.len()];
    for &(var, value) in query.evidence() {
        assignment[var.index()] = value;
    }

    let mut ops = OpCount::default();
    let mut probabilities = vec![0.0; network.length_of(target)?];
    let mut od = Odometer::new(lengths);

    for (value, acc) in probabilities.iter_mut().enumerate() {
        assignment[target.index()] = value;
        od.reset();
        let mut first = true;
        loop {
            for (&h, &digit) in hidden.iter().zip(od.digits()) {
                assignment[h.index()] = digit;
            }
            let term = joint(network, &assignment, &mut ops)?;
            if first {
                *acc = term;
                first = false;
            } else {
                *acc += term;
                ops.additions += 1;
            }
            if !od.advance() {
                break;
            }
        }
    }

    debug!("enumerate: unnormalized = {:?}", probabilities);

    let probability = normalize(&probabilities, query.value(), &mut ops)?;
    Ok(QueryResult::new(probability, ops))
}

/// Joint probability of a full assignment (indexed by variable key).
fn joint(network: &Network, assignment: &[usize], ops: &mut OpCount) -> Result<f64> {
    let mut product = 1.0;
    for (i, var) in network.ids().enumerate() {
        if i > 0 {
            ops.multiplications += 1;
        }
        product *= network.cpt_value(var, assignment)?;
    }
    Ok(product)
}
