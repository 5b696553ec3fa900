//! Variable elimination.
//!
//! # Algorithm
//!
//! 1. **Relevant nodes.** Start from hidden ∪ {target} ∪ evidence and repeatedly
//!    drop any hidden variable that is not a parent of another remaining node
//!    (a barren leaf), until nothing changes. Barren leaves sum to one and
//!    cannot affect the answer.
//! 2. **Initial factors.** One factor per remaining node over `(node, parents...)`,
//!    with evidence pinned and removed from the scope. Fully pinned CPTs are
//!    constants and produce no factor.
//! 3. **Elimination.** Hidden variables are sorted by name, then repeatedly
//!    picked by an [`EliminationOrder`]. All factors mentioning the picked
//!    variable are joined (smallest table first, ties by the name of the first
//!    scope entry) and the variable is summed out. A result with more than one
//!    cell goes back into the pool where the first consumed factor was; a
//!    single-cell result is a constant and is dropped.
//! 4. **Answer.** The remaining factors, all over the target alone, are joined
//!    left to right and normalized.
//!
//! Dropping constants (fully pinned CPTs, single-cell sums) is safe because
//! they scale every value of the target equally and cancel in normalization.

use std::cmp::Ordering;

use log::debug;

use crate::error::{Error, Result};
use crate::factor::Factor;
use crate::network::Network;
use crate::query::{normalize, OpCount, Query, QueryResult};
use crate::types::VarId;

/// Policy choosing the next hidden variable to eliminate.
///
/// `hidden` is sorted by variable name and only ever shrinks; `factors` is the
/// current pool. The returned index is into `hidden`.
///
/// Any `Fn(&Network, &[VarId], &[Factor]) -> usize` is a policy:
///
/// ```
/// use bnet_rs::elimination::EliminationOrder;
/// use bnet_rs::factor::Factor;
/// use bnet_rs::network::Network;
/// use bnet_rs::types::VarId;
///
/// fn last(_: &Network, hidden: &[VarId], _: &[Factor]) -> usize {
///     hidden.len() - 1
/// }
/// let _policy: &dyn EliminationOrder = &last;
/// ```
pub trait EliminationOrder {
    fn choose(&self, network: &Network, hidden: &[VarId], factors: &[Factor]) -> usize;
}

impl<F> EliminationOrder for F
where
    F: Fn(&Network, &[VarId], &[Factor]) -> usize,
{
    fn choose(&self, network: &Network, hidden: &[VarId], factors: &[Factor]) -> usize {
        self(network, hidden, factors)
    }
}

/// Eliminates hidden variables in ascending name order.
#[derive(Debug, Default, Copy, Clone)]
pub struct Lexical;

impl EliminationOrder for Lexical {
    fn choose(&self, _network: &Network, _hidden: &[VarId], _factors: &[Factor]) -> usize {
        0
    }
}

/// Eliminates the variable whose elimination creates the smallest factor.
///
/// Ties go to the first candidate in name order.
#[derive(Debug, Default, Copy, Clone)]
pub struct MinFill;

impl EliminationOrder for MinFill {
    fn choose(&self, _network: &Network, hidden: &[VarId], factors: &[Factor]) -> usize {
        let mut best = 0;
        let mut best_size = usize::MAX;
        for (i, &h) in hidden.iter().enumerate() {
            let size = created_size(h, factors);
            if size < best_size {
                best = i;
                best_size = size;
            }
        }
        best
    }
}

/// Size of the factor produced by eliminating `var` from `factors`: the product
/// of domain sizes over the union of scopes mentioning `var`, without `var`.
pub fn created_size(var: VarId, factors: &[Factor]) -> usize {
    let mut seen: Vec<VarId> = Vec::new();
    let mut size = 1;
    for factor in factors.iter().filter(|f| f.contains(var)) {
        for (&v, &len) in factor.scope().iter().zip(factor.layout().lengths()) {
            if v != var && !seen.contains(&v) {
                seen.push(v);
                size *= len;
            }
        }
    }
    size
}

/// Splits the query's variables into the relevant node set and the hidden
/// variables still to eliminate, after removing barren leaves to a fixed point.
///
/// Both lists keep network order.
pub fn relevant_nodes(network: &Network, query: &Query) -> (Vec<VarId>, Vec<VarId>) {
    let mut hidden = query.hidden(network);
    let mut nodes = hidden.clone();
    nodes.push(query.target());
    nodes.extend(query.evidence().iter().map(|&(v, _)| v));

    while let Some(i) = hidden
        .iter()
        .position(|&h| !network.is_parent_within(h, &nodes))
    {
        let barren = hidden.remove(i);
        nodes.retain(|&n| n != barren);
        debug!("relevant_nodes: pruned barren {}", barren);
    }

    (nodes, hidden)
}

/// Answers `query` by variable elimination, using `order` to pick variables.
pub fn variable_elimination<O>(network: &Network, query: &Query, order: &O) -> Result<QueryResult>
where
    O: EliminationOrder + ?Sized,
{
    query.validate(network)?;

    let target = query.target();
    let name = move |v: VarId| network.variables()[v.index()].name();

    let (nodes, mut hidden) = relevant_nodes(network, query);
    let pinned = query.pinned(network);

    let mut factors = Vec::with_capacity(nodes.len());
    for &node in &nodes {
        if let Some(factor) = Factor::from_cpt(network, node, &pinned)? {
            factors.push(factor);
        }
    }

    hidden.sort_by(|&a, &b| name(a).cmp(name(b)));
    debug!(
        "variable_elimination: target = {}, hidden = {:?}, {} initial factors",
        target,
        hidden,
        factors.len()
    );

    let mut ops = OpCount::default();

    while !hidden.is_empty() {
        let i = order.choose(network, &hidden, &factors).min(hidden.len() - 1);
        let var = hidden.remove(i);

        let Some(first) = factors.iter().position(|f| f.contains(var)) else {
            debug!("variable_elimination: {} in no factor, skipped", var);
            continue;
        };

        let (mut group, rest): (Vec<Factor>, Vec<Factor>) =
            factors.into_iter().partition(|f| f.contains(var));
        factors = rest;

        group.sort_by(|a, b| {
            a.size().cmp(&b.size()).then_with(|| {
                match (a.scope().first(), b.scope().first()) {
                    (Some(&x), Some(&y)) => name(x).cmp(name(y)),
                    _ => Ordering::Equal,
                }
            })
        });

        debug!(
            "variable_elimination: eliminating {} ({}) from {} factors",
            name(var),
            var,
            group.len()
        );

        let mut group = group.into_iter();
        let Some(mut joined) = group.next() else {
            continue;
        };
        for factor in group {
            joined = joined.join(&factor, &mut ops);
        }
        let reduced = joined.eliminate(var, &mut ops)?;

        if reduced.size() > 1 {
            factors.insert(first, reduced);
        } else {
            debug!("variable_elimination: dropped constant {}", reduced);
        }
    }

    let mut pool = factors.into_iter();
    let Some(first) = pool.next() else {
        // Only a single-valued target can lose every factor.
        return if network.length_of(target)? == 1 {
            Ok(QueryResult::new(1.0, ops))
        } else {
            Err(Error::InvalidFactor(format!("no factor left over {}", target)))
        };
    };
    let last = pool.fold(first, |acc, f| acc.join(&f, &mut ops));

    if last.scope() != [target] {
        return Err(Error::InvalidFactor(format!(
            "final factor {} is not over {} alone",
            last, target
        )));
    }

    let probability = normalize(last.table(), query.value(), &mut ops)?;
    Ok(QueryResult::new(probability, ops))
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::enumeration::enumerate;
    use crate::query::Algorithm;

    fn alarm() -> Network {
        Network::from_xmlbif_str(include_str!("../demos/alarm_net.xml")).unwrap()
    }

    fn query(network: &Network, target: (&str, &str), evidence: &[(&str, &str)]) -> Query {
        let t = network.variable_key(target.0).unwrap();
        let tv = network.value_key(t, target.1).unwrap();
        let ev = evidence.iter().map(|&(name, label)| {
            let v = network.variable_key(name).unwrap();
            (v, network.value_key(v, label).unwrap())
        });
        Query::new(t, tv, ev, Algorithm::EliminationLexical).unwrap()
    }

    #[test]
    fn test_burglary_lexical() {
        let network = alarm();
        let q = query(&network, ("B", "T"), &[("J", "T"), ("M", "T")]);
        let result = variable_elimination(&network, &q, &Lexical).unwrap();
        assert!((result.probability - 0.284172).abs() < 1e-5);
        // A: (J x M) 1 + (. x A) 7 mults, 4 adds; E: 3 mults, 2 adds; final: 1 mult, 1 add
        assert_eq!(result.multiplications, 12);
        assert_eq!(result.additions, 7);
    }

    #[test]
    fn test_burglary_min_fill() {
        let network = alarm();
        let q = query(&network, ("B", "T"), &[("J", "T"), ("M", "T")]);
        let result = variable_elimination(&network, &q, &MinFill).unwrap();
        assert!((result.probability - 0.284172).abs() < 1e-5);
        assert_eq!(result.multiplications, 12);
        assert_eq!(result.additions, 7);
    }

    #[test]
    fn test_barren_leaves_pruned() {
        let network = alarm();
        let q = query(&network, ("A", "T"), &[("B", "T")]);
        let (nodes, hidden) = relevant_nodes(&network, &q);
        let e = network.variable_key("E").unwrap();
        let a = network.variable_key("A").unwrap();
        let b = network.variable_key("B").unwrap();
        assert_eq!(hidden, vec![e]);
        assert_eq!(nodes, vec![e, a, b]);

        let pruned = variable_elimination(&network, &q, &Lexical).unwrap();
        let full = enumerate(&network, &q).unwrap();
        assert!((pruned.probability - full.probability).abs() < 1e-12);
        assert!((pruned.probability - (0.95 * 0.002 + 0.94 * 0.998)).abs() < 1e-12);
    }

    #[test]
    fn test_pruning_reaches_fixed_point() {
        // Chain A -> B -> C -> D, query A: C and D both go, D first.
        let mut builder = Network::builder();
        let a = builder.variable("A", ["T", "F"]).unwrap();
        let b = builder.variable("B", ["T", "F"]).unwrap();
        let c = builder.variable("C", ["T", "F"]).unwrap();
        let d = builder.variable("D", ["T", "F"]).unwrap();
        builder.define(a, vec![], vec![0.3, 0.7]).unwrap();
        builder.define(b, vec![a], vec![0.6, 0.4, 0.1, 0.9]).unwrap();
        builder.define(c, vec![b], vec![0.5, 0.5, 0.2, 0.8]).unwrap();
        builder.define(d, vec![c], vec![0.9, 0.1, 0.4, 0.6]).unwrap();
        let network = builder.build().unwrap();

        let q = Query::new(a, 0, [(b, 1)], Algorithm::EliminationLexical).unwrap();
        let (nodes, hidden) = relevant_nodes(&network, &q);
        assert!(hidden.is_empty());
        assert_eq!(nodes, vec![a, b]);

        let result = variable_elimination(&network, &q, &MinFill).unwrap();
        let expected = 0.3 * 0.4 / (0.3 * 0.4 + 0.7 * 0.9);
        assert!((result.probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_created_size() {
        let f = Factor::new(vec![VarId::new(0), VarId::new(1)], vec![2, 3], vec![0.0; 6]).unwrap();
        let g = Factor::new(vec![VarId::new(1), VarId::new(2)], vec![3, 4], vec![0.0; 12]).unwrap();
        let h = Factor::new(vec![VarId::new(3)], vec![5], vec![0.0; 5]).unwrap();
        let factors = [f, g, h];
        assert_eq!(created_size(VarId::new(1), &factors), 8);
        assert_eq!(created_size(VarId::new(0), &factors), 3);
        assert_eq!(created_size(VarId::new(3), &factors), 1);
        assert_eq!(created_size(VarId::new(7), &factors), 1);
    }

    #[test]
    fn test_min_fill_prefers_small_factor() {
        let f = Factor::new(vec![VarId::new(0), VarId::new(1)], vec![2, 3], vec![0.0; 6]).unwrap();
        let g = Factor::new(vec![VarId::new(1), VarId::new(2)], vec![3, 4], vec![0.0; 12]).unwrap();
        let network = alarm();
        let hidden = [VarId::new(1), VarId::new(2), VarId::new(0)];
        // x1 -> 8, x2 -> 3, x0 -> 3: first minimum wins
        assert_eq!(MinFill.choose(&network, &hidden, &[f, g]), 1);
    }

    #[test]
    fn test_closure_policy() {
        let network = alarm();
        let q = query(&network, ("B", "T"), &[("J", "T"), ("M", "T")]);
        let last = |_: &Network, hidden: &[VarId], _: &[Factor]| hidden.len() - 1;
        let result = variable_elimination(&network, &q, &last).unwrap();
        assert!((result.probability - 0.284172).abs() < 1e-5);
    }
}
