//! Factor algebra for variable elimination.
//!
//! A [`Factor`] is a table over an ordered scope of variables, laid out with
//! the same mixed-radix [`Layout`] as the network's CPTs (first scope entry
//! fastest). Two operations are defined on it:
//!
//! - [`Factor::join`]: pointwise product over the union of both scopes.
//! - [`Factor::eliminate`]: sum out one variable.
//!
//! Both charge their arithmetic to an [`OpCount`]: the first term of the
//! whole operation is free, every further product or sum costs one.
//!
//! # Scope order
//!
//! `join(A, B)` has scope `A.scope` followed by the entries of `B.scope` not
//! already in `A`, in `B`'s order. The table layout follows from the scope, so
//! callers that compare factors must take the scope into account.

use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::query::OpCount;
use crate::types::VarId;
use crate::utils::Layout;

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    scope: Vec<VarId>,
    layout: Layout,
    table: Vec<f64>,
}

impl Factor {
    /// Creates a factor from its scope, the domain sizes of the scope
    /// entries (same order), and a table in layout order.
    pub fn new(scope: Vec<VarId>, lengths: Vec<usize>, table: Vec<f64>) -> Result<Self> {
        if scope.len() != lengths.len() {
            return Err(Error::InvalidFactor(format!(
                "{} scope entries but {} lengths",
                scope.len(),
                lengths.len()
            )));
        }
        for (i, v) in scope.iter().enumerate() {
            if scope[..i].contains(v) {
                return Err(Error::InvalidFactor(format!("{} repeated in scope", v)));
            }
        }
        let layout = Layout::new(lengths);
        if layout.size() != table.len() {
            return Err(Error::InvalidFactor(format!(
                "table has {} entries, layout needs {}",
                table.len(),
                layout.size()
            )));
        }
        Ok(Self { scope, layout, table })
    }

    /// Builds the factor of `var`'s CPT with evidence applied.
    ///
    /// The candidate scope is `(var, parents...)`. Every dimension pinned in
    /// `pinned` (indexed by variable key) is fixed to its value and removed
    /// from the scope. Returns `None` when nothing remains: a fully pinned
    /// CPT is a constant and contributes no factor.
    pub fn from_cpt(network: &Network, var: VarId, pinned: &[Option<usize>]) -> Result<Option<Self>> {
        let cpt = network.cpt(var)?;
        let cpt_layout = network.cpt_layout(var)?;
        let dims: Vec<VarId> = std::iter::once(var)
            .chain(network.parents_of(var)?.iter().copied())
            .collect();

        let mut digits = Vec::with_capacity(dims.len());
        let mut free = Vec::new();
        let mut scope = Vec::new();
        let mut lengths = Vec::new();
        for (i, &d) in dims.iter().enumerate() {
            match pinned.get(d.index()).copied().flatten() {
                Some(value) => digits.push(value),
                None => {
                    digits.push(0);
                    free.push(i);
                    scope.push(d);
                    lengths.push(cpt_layout.lengths()[i]);
                }
            }
        }

        if scope.is_empty() {
            debug!("from_cpt({}): fully pinned, skipped", var);
            return Ok(None);
        }

        let layout = Layout::new(lengths);
        let mut table = Vec::with_capacity(layout.size());
        let mut od = layout.odometer();
        loop {
            for (&pos, &digit) in free.iter().zip(od.digits()) {
                digits[pos] = digit;
            }
            table.push(cpt[cpt_layout.index(&digits)]);
            if !od.advance() {
                break;
            }
        }

        Ok(Some(Self { scope, layout, table }))
    }

    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    pub fn table(&self) -> &[f64] {
        &self.table
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of table cells.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.scope.contains(&var)
    }

    /// Value at a digit vector given in scope order.
    pub fn value(&self, digits: &[usize]) -> f64 {
        self.table[self.layout.index(digits)]
    }

    /// Pointwise product over the union of both scopes.
    ///
    /// Every cell after the first costs one multiplication.
    pub fn join(&self, other: &Factor, ops: &mut OpCount) -> Factor {
        let mut scope = self.scope.clone();
        let mut lengths = self.layout.lengths().to_vec();
        for (&v, &len) in other.scope.iter().zip(other.layout.lengths()) {
            if !scope.contains(&v) {
                scope.push(v);
                lengths.push(len);
            }
        }

        // `self` is a prefix of the joined scope.
        let positions_a: Vec<usize> = (0..self.scope.len()).collect();
        let positions_b: Vec<usize> = other
            .scope
            .iter()
            .map(|v| scope.iter().position(|s| s == v).unwrap_or_default())
            .collect();

        let layout = Layout::new(lengths);
        let mut table = Vec::with_capacity(layout.size());
        let mut od = layout.odometer();
        loop {
            let a = self.table[self.layout.index_via(&positions_a, od.digits())];
            let b = other.table[other.layout.index_via(&positions_b, od.digits())];
            if !table.is_empty() {
                ops.multiplications += 1;
            }
            table.push(a * b);
            if !od.advance() {
                break;
            }
        }

        debug!(
            "join({:?} x {:?}) -> {:?}, size = {}",
            self.scope,
            other.scope,
            scope,
            table.len()
        );

        Factor { scope, layout, table }
    }

    /// Sums `var` out of this factor.
    ///
    /// The remaining scope keeps its relative order. Each output cell adds
    /// `|var|` input cells spaced by the stride of `var`; the first addend is
    /// free, each further one costs one addition.
    pub fn eliminate(&self, var: VarId, ops: &mut OpCount) -> Result<Factor> {
        let pos = self
            .scope
            .iter()
            .position(|&v| v == var)
            .ok_or_else(|| Error::InvalidFactor(format!("{} is not in scope {:?}", var, self.scope)))?;

        let lengths = self.layout.lengths();
        let before: usize = lengths[..pos].iter().product();
        let len = lengths[pos];
        let after: usize = lengths[pos + 1..].iter().product();

        let mut scope = self.scope.clone();
        scope.remove(pos);
        let mut new_lengths = lengths.to_vec();
        new_lengths.remove(pos);

        let mut table = Vec::with_capacity(before * after);
        for k in 0..after {
            for j in 0..before {
                let base = k * before * len + j;
                let mut sum = self.table[base];
                for i in 1..len {
                    sum += self.table[base + i * before];
                    ops.additions += 1;
                }
                table.push(sum);
            }
        }

        debug!("eliminate({}) from {:?} -> {:?}", var, self.scope, scope);

        Ok(Factor {
            scope,
            layout: Layout::new(new_lengths),
            table,
        })
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f(")?;
        for (i, v) in self.scope.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")[{}]", self.table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const EPS: f64 = 1e-12;

    fn var(i: usize) -> VarId {
        VarId::new(i)
    }

    #[test]
    fn test_new_checks_layout() {
        assert!(Factor::new(vec![var(0)], vec![2], vec![0.5, 0.5]).is_ok());
        assert!(Factor::new(vec![var(0)], vec![2], vec![0.5]).is_err());
        assert!(Factor::new(vec![var(0), var(0)], vec![2, 2], vec![0.0; 4]).is_err());
        assert!(Factor::new(vec![var(0)], vec![2, 2], vec![0.0; 4]).is_err());
    }

    #[test]
    fn test_join_disjoint() {
        let a = Factor::new(vec![var(0)], vec![2], vec![0.2, 0.8]).unwrap();
        let b = Factor::new(vec![var(1)], vec![3], vec![0.1, 0.3, 0.6]).unwrap();
        let mut ops = OpCount::default();
        let c = a.join(&b, &mut ops);
        assert_eq!(c.scope(), &[var(0), var(1)]);
        assert_eq!(c.size(), 6);
        assert_eq!(ops.multiplications, 5);
        assert_eq!(ops.additions, 0);
        for i in 0..2 {
            for j in 0..3 {
                assert!((c.value(&[i, j]) - a.table()[i] * b.table()[j]).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_join_shared_scope_order() {
        // a over (x0, x1), b over (x2, x1)
        let a = Factor::new(vec![var(0), var(1)], vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Factor::new(vec![var(2), var(1)], vec![2, 2], vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let mut ops = OpCount::default();
        let c = a.join(&b, &mut ops);
        assert_eq!(c.scope(), &[var(0), var(1), var(2)]);
        for x0 in 0..2 {
            for x1 in 0..2 {
                for x2 in 0..2 {
                    let expected = a.value(&[x0, x1]) * b.value(&[x2, x1]);
                    assert_eq!(c.value(&[x0, x1, x2]), expected);
                }
            }
        }
        assert_eq!(ops.multiplications, 7);
    }

    #[test]
    fn test_join_commutes_up_to_scope_order() {
        let a = Factor::new(vec![var(0), var(1)], vec![2, 3], vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        let b = Factor::new(vec![var(1)], vec![3], vec![2.0, 3.0, 5.0]).unwrap();
        let mut ops = OpCount::default();
        let ab = a.join(&b, &mut ops);
        let ba = b.join(&a, &mut ops);
        assert_eq!(ab.scope(), &[var(0), var(1)]);
        assert_eq!(ba.scope(), &[var(1), var(0)]);
        for x0 in 0..2 {
            for x1 in 0..3 {
                assert!((ab.value(&[x0, x1]) - ba.value(&[x1, x0])).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_eliminate_middle() {
        let table: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let f = Factor::new(vec![var(0), var(1), var(2)], vec![2, 3, 2], table).unwrap();
        let mut ops = OpCount::default();
        let g = f.eliminate(var(1), &mut ops).unwrap();
        assert_eq!(g.scope(), &[var(0), var(2)]);
        assert_eq!(g.size(), 4);
        // 4 output cells, 2 additions each
        assert_eq!(ops.additions, 8);
        for x0 in 0..2 {
            for x2 in 0..2 {
                let expected: f64 = (0..3).map(|x1| f.value(&[x0, x1, x2])).sum();
                assert!((g.value(&[x0, x2]) - expected).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_eliminate_last_dimension() {
        let f = Factor::new(vec![var(3), var(4)], vec![2, 2], vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut ops = OpCount::default();
        let g = f.eliminate(var(4), &mut ops).unwrap();
        assert_eq!(g.scope(), &[var(3)]);
        assert!((g.table()[0] - 0.4).abs() < EPS);
        assert!((g.table()[1] - 0.6).abs() < EPS);
        assert_eq!(ops.additions, 2);
    }

    #[test]
    fn test_eliminate_to_scalar() {
        let f = Factor::new(vec![var(0)], vec![3], vec![0.2, 0.3, 0.5]).unwrap();
        let mut ops = OpCount::default();
        let g = f.eliminate(var(0), &mut ops).unwrap();
        assert!(g.scope().is_empty());
        assert_eq!(g.size(), 1);
        assert!((g.table()[0] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_eliminate_missing_variable() {
        let f = Factor::new(vec![var(0)], vec![2], vec![0.5, 0.5]).unwrap();
        let mut ops = OpCount::default();
        assert!(matches!(f.eliminate(var(1), &mut ops), Err(Error::InvalidFactor(_))));
    }

    #[test]
    fn test_from_cpt_with_evidence() {
        let mut builder = Network::builder();
        let a = builder.variable("A", ["T", "F"]).unwrap();
        let b = builder.variable("B", ["T", "F"]).unwrap();
        let c = builder.variable("C", ["x", "y", "z"]).unwrap();
        builder.define(a, vec![], vec![0.3, 0.7]).unwrap();
        builder.define(b, vec![], vec![0.6, 0.4]).unwrap();
        let table: Vec<f64> = (0..12).map(|i| i as f64).collect();
        builder.define(c, vec![a, b], table).unwrap();
        let network = builder.build().unwrap();

        // B = F pinned: scope (C, A), C fastest
        let pinned = vec![None, Some(1), None];
        let f = Factor::from_cpt(&network, c, &pinned).unwrap().unwrap();
        assert_eq!(f.scope(), &[c, a]);
        for vc in 0..3 {
            for va in 0..2 {
                let expected = (vc + 3 * va + 6) as f64;
                assert_eq!(f.value(&[vc, va]), expected);
            }
        }

        let all = vec![Some(0), Some(1), Some(2)];
        assert!(Factor::from_cpt(&network, c, &all).unwrap().is_none());

        let root = Factor::from_cpt(&network, a, &pinned).unwrap().unwrap();
        assert_eq!(root.scope(), &[a]);
        assert_eq!(root.table(), &[0.3, 0.7]);
    }

    #[test]
    fn test_display() {
        let f = Factor::new(vec![var(0), var(2)], vec![2, 2], vec![0.0; 4]).unwrap();
        assert_eq!(f.to_string(), "f(#0,#2)[4]");
    }
}
