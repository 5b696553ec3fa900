//! In-memory Bayesian network model.
//!
//! A [`Network`] is an ordered list of [`Variable`]s, keyed by position
//! ([`VarId`]), each with a parent list and a conditional probability table.
//!
//! # CPT layout
//!
//! Every CPT is a flat `Vec<f64>` over the dimensions `(v, parents[0], parents[1], ...)`
//! with `v` itself varying fastest (see [`Layout`]):
//!
//! ```text
//! index = value(v) + value(p0) * |v| + value(p1) * |v| * |p0| + ...
//! ```
//!
//! The network is built once through [`NetworkBuilder`] and never mutated
//! afterwards, so any number of queries may read it concurrently.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::types::{VarId, Variable};
use crate::utils::Layout;

#[derive(Debug, Clone)]
pub struct Network {
    variables: Vec<Variable>,
    parents: Vec<Vec<VarId>>,
    cpts: Vec<Vec<f64>>,
    layouts: Vec<Layout>,
    // Raw indices of (v, parents...), used to project full assignments onto a CPT.
    positions: Vec<Vec<usize>>,
    keys: HashMap<String, VarId>,
}

impl Network {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All keys, in network order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.variables.len()).map(VarId::new)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Fails with [`Error::UnknownVariable`] if `var` is out of range.
    pub fn check(&self, var: VarId) -> Result<()> {
        if var.index() < self.variables.len() {
            Ok(())
        } else {
            Err(Error::UnknownVariable(var.to_string()))
        }
    }

    pub fn variable(&self, var: VarId) -> Result<&Variable> {
        self.variables
            .get(var.index())
            .ok_or_else(|| Error::UnknownVariable(var.to_string()))
    }

    pub fn name_of(&self, var: VarId) -> Result<&str> {
        Ok(self.variable(var)?.name())
    }

    /// Domain size of `var`.
    pub fn length_of(&self, var: VarId) -> Result<usize> {
        Ok(self.variable(var)?.len())
    }

    /// Parents of `var`, in CPT dimension order.
    pub fn parents_of(&self, var: VarId) -> Result<&[VarId]> {
        self.check(var)?;
        Ok(&self.parents[var.index()])
    }

    pub fn cpt(&self, var: VarId) -> Result<&[f64]> {
        self.check(var)?;
        Ok(&self.cpts[var.index()])
    }

    /// Layout of the CPT of `var` over `(var, parents...)`.
    pub fn cpt_layout(&self, var: VarId) -> Result<&Layout> {
        self.check(var)?;
        Ok(&self.layouts[var.index()])
    }

    /// Returns `P(var = a[var] | parents = a[parents])` for a full assignment `a`,
    /// indexed by variable key.
    pub fn cpt_value(&self, var: VarId, assignment: &[usize]) -> Result<f64> {
        self.check(var)?;
        if assignment.len() != self.variables.len() {
            return Err(Error::InvalidQuery(format!(
                "assignment covers {} variables, network has {}",
                assignment.len(),
                self.variables.len()
            )));
        }
        let i = var.index();
        let index = self.layouts[i].index_via(&self.positions[i], assignment);
        Ok(self.cpts[i][index])
    }

    /// Resolves a variable name to its key.
    pub fn variable_key(&self, name: &str) -> Result<VarId> {
        self.keys
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Resolves a value label of `var` to its index.
    pub fn value_key(&self, var: VarId, label: &str) -> Result<usize> {
        let variable = self.variable(var)?;
        variable.value_key(label).ok_or_else(|| Error::UnknownValue {
            variable: variable.name().to_string(),
            value: label.to_string(),
        })
    }

    /// Checks that `value` is a valid index into the domain of `var`.
    pub fn check_value(&self, var: VarId, value: usize) -> Result<()> {
        let variable = self.variable(var)?;
        if value < variable.len() {
            Ok(())
        } else {
            Err(Error::UnknownValue {
                variable: variable.name().to_string(),
                value: value.to_string(),
            })
        }
    }

    /// Whether `var` is a parent of some variable in `among`.
    pub fn is_parent_within(&self, var: VarId, among: &[VarId]) -> bool {
        among
            .iter()
            .any(|&node| node != var && self.parents[node.index()].contains(&var))
    }
}

/// Incremental constructor for a [`Network`].
///
/// Variables are declared first (fixing their keys), then each gets exactly
/// one definition: its parents and its table. [`build`][NetworkBuilder::build]
/// checks that every table matches its layout.
///
/// ```
/// use bnet_rs::network::Network;
///
/// let mut builder = Network::builder();
/// let rain = builder.variable("Rain", ["T", "F"]).unwrap();
/// let wet = builder.variable("Wet", ["T", "F"]).unwrap();
/// builder.define(rain, vec![], vec![0.2, 0.8]).unwrap();
/// builder.define(wet, vec![rain], vec![0.9, 0.1, 0.1, 0.9]).unwrap();
/// let network = builder.build().unwrap();
/// assert_eq!(network.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    variables: Vec<Variable>,
    definitions: Vec<Option<(Vec<VarId>, Vec<f64>)>>,
    keys: HashMap<String, VarId>,
}

impl NetworkBuilder {
    /// Declares a variable and returns its key.
    pub fn variable(
        &mut self,
        name: impl Into<String>,
        domain: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<VarId> {
        let variable = Variable::new(name, domain);
        if variable.is_empty() {
            return Err(Error::InvalidNetwork(format!(
                "variable '{}' has an empty domain",
                variable.name()
            )));
        }
        if self.keys.contains_key(variable.name()) {
            return Err(Error::InvalidNetwork(format!(
                "variable '{}' declared twice",
                variable.name()
            )));
        }
        let id = VarId::new(self.variables.len());
        self.keys.insert(variable.name().to_string(), id);
        self.variables.push(variable);
        self.definitions.push(None);
        Ok(id)
    }

    /// Key of an already declared variable.
    pub fn key(&self, name: &str) -> Result<VarId> {
        self.keys
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Sets the parents and CPT of `var`.
    ///
    /// Self-references and repeated parents are dropped (first occurrence
    /// kept), so the stored parent order is the given order minus those.
    pub fn define(&mut self, var: VarId, parents: Vec<VarId>, table: Vec<f64>) -> Result<()> {
        let n = self.variables.len();
        if var.index() >= n {
            return Err(Error::UnknownVariable(var.to_string()));
        }
        let name = self.variables[var.index()].name();
        if self.definitions[var.index()].is_some() {
            return Err(Error::InvalidNetwork(format!("variable '{}' defined twice", name)));
        }

        let mut unique = Vec::with_capacity(parents.len());
        for p in parents {
            if p.index() >= n {
                return Err(Error::UnknownVariable(p.to_string()));
            }
            if p != var && !unique.contains(&p) {
                unique.push(p);
            }
        }

        self.definitions[var.index()] = Some((unique, table));
        Ok(())
    }

    pub fn build(self) -> Result<Network> {
        let mut parents = Vec::with_capacity(self.variables.len());
        let mut cpts = Vec::with_capacity(self.variables.len());
        let mut layouts = Vec::with_capacity(self.variables.len());
        let mut positions = Vec::with_capacity(self.variables.len());

        for (i, definition) in self.definitions.into_iter().enumerate() {
            let variable = &self.variables[i];
            let Some((ps, table)) = definition else {
                return Err(Error::InvalidNetwork(format!(
                    "variable '{}' has no definition",
                    variable.name()
                )));
            };

            let dims: Vec<usize> = std::iter::once(i).chain(ps.iter().map(|p| p.index())).collect();
            let layout = Layout::new(dims.iter().map(|&d| self.variables[d].len()).collect());
            if layout.size() != table.len() {
                return Err(Error::InvalidNetwork(format!(
                    "table of '{}' has {} entries, expected {}",
                    variable.name(),
                    table.len(),
                    layout.size()
                )));
            }
            debug!("cpt({}): parents = {:?}, size = {}", variable.name(), ps, layout.size());

            parents.push(ps);
            cpts.push(table);
            layouts.push(layout);
            positions.push(dims);
        }

        info!("Built network with {} variables", self.variables.len());

        Ok(Network {
            variables: self.variables,
            parents,
            cpts,
            layouts,
            positions,
            keys: self.keys,
        })
    }
}
