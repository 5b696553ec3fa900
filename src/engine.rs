//! Query dispatch.
//!
//! [`Engine::run`] validates a query, answers it straight from the CPT when
//! the evidence is exactly the target's parent set, and otherwise hands it to
//! the algorithm the query selects. The engine holds nothing but a borrowed
//! network and its configuration, so one engine can serve any number of
//! queries, from any number of threads.

use log::debug;

use crate::elimination::{variable_elimination, Lexical, MinFill};
use crate::enumeration::enumerate;
use crate::error::Result;
use crate::network::Network;
use crate::query::{Algorithm, OpCount, Query, QueryResult};

/// Engine configuration.
///
/// ```
/// use bnet_rs::engine::EngineConfig;
///
/// let config = EngineConfig::default().with_cpt_lookup(false);
/// assert!(!config.cpt_lookup);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Answer `P(X | parents(X))` directly from the CPT, with no operations.
    pub cpt_lookup: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { cpt_lookup: true }
    }
}

impl EngineConfig {
    pub fn with_cpt_lookup(mut self, enabled: bool) -> Self {
        self.cpt_lookup = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Engine<'a> {
    network: &'a Network,
    config: EngineConfig,
}

impl<'a> Engine<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self::with_config(network, EngineConfig::default())
    }

    pub fn with_config(network: &'a Network, config: EngineConfig) -> Self {
        Self { network, config }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answers a single query.
    pub fn run(&self, query: &Query) -> Result<QueryResult> {
        query.validate(self.network)?;

        if self.config.cpt_lookup {
            if let Some(probability) = self.cpt_lookup(query)? {
                debug!("run: {:?} answered from the CPT", query);
                return Ok(QueryResult::new(probability, OpCount::default()));
            }
        }

        debug!("run: {:?} via {}", query, query.algorithm());
        match query.algorithm() {
            Algorithm::Enumeration => enumerate(self.network, query),
            Algorithm::EliminationLexical => variable_elimination(self.network, query, &Lexical),
            Algorithm::EliminationMinFill => variable_elimination(self.network, query, &MinFill),
        }
    }

    /// The CPT entry for the query, if the evidence keys are exactly the
    /// target's parents.
    fn cpt_lookup(&self, query: &Query) -> Result<Option<f64>> {
        let target = query.target();
        let parents = self.network.parents_of(target)?;
        // Evidence keys are unique, so equal sizes plus inclusion means equal sets.
        if parents.len() != query.evidence().len() || !parents.iter().all(|&p| query.is_evidence(p)) {
            return Ok(None);
        }

        let mut digits = Vec::with_capacity(parents.len() + 1);
        digits.push(query.value());
        for p in parents {
            let value = query
                .evidence()
                .iter()
                .find(|&&(v, _)| v == *p)
                .map(|&(_, value)| value)
                .unwrap_or_default();
            digits.push(value);
        }

        let layout = self.network.cpt_layout(target)?;
        Ok(Some(self.network.cpt(target)?[layout.index(&digits)]))
    }
}

/// Answers `query` against `network` with the default configuration.
pub fn run_query(network: &Network, query: &Query) -> Result<QueryResult> {
    Engine::new(network).run(query)
}
