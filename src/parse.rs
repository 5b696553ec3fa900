//! Query scripts: parsing queries and rendering answers.
//!
//! A script is plain text. The first non-empty line names an XMLBIF network
//! file; every following non-empty line is a query:
//!
//! ```text
//! alarm_net.xml
//! P(B=T|J=T,M=T),1
//! P(J=T),3
//! ```
//!
//! The number after the closing parenthesis selects the [`Algorithm`].

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::network::Network;
use crate::query::{Algorithm, Query, QueryResult};
use crate::types::VarId;

/// A parsed script: the network path and the raw query lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub network: PathBuf,
    pub queries: Vec<String>,
}

pub fn parse_script(text: &str) -> Result<Script> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let network = lines
        .next()
        .ok_or_else(|| Error::InvalidQuery("script has no network line".to_string()))?;
    Ok(Script {
        network: PathBuf::from(network),
        queries: lines.map(str::to_string).collect(),
    })
}

/// Parses `P(<var>=<value>|<var>=<value>,...),<k>` against `network`.
///
/// ```
/// use bnet_rs::network::Network;
/// use bnet_rs::parse::parse_query;
/// use bnet_rs::query::Algorithm;
///
/// let mut builder = Network::builder();
/// let a = builder.variable("A", ["T", "F"]).unwrap();
/// let b = builder.variable("B", ["T", "F"]).unwrap();
/// builder.define(a, vec![], vec![0.5, 0.5]).unwrap();
/// builder.define(b, vec![a], vec![0.9, 0.1, 0.2, 0.8]).unwrap();
/// let network = builder.build().unwrap();
///
/// let query = parse_query(&network, "P(A=F|B=T),2").unwrap();
/// assert_eq!(query.target(), a);
/// assert_eq!(query.value(), 1);
/// assert_eq!(query.evidence(), &[(b, 0)]);
/// assert_eq!(query.algorithm(), Algorithm::EliminationLexical);
/// ```
pub fn parse_query(network: &Network, line: &str) -> Result<Query> {
    let malformed = || Error::InvalidQuery(format!("malformed query '{}'", line));

    let rest = line.trim().strip_prefix("P(").ok_or_else(malformed)?;
    let (body, selector) = rest.rsplit_once("),").ok_or_else(malformed)?;
    let selector: u32 = selector.trim().parse().map_err(|_| malformed())?;
    let algorithm = Algorithm::from_selector(selector)?;

    let (target, evidence) = match body.split_once('|') {
        Some((target, evidence)) => (target, Some(evidence)),
        None => (body, None),
    };

    let (target, value) = parse_assignment(network, target).ok_or_else(malformed)??;
    let evidence = match evidence {
        Some(evidence) => evidence
            .split(',')
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| parse_assignment(network, pair).ok_or_else(malformed)?)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Query::new(target, value, evidence, algorithm)
}

/// `None` when the text has no `=`; otherwise the resolved pair or a lookup error.
fn parse_assignment(network: &Network, text: &str) -> Option<Result<(VarId, usize)>> {
    let (name, label) = text.split_once('=')?;
    Some(
        network
            .variable_key(name.trim())
            .and_then(|var| Ok((var, network.value_key(var, label.trim())?))),
    )
}

/// Formats an answer as `probability,additions,multiplications`, the
/// probability rounded to five decimals.
pub fn render_result(result: &QueryResult) -> String {
    format!(
        "{:.5},{},{}",
        result.probability, result.additions, result.multiplications
    )
}
