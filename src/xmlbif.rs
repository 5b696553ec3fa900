//! XMLBIF network loader.
//!
//! Reads the subset of XMLBIF used for discrete networks:
//!
//! ```xml
//! <NETWORK>
//!   <VARIABLE TYPE="nature">
//!     <NAME>A</NAME>
//!     <OUTCOME>T</OUTCOME>
//!     <OUTCOME>F</OUTCOME>
//!   </VARIABLE>
//!   <DEFINITION>
//!     <FOR>A</FOR>
//!     <GIVEN>E</GIVEN>
//!     <GIVEN>B</GIVEN>
//!     <TABLE>0.95 0.05 0.29 0.71 0.94 0.06 0.001 0.999</TABLE>
//!   </DEFINITION>
//! </NETWORK>
//! ```
//!
//! In a `TABLE` the `FOR` variable varies fastest, then the LAST `GIVEN`, then
//! the one before it. The parents are therefore stored in reverse `GIVEN`
//! order, which makes the table match the network's CPT layout without
//! reordering a single entry.

use std::fs;
use std::path::Path;

use log::info;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::network::Network;

#[derive(Debug, Default)]
struct VariableDecl {
    name: String,
    outcomes: Vec<String>,
}

#[derive(Debug, Default)]
struct DefinitionDecl {
    name: String,
    given: Vec<String>,
    table: String,
}

impl Network {
    /// Loads a network from an XMLBIF file.
    pub fn from_xmlbif_file(path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        info!("Loading network from {:?}", path);
        let text = fs::read_to_string(path)?;
        Self::from_xmlbif_str(&text)
    }

    /// Loads a network from XMLBIF text.
    pub fn from_xmlbif_str(text: &str) -> Result<Network> {
        let (variables, definitions) = read_declarations(text)?;

        let mut builder = Network::builder();
        for decl in variables {
            builder.variable(decl.name, decl.outcomes)?;
        }

        for decl in definitions {
            let var = builder.key(&decl.name)?;
            let parents = decl
                .given
                .iter()
                .rev()
                .map(|name| builder.key(name))
                .collect::<Result<Vec<_>>>()?;
            let table = decl
                .table
                .split_whitespace()
                .map(|s| {
                    s.parse::<f64>().map_err(|_| {
                        Error::InvalidNetwork(format!(
                            "invalid probability '{}' in table of '{}'",
                            s, decl.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            builder.define(var, parents, table)?;
        }

        builder.build()
    }
}

/// Collects VARIABLE and DEFINITION blocks, in document order.
fn read_declarations(text: &str) -> Result<(Vec<VariableDecl>, Vec<DefinitionDecl>)> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut variables = Vec::new();
    let mut definitions = Vec::new();

    let mut variable: Option<VariableDecl> = None;
    let mut definition: Option<DefinitionDecl> = None;
    let mut buffer = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Xml(format!("at position {}: {}", reader.buffer_position(), e)))?;
        match event {
            Event::Start(e) => {
                buffer.clear();
                match e.name().as_ref() {
                    b"VARIABLE" => variable = Some(VariableDecl::default()),
                    b"DEFINITION" => definition = Some(DefinitionDecl::default()),
                    _ => {}
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                buffer.push_str(&text);
            }
            Event::End(e) => {
                let content = std::mem::take(&mut buffer);
                let content = content.trim();
                match e.name().as_ref() {
                    b"NAME" => {
                        if let Some(v) = variable.as_mut() {
                            v.name = content.to_string();
                        }
                    }
                    b"OUTCOME" => {
                        if let Some(v) = variable.as_mut() {
                            v.outcomes.push(content.to_string());
                        }
                    }
                    b"FOR" => {
                        if let Some(d) = definition.as_mut() {
                            d.name = content.to_string();
                        }
                    }
                    b"GIVEN" => {
                        if let Some(d) = definition.as_mut() {
                            d.given.push(content.to_string());
                        }
                    }
                    b"TABLE" => {
                        if let Some(d) = definition.as_mut() {
                            d.table = content.to_string();
                        }
                    }
                    b"VARIABLE" => {
                        if let Some(v) = variable.take() {
                            variables.push(v);
                        }
                    }
                    b"DEFINITION" => {
                        if let Some(d) = definition.take() {
                            definitions.push(d);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((variables, definitions))
}
