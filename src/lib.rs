//! # bnet-rs: exact inference in discrete Bayesian networks
//!
//! **`bnet-rs`** answers queries of the form `P(X = x | E1 = e1, ...)` over a
//! discrete Bayesian network and reports, next to the probability, how many
//! additions and multiplications the chosen algorithm performed.
//!
//! ## Algorithms
//!
//! - **Enumeration** ([`enumeration`]): sums the full joint over every hidden
//!   assignment. Exponential, simple, and the reference for the others.
//! - **Variable elimination** ([`elimination`]): prunes barren leaves, builds
//!   one factor per relevant CPT, then joins and sums out hidden variables one
//!   at a time. The order is a pluggable [`EliminationOrder`][crate::elimination::EliminationOrder];
//!   [`Lexical`][crate::elimination::Lexical] and [`MinFill`][crate::elimination::MinFill] are provided.
//!
//! All three give the same probability; they differ in operation counts.
//!
//! ## Table layout
//!
//! Every table in the crate (CPTs and factors) is a flat `Vec<f64>` in
//! mixed-radix order with the FIRST dimension varying fastest. A CPT's
//! dimensions are the variable itself followed by its parents. The
//! [`Layout`][crate::utils::Layout] type is the single implementation of this
//! convention.
//!
//! ## Basic Usage
//!
//! ```rust
//! use bnet_rs::engine::run_query;
//! use bnet_rs::network::Network;
//! use bnet_rs::query::{Algorithm, Query};
//!
//! let mut builder = Network::builder();
//! let rain = builder.variable("Rain", ["T", "F"]).unwrap();
//! let wet = builder.variable("Wet", ["T", "F"]).unwrap();
//! builder.define(rain, vec![], vec![0.2, 0.8]).unwrap();
//! // P(Wet | Rain): Wet varies fastest
//! builder.define(wet, vec![rain], vec![0.9, 0.1, 0.1, 0.9]).unwrap();
//! let network = builder.build().unwrap();
//!
//! // P(Rain = T | Wet = T)
//! let query = Query::new(rain, 0, [(wet, 0)], Algorithm::EliminationMinFill).unwrap();
//! let result = run_query(&network, &query).unwrap();
//! assert!((result.probability - 0.18 / 0.26).abs() < 1e-12);
//! ```
//!
//! Networks can also be read from XMLBIF ([`xmlbif`]) and queries from text
//! ([`parse`]).

pub mod elimination;
pub mod engine;
pub mod enumeration;
pub mod error;
pub mod factor;
pub mod network;
pub mod parse;
pub mod query;
pub mod types;
pub mod utils;
pub mod xmlbif;
