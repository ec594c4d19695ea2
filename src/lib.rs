//! billgraph - Legislative knowledge graph
//!
//! Turns flat bill records into a typed graph of bills, categories,
//! outcomes, stages, sponsors and houses, exports it in several formats and
//! answers aggregate and neighborhood queries over it.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod graph;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod sources;
