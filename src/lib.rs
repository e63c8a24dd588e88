//! Preset and contextual filter resolution for faceted search lists.
//!
//! `facet-lists` turns a stored list configuration plus the current request
//! into a parameterized query against a faceted search backend. Contextual
//! filters take their values from a context entity: directly from its id,
//! from an equivalent field (optionally through configured aliases and
//! taxonomy hierarchies), or from a contextual-aware index processor.
//! Execution is memoized per request by configuration fingerprint.

pub mod backend;
pub mod cache;
pub mod config;
pub mod contextual;
pub mod entity;
pub mod execution;
pub mod filter;
pub mod hierarchy;
pub mod mapping;
pub mod plugins;
pub mod source;
pub mod types;
