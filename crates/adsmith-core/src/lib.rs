//! adsmith-core
//!
//! Orchestrates generative ad creatives across several providers.
//!
//! # Modules
//! - **domain**: briefs, requests, artifacts, outcomes, errors
//! - **ports**: seams to the outside (clock, scheduler, ids, credentials, storage, describer, export)
//! - **adapters**: one `ProviderAdapter` per provider, plus the registry
//! - **app**: orchestrator, poller, history, fallback, builder
//! - **impls**: history storage implementations
//! - **prompt**: brief -> prompt composition
//! - **config**: TOML settings

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;
