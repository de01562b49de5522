//! Skylift turns generated deployment artifacts (an infrastructure
//! declaration plus a bootstrap script) into a provisioned, reachable,
//! running cloud service, and can tear the same resources down again.

pub mod cli;
pub mod commands;
pub mod orchestrator;
