//! # ssh_vanity
//!
//! Multi-threaded OpenSSH Ed25519 vanity key generator.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and OpenSSH public key encoding
//! - `matcher`: Substring matching, optionally ASCII case-insensitive
//! - `worker`: Worker pool, first-match rendezvous, cancellation and progress
//! - `keyfile`: Writing the winning key pair to disk
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod keyfile;
pub mod matcher;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{EncodedPublicKey, KeySource, Keypair, KeygenError, OsKeySource};
pub use keyfile::{KeyWriter, PersistError, WrittenKeys};
pub use matcher::{Matcher, SearchTarget, TargetError};
pub use worker::{SearchConfig, SearchOutcome, VanityResult, WorkerPool};

#[cfg(test)]
mod tests;
