// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signing Adjunct
//!
//! Signing has many knobs and is the most expensive per-item operation in a
//! publication pipeline, so its design splits three ways:
//!
//! - [`SignatureSigningStage`](stage::SignatureSigningStage) holds the
//!   configuration: algorithms, key material, what KeyInfo content to emit,
//!   canonicalization prefixes, output-stabilization flags.
//! - A per-run [`Signer`](signer::Signer) snapshots that configuration in
//!   one critical section when execution starts, then signs items without
//!   taking a lock again. Per-item work is independent, so the stage can
//!   fan it out across rayon workers.
//! - A [`SignatureBackend`](backend::SignatureBackend) supplied by the
//!   payload collaborator owns everything that requires schema knowledge:
//!   locating the id attribute, canonicalizing the SignedInfo the signer
//!   describes, and attaching the finished signature. The cryptography
//!   itself - digesting and signing canonical bytes - stays here.

pub mod backend;
pub mod key_material;
pub mod signer;
pub mod stage;

pub use backend::{SignatureArtifacts, SignatureBackend, SignedInfoRequest};
pub use key_material::KeyMaterial;
pub use signer::{DigestAlgorithm, SignatureAlgorithm, Signer};
pub use stage::SignatureSigningStage;
