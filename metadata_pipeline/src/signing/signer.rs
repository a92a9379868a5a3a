// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signer
//!
//! The per-run signing worker. A [`Signer`] is built from a one-time
//! snapshot of the owning stage's configuration and then operates without
//! locks; one signer instance serves every item of a run, from however many
//! threads the stage chooses to use.
//!
//! ## Per-item contract
//!
//! 1. Ask the backend for the payload's id attribute; the reference URI is
//!    `""` when there is none, `"#id"` otherwise.
//! 2. Have the backend canonicalize the SignedInfo described by the
//!    request (one reference, configured algorithms, inclusive prefixes).
//! 3. Optionally log the canonical digest (the pre-digest debug flag).
//! 4. Sign the canonical octets with the snapshot's key.
//! 5. Base64 the signature and certificate material, stripping carriage
//!    returns when configured so output is stable across encoders that
//!    wrap base64 in CRLF lines.
//! 6. Hand the artifacts back to the backend to attach.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::debug;

use metadata_pipeline_domain::entities::item::Item;
use metadata_pipeline_domain::error::PipelineError;

use crate::signing::backend::{SignatureArtifacts, SignatureBackend, SignedInfoRequest};
use crate::signing::key_material::{KeyMaterial, LoadedKey};

/// Signature algorithm: key type and SHA variant together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaSha256,
    RsaSha384,
    RsaSha512,
    EcdsaP256Sha256,
    EcdsaP384Sha384,
}

impl SignatureAlgorithm {
    /// The XML-DSig SignatureMethod algorithm URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::RsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::RsaSha512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
            Self::EcdsaP256Sha256 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256",
            Self::EcdsaP384Sha384 => "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384",
        }
    }

    /// The digest algorithm matching this algorithm's SHA variant, used
    /// for the reference digest unless overridden.
    pub fn digest(&self) -> DigestAlgorithm {
        match self {
            Self::RsaSha256 | Self::EcdsaP256Sha256 => DigestAlgorithm::Sha256,
            Self::RsaSha384 | Self::EcdsaP384Sha384 => DigestAlgorithm::Sha384,
            Self::RsaSha512 => DigestAlgorithm::Sha512,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// Reference digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// The XML-DSig DigestMethod algorithm URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Sha256 => "http://www.w3.org/2001/04/xmlenc#sha256",
            Self::Sha384 => "http://www.w3.org/2001/04/xmldsig-more#sha384",
            Self::Sha512 => "http://www.w3.org/2001/04/xmlenc#sha512",
        }
    }

    /// Digests the given octets.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// One run's frozen view of the stage configuration.
pub(crate) struct SignerSnapshot {
    pub stage_id: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub digest_algorithm: DigestAlgorithm,
    pub inclusive_prefixes: Vec<String>,
    pub include_key_value: bool,
    pub include_certificates: bool,
    pub strip_carriage_returns: bool,
    pub debug_pre_digest: bool,
    pub key_material: Arc<KeyMaterial>,
    pub key: Arc<LoadedKey>,
}

/// Lock-free per-run signing worker over a backend.
pub struct Signer<'a, T, B> {
    snapshot: SignerSnapshot,
    backend: &'a B,
    _payload: PhantomData<fn(T)>,
}

impl<'a, T, B: SignatureBackend<T>> Signer<'a, T, B> {
    pub(crate) fn new(snapshot: SignerSnapshot, backend: &'a B) -> Self {
        Self {
            snapshot,
            backend,
            _payload: PhantomData,
        }
    }

    /// Signs one item in place.
    pub fn sign_item(&self, item: &mut Item<T>) -> Result<(), PipelineError> {
        let snapshot = &self.snapshot;

        let reference_uri = match self.backend.reference_id(item.payload()) {
            Some(id) => format!("#{id}"),
            None => String::new(),
        };
        let request = SignedInfoRequest {
            reference_uri: &reference_uri,
            signature_algorithm_uri: snapshot.signature_algorithm.uri(),
            digest_algorithm_uri: snapshot.digest_algorithm.uri(),
            inclusive_prefixes: &snapshot.inclusive_prefixes,
        };

        let canonical = self.backend.canonical_signed_info(item.payload(), &request)?;
        if snapshot.debug_pre_digest {
            debug!(
                stage = %snapshot.stage_id,
                algorithm = %snapshot.signature_algorithm,
                digest = %hex::encode(snapshot.digest_algorithm.digest(&canonical)),
                "canonical SignedInfo digest before signing"
            );
        }

        let raw_signature = snapshot.key.sign(snapshot.signature_algorithm, &canonical)?;
        let signature_value =
            self.stabilize(BASE64.encode(&raw_signature));
        let key_value = snapshot
            .include_key_value
            .then(|| self.stabilize(BASE64.encode(snapshot.key.public_key_bytes())));
        let certificates = if snapshot.include_certificates {
            snapshot
                .key_material
                .certificates()
                .iter()
                .map(|der| self.stabilize(BASE64.encode(der)))
                .collect()
        } else {
            Vec::new()
        };

        let artifacts = SignatureArtifacts {
            signature_value,
            key_name: snapshot.key_material.key_name().map(str::to_string),
            key_value,
            certificates,
        };
        self.backend.attach_signature(item.payload_mut(), &artifacts)
    }

    fn stabilize(&self, text: String) -> String {
        if self.snapshot.strip_carriage_returns && text.contains('\r') {
            text.replace('\r', "")
        } else {
            text
        }
    }
}
