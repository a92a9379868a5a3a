// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Material
//!
//! [`KeyMaterial`] bundles what a signing stage needs from the operator: a
//! PKCS#8 private key, the certificate chain to publish alongside
//! signatures, and an optional key name. The private key bytes are zeroized
//! on drop and redacted from `Debug` output.
//!
//! [`LoadedKey`] is the parsed, algorithm-checked form produced at stage
//! initialization; parsing once up front means a malformed key fails the
//! run before any item is touched.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ring::rand::SystemRandom;
use ring::signature::{self, EcdsaKeyPair, KeyPair as _, RsaKeyPair};
use zeroize::Zeroizing;

use metadata_pipeline_domain::error::PipelineError;

use crate::signing::signer::SignatureAlgorithm;

/// Private key, certificate chain, and key name for a signing stage.
pub struct KeyMaterial {
    key_name: Option<String>,
    pkcs8: Zeroizing<Vec<u8>>,
    certificates: Vec<Vec<u8>>,
}

impl KeyMaterial {
    /// Creates key material from a DER-encoded PKCS#8 private key.
    pub fn from_pkcs8_der(pkcs8: Vec<u8>) -> Self {
        Self {
            key_name: None,
            pkcs8: Zeroizing::new(pkcs8),
            certificates: Vec::new(),
        }
    }

    /// Creates key material from a base64 PKCS#8 private key (a PEM body
    /// with the armor lines removed). Whitespace, including CRLF line
    /// breaks, is tolerated.
    pub fn from_pkcs8_base64(encoded: &str) -> Result<Self, PipelineError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let der = BASE64.decode(compact.as_bytes()).map_err(|err| {
            PipelineError::invalid_config(format!("private key is not valid base64: {err}"))
        })?;
        Ok(Self::from_pkcs8_der(der))
    }

    /// Sets the key name published in KeyInfo.
    pub fn with_key_name(mut self, name: &str) -> Self {
        self.key_name = Some(name.to_string());
        self
    }

    /// Appends a DER-encoded certificate to the published chain.
    pub fn with_certificate_der(mut self, der: Vec<u8>) -> Self {
        self.certificates.push(der);
        self
    }

    /// Appends a base64 DER certificate (PEM body) to the published chain.
    pub fn with_certificate_base64(self, encoded: &str) -> Result<Self, PipelineError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let der = BASE64.decode(compact.as_bytes()).map_err(|err| {
            PipelineError::invalid_config(format!("certificate is not valid base64: {err}"))
        })?;
        Ok(self.with_certificate_der(der))
    }

    /// The key name, if any.
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    /// The DER certificates in chain order.
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    pub(crate) fn pkcs8(&self) -> &[u8] {
        &self.pkcs8
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_name", &self.key_name)
            .field("pkcs8", &format_args!("<redacted, {} bytes>", self.pkcs8.len()))
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

/// A parsed signing key, checked against the configured algorithm.
pub(crate) enum LoadedKey {
    Rsa(RsaKeyPair),
    Ecdsa(EcdsaKeyPair),
}

impl LoadedKey {
    /// Parses the key material for the given algorithm.
    pub(crate) fn load(
        material: &KeyMaterial,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, PipelineError> {
        match algorithm {
            SignatureAlgorithm::RsaSha256
            | SignatureAlgorithm::RsaSha384
            | SignatureAlgorithm::RsaSha512 => RsaKeyPair::from_pkcs8(material.pkcs8())
                .map(Self::Rsa)
                .map_err(|err| {
                    PipelineError::initialization(format!("cannot load RSA signing key: {err}"))
                }),
            SignatureAlgorithm::EcdsaP256Sha256 => EcdsaKeyPair::from_pkcs8(
                &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
                material.pkcs8(),
                &SystemRandom::new(),
            )
            .map(Self::Ecdsa)
            .map_err(|err| {
                PipelineError::initialization(format!(
                    "cannot load ECDSA P-256 signing key: {err}"
                ))
            }),
            SignatureAlgorithm::EcdsaP384Sha384 => EcdsaKeyPair::from_pkcs8(
                &signature::ECDSA_P384_SHA384_ASN1_SIGNING,
                material.pkcs8(),
                &SystemRandom::new(),
            )
            .map(Self::Ecdsa)
            .map_err(|err| {
                PipelineError::initialization(format!(
                    "cannot load ECDSA P-384 signing key: {err}"
                ))
            }),
        }
    }

    /// Signs the message, producing the raw signature bytes.
    pub(crate) fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        message: &[u8],
    ) -> Result<Vec<u8>, PipelineError> {
        let rng = SystemRandom::new();
        match self {
            Self::Rsa(keypair) => {
                let padding: &'static dyn signature::RsaEncoding = match algorithm {
                    SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_SHA256,
                    SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_SHA384,
                    SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_SHA512,
                    other => {
                        return Err(PipelineError::signing_error(format!(
                            "RSA key cannot sign with {other}"
                        )))
                    }
                };
                let mut signature_bytes = vec![0u8; keypair.public().modulus_len()];
                keypair
                    .sign(padding, &rng, message, &mut signature_bytes)
                    .map_err(|_| {
                        PipelineError::signing_error("RSA signing operation failed")
                    })?;
                Ok(signature_bytes)
            }
            Self::Ecdsa(keypair) => {
                if !matches!(
                    algorithm,
                    SignatureAlgorithm::EcdsaP256Sha256 | SignatureAlgorithm::EcdsaP384Sha384
                ) {
                    return Err(PipelineError::signing_error(format!(
                        "ECDSA key cannot sign with {algorithm}"
                    )));
                }
                keypair
                    .sign(&rng, message)
                    .map(|sig| sig.as_ref().to_vec())
                    .map_err(|_| {
                        PipelineError::signing_error("ECDSA signing operation failed")
                    })
            }
        }
    }

    /// The public key bytes as ring exposes them (DER `RSAPublicKey` for
    /// RSA, uncompressed point for ECDSA).
    pub(crate) fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Rsa(keypair) => keypair.public_key().as_ref().to_vec(),
            Self::Ecdsa(keypair) => keypair.public_key().as_ref().to_vec(),
        }
    }
}
