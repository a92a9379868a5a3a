// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Signature Backend Contract
//!
//! The seam between the payload-agnostic signer and the payload's schema.
//! The backend owns everything that requires looking inside the document:
//! finding the id attribute the reference points at, producing the
//! canonical octets of the SignedInfo the signer describes, and attaching
//! the finished signature where the schema wants it. The signer owns the
//! cryptography and the output-stabilization policy.

use metadata_pipeline_domain::error::PipelineError;

/// What the signer asks the backend to canonicalize.
///
/// Algorithm fields carry the XML-DSig algorithm URIs, ready for embedding
/// in the SignedInfo the backend builds.
#[derive(Debug)]
pub struct SignedInfoRequest<'a> {
    /// `""` when the payload has no id attribute, otherwise `"#id"`.
    pub reference_uri: &'a str,
    /// SignatureMethod algorithm URI.
    pub signature_algorithm_uri: &'a str,
    /// DigestMethod algorithm URI for the one reference.
    pub digest_algorithm_uri: &'a str,
    /// InclusiveNamespaces prefix list for exclusive canonicalization.
    pub inclusive_prefixes: &'a [String],
}

/// The finished signature the backend attaches to the payload.
///
/// All string fields are base64, already stabilized per the stage's
/// CR-stripping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureArtifacts {
    /// Base64 SignatureValue content.
    pub signature_value: String,
    /// KeyName content, when the key material names the key.
    pub key_name: Option<String>,
    /// Base64 public key for KeyValue, when configured.
    pub key_value: Option<String>,
    /// Base64 DER certificates for X509Data, in chain order, when
    /// configured.
    pub certificates: Vec<String>,
}

/// Payload-schema knowledge needed to sign one document.
pub trait SignatureBackend<T>: Send + Sync {
    /// The value of the payload's id attribute, if it has one.
    fn reference_id(&self, payload: &T) -> Option<String>;

    /// The canonical octets of the SignedInfo described by the request,
    /// including the digest of the referenced content.
    fn canonical_signed_info(
        &self,
        payload: &T,
        request: &SignedInfoRequest<'_>,
    ) -> Result<Vec<u8>, PipelineError>;

    /// Attaches the finished signature to the payload.
    fn attach_signature(
        &self,
        payload: &mut T,
        artifacts: &SignatureArtifacts,
    ) -> Result<(), PipelineError>;
}
