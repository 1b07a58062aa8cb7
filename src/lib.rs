//! The `scratchstack-oauth1-signature` crate computes and verifies OAuth 1.0
//! ([RFC 5849](https://www.rfc-editor.org/rfc/rfc5849)) request signatures.
//!
//! This is the signature core only: it does not send requests, store tokens, or remember nonces. Those belong to the
//! HTTP layer around it.
//!
//! # Workflow
//! Signing and verifying share one pipeline:
//! 1. Collect the request parameters from the query string, the `OAuth` `Authorization` header, and (if the caller
//!    says the body is `application/x-www-form-urlencoded`) the body, using [`collect_parameters`].
//! 2. Normalize the request URI with [`normalize_base_string_uri`] and the parameters with [`normalize_parameters`].
//! 3. Join the method, URI and parameters into the signature base string with [`construct_base_string`].
//! 4. Sign the base string with [`sign_hmac_sha1`], [`sign_rsa_sha1`], or [`sign_plaintext`] (or a [`Signer`]).
//!
//! To verify, build a [`SignedRequest`] (usually with [`SignedRequest::from_http_request_parts`]) and call
//! [`verify_signature`], [`verify_hmac_sha1`], [`verify_plaintext`], or [`verify_rsa_sha1`]. Signatures are compared
//! in constant time.
//!
//! All inputs are `&str`: the caller decodes bytes into text before anything is signed. Passing raw bytes where text
//! is required, a classic source of OAuth signature mismatches, does not compile.
//!
//! ## Example
//! ```rust
//! use http::Request;
//! use scratchstack_oauth1_signature::{
//!     collect_parameters, construct_base_string, normalize_base_string_uri, normalize_parameters, sign_hmac_sha1,
//!     verify_hmac_sha1, CollectOptions, SignedRequest,
//! };
//!
//! const CLIENT_SECRET: &str = "kd94hf93k423kf44";
//! const TOKEN_SECRET: &str = "pfkkdhi9sl3r4s00";
//!
//! // Client side: sign the request.
//! let uri = "http://photos.example.net/photos?file=vacation.jpg&size=original";
//! let oauth = "OAuth realm=\"Photos\", oauth_consumer_key=\"dpf43f3p2l4k3l03\", \
//! oauth_token=\"nnch734d00sl2jdk\", oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"137131202\", \
//! oauth_nonce=\"chapoH\", oauth_version=\"1.0\"";
//! let unsigned = Request::get(uri).header("Authorization", oauth).body(()).unwrap();
//! let (parts, _) = unsigned.into_parts();
//!
//! let params = collect_parameters(parts.uri.query(), None, Some(&parts.headers), CollectOptions::default()).unwrap();
//! let base_string = construct_base_string(
//!     parts.method.as_str(),
//!     &normalize_base_string_uri(uri).unwrap(),
//!     &normalize_parameters(&params),
//! );
//! let signature = sign_hmac_sha1(&base_string, CLIENT_SECRET, TOKEN_SECRET).unwrap();
//! assert_eq!(signature, "1IAE9RzK+DqSqVTdQ/0zWANXVzs=");
//!
//! // Server side: verify it.
//! let signed = Request::get(uri)
//!     .header("Authorization", format!("{}, oauth_signature=\"1IAE9RzK%2BDqSqVTdQ%2F0zWANXVzs%3D\"", oauth))
//!     .body(())
//!     .unwrap();
//! let (parts, _) = signed.into_parts();
//! let request = SignedRequest::from_http_request_parts(&parts, None, "https", CollectOptions::default()).unwrap();
//! verify_hmac_sha1(&request, CLIENT_SECRET, TOKEN_SECRET).unwrap();
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

#[cfg(feature = "unstable")]
pub mod canonical;
#[cfg(not(feature = "unstable"))]
mod canonical;
mod constants;
mod crypto;
mod error;
mod signature;
mod verify;

pub use crate::{
    canonical::{
        collect_parameters, collect_parameters_from_request_parts, construct_base_string, normalize_base_string_uri,
        normalize_base_string_uri_with_host, normalize_parameters, percent_encode, CollectOptions, Parameter,
        ParameterList,
    },
    error::SignatureError,
    signature::{sign_hmac_sha1, sign_plaintext, sign_rsa_sha1, SignatureMethod, Signer},
    verify::{
        verify_hmac_sha1, verify_plaintext, verify_rsa_sha1, verify_signature, SignedRequest, SignedRequestBuilder,
        SignedRequestBuilderError,
    },
};
