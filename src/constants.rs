//! Common constants used throughout the crate.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Header holding the OAuth protocol parameters.
pub(crate) const AUTHORIZATION: &str = "authorization";

/// Default port for the `http` scheme.
pub(crate) const DEFAULT_HTTP_PORT: u16 = 80;

/// Default port for the `https` scheme.
pub(crate) const DEFAULT_HTTPS_PORT: u16 = 443;

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: InvalidText
pub(crate) const ERR_CODE_INVALID_TEXT: &str = "InvalidText";

/// Error code: MissingSignature
pub(crate) const ERR_CODE_MISSING_SIGNATURE: &str = "MissingSignature";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Error code: UnsupportedSignatureMethod
pub(crate) const ERR_CODE_UNSUPPORTED_SIGNATURE_METHOD: &str = "UnsupportedSignatureMethod";

/// Header used to rebuild the authority of origin-form request URIs.
pub(crate) const HOST: &str = "host";

/// Signature method name: HMAC-SHA1
pub(crate) const HMAC_SHA1: &str = "HMAC-SHA1";

/// Error message: `"Authorization header is not valid text"`
pub(crate) const MSG_AUTH_HEADER_NOT_TEXT: &str = "Authorization header is not valid text";

/// Error message: `"Authorization header does not use the OAuth scheme"`
pub(crate) const MSG_AUTH_HEADER_NOT_OAUTH: &str = "Authorization header does not use the OAuth scheme";

/// Error message: `"Invalid hex encoding in query string."`
pub(crate) const MSG_INVALID_HEX_ENCODING: &str = "Invalid hex encoding in query string.";

/// Error message: `"Percent-decoded value is not valid UTF-8"`
pub(crate) const MSG_INVALID_UTF8: &str = "Percent-decoded value is not valid UTF-8";

/// Error message: `"Request does not include an 'oauth_signature' parameter."`
pub(crate) const MSG_MISSING_SIGNATURE: &str = "Request does not include an 'oauth_signature' parameter.";

/// Error message: `"The request signature we calculated does not match the signature you provided. Check your client secret, token secret, and signature method."`
pub(crate) const MSG_REQUEST_SIGNATURE_MISMATCH: &str = "The request signature we calculated does not match the signature you provided. Check your client secret, token secret, and signature method.";

/// Error message: `"URI must be absolute: "`
pub(crate) const MSG_URI_NOT_ABSOLUTE: &str = "URI must be absolute: ";

/// Parameter carrying the signature itself.
pub(crate) const OAUTH_SIGNATURE: &str = "oauth_signature";

/// Parameter naming the signature method.
pub(crate) const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";

/// Signature method name: PLAINTEXT
pub(crate) const PLAINTEXT: &str = "PLAINTEXT";

/// Authorization header parameter naming the protection space.
pub(crate) const REALM: &str = "realm";

/// Signature method name: RSA-SHA1
pub(crate) const RSA_SHA1: &str = "RSA-SHA1";

/// The length of a SHA-1 digest in bytes.
pub(crate) const SHA1_OUTPUT_LEN: usize = 20;
