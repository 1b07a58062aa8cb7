use {
    crate::constants::*,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when an attempt at generating or validating an OAuth 1.0 signature fails.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// A cryptographic primitive failed. This is usually a malformed PEM key or an RSA key that is
    /// too small for the digest. The underlying error is preserved as the source.
    Crypto(Box<dyn Error + Send + Sync>),

    /// An input that must be decoded text was not. Sample messages:
    /// `Invalid hex encoding in query string.`
    /// `Authorization header does not use the OAuth scheme`
    /// `URI must be absolute: www.example.com:8080`
    InvalidText(/* message */ String),

    /// The request does not carry an `oauth_signature` parameter.
    MissingSignature(/* message */ String),

    /// Signature did not match the calculated signature value.
    SignatureDoesNotMatch(Option</* message */ String>),

    /// The `oauth_signature_method` is not one of `HMAC-SHA1`, `RSA-SHA1`, or `PLAINTEXT`.
    UnsupportedSignatureMethod(/* message */ String),
}

impl SignatureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Crypto(_) => ERR_CODE_INTERNAL_FAILURE,
            Self::InvalidText(_) => ERR_CODE_INVALID_TEXT,
            Self::MissingSignature(_) => ERR_CODE_MISSING_SIGNATURE,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
            Self::UnsupportedSignatureMethod(_) => ERR_CODE_UNSUPPORTED_SIGNATURE_METHOD,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidText(_) | Self::MissingSignature(_) | Self::UnsupportedSignatureMethod(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::SignatureDoesNotMatch(_) => StatusCode::UNAUTHORIZED,
            Self::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ServiceError for SignatureError {
    fn error_code(&self) -> &'static str {
        SignatureError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SignatureError::http_status(self)
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Crypto(ref e) => Display::fmt(e, f),
            Self::InvalidText(msg) => f.write_str(msg),
            Self::MissingSignature(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
            Self::UnsupportedSignatureMethod(msg) => f.write_str(msg),
        }
    }
}

impl Error for SignatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Crypto(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<rsa::Error> for SignatureError {
    fn from(e: rsa::Error) -> SignatureError {
        SignatureError::Crypto(Box::new(e))
    }
}

impl From<rsa::pkcs1::Error> for SignatureError {
    fn from(e: rsa::pkcs1::Error) -> SignatureError {
        SignatureError::Crypto(Box::new(e))
    }
}

impl From<rsa::pkcs8::Error> for SignatureError {
    fn from(e: rsa::pkcs8::Error) -> SignatureError {
        SignatureError::Crypto(Box::new(e))
    }
}

impl From<rsa::pkcs8::spki::Error> for SignatureError {
    fn from(e: rsa::pkcs8::spki::Error) -> SignatureError {
        SignatureError::Crypto(Box::new(e))
    }
}
