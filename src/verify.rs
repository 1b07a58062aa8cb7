//! OAuth 1.0 signature verification.
//!
//! Verification rebuilds the signature base string from the request exactly as the client did, signs it again, and
//! compares the result with the signature the client sent in constant time.

use {
    crate::{
        canonical::{
            collect_parameters_from_request_parts, construct_base_string, normalize_base_string_uri,
            normalize_base_string_uri_with_host, normalize_parameters, CollectOptions, ParameterList,
        },
        constants::*,
        crypto::{base64_decode, rsa_public_key_from_pem, rsa_sha1_verify},
        signature::{SignatureMethod, Signer},
        SignatureError,
    },
    derive_builder::Builder,
    http::request::Parts,
    log::{debug, trace},
    std::str::FromStr,
    subtle::ConstantTimeEq,
};

/// A request whose OAuth 1.0 signature is to be verified.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(derive(Debug))]
pub struct SignedRequest {
    /// The HTTP request method, e.g. `POST`.
    #[builder(setter(into))]
    http_method: String,

    /// The request URI. It is normalized when the base string is built, so it may still carry a query, a fragment,
    /// or a default port.
    #[builder(setter(into))]
    uri: String,

    /// The signable request parameters, without `oauth_signature`.
    #[builder(default)]
    parameters: ParameterList,

    /// The signature sent by the client, already percent-decoded.
    #[builder(setter(into))]
    signature: String,
}

impl SignedRequest {
    /// Create a builder for `SignedRequest`.
    #[inline(always)]
    pub fn builder() -> SignedRequestBuilder {
        SignedRequestBuilder::default()
    }

    /// Create a `SignedRequest` from HTTP request [`Parts`] and an optional body.
    ///
    /// Parameters are collected per `options`; `oauth_signature` is always pulled out of the parameter list and used
    /// as the candidate signature (the first one wins if it appears more than once). If the request URI is in origin
    /// form (`/path?query`), the `Host` header and `scheme` supply the rest of the base string URI.
    ///
    /// # Errors
    /// Returns [`SignatureError::MissingSignature`] if no `oauth_signature` was sent, or
    /// [`SignatureError::InvalidText`] if the parameters or the URI cannot be decoded.
    pub fn from_http_request_parts(
        parts: &Parts,
        body: Option<&str>,
        scheme: &str,
        options: CollectOptions,
    ) -> Result<Self, SignatureError> {
        let all = collect_parameters_from_request_parts(parts, body, options.exclude_oauth_signature(false))?;
        let (signatures, parameters): (ParameterList, ParameterList) =
            all.into_iter().partition(|(name, _)| name == OAUTH_SIGNATURE);

        let signature = match signatures.into_iter().next() {
            Some((_, signature)) => signature,
            None => return Err(SignatureError::MissingSignature(MSG_MISSING_SIGNATURE.to_string())),
        };

        // `Uri::path` reports "/" for an empty path; the request target keeps it empty when a query follows.
        let target = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("");
        let path = &target[..target.find(['?', '#']).unwrap_or(target.len())];
        let uri = match (parts.uri.scheme_str(), parts.uri.authority()) {
            (Some(uri_scheme), Some(authority)) => {
                normalize_base_string_uri_with_host(path, uri_scheme, authority.as_str())?
            }
            _ => {
                let host = match parts.headers.get(HOST) {
                    Some(host) => host
                        .to_str()
                        .map_err(|_| SignatureError::InvalidText("Host header is not valid text".to_string()))?,
                    None => return Err(SignatureError::InvalidText(format!("{}{}", MSG_URI_NOT_ABSOLUTE, parts.uri))),
                };
                normalize_base_string_uri_with_host(path, scheme, host)?
            }
        };

        Ok(Self {
            http_method: parts.method.as_str().to_string(),
            uri,
            parameters,
            signature,
        })
    }

    /// Retrieve the HTTP request method.
    #[inline(always)]
    pub fn http_method(&self) -> &str {
        &self.http_method
    }

    /// Retrieve the request URI.
    #[inline(always)]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Retrieve the signable parameters.
    #[inline(always)]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Retrieve the signature sent by the client.
    #[inline(always)]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The signature method named by the first `oauth_signature_method` parameter, if any.
    pub fn signature_method(&self) -> Result<Option<SignatureMethod>, SignatureError> {
        match self.parameters.iter().find(|(name, _)| name == OAUTH_SIGNATURE_METHOD) {
            Some((_, value)) => Ok(Some(SignatureMethod::from_str(value)?)),
            None => Ok(None),
        }
    }

    /// Rebuild the signature base string for this request.
    pub fn base_string(&self) -> Result<String, SignatureError> {
        let uri = normalize_base_string_uri(&self.uri)?;
        let parameters = normalize_parameters(&self.parameters);
        Ok(construct_base_string(&self.http_method, &uri, &parameters))
    }
}

/// Verify the signature on `request` by signing it again with `signer` and comparing in constant time.
///
/// If the request names an `oauth_signature_method`, it must match the signer's method.
///
/// # Errors
/// Returns [`SignatureError::SignatureDoesNotMatch`] if the signatures differ. Errors from rebuilding the base string
/// or from the signing primitive are passed through.
pub fn verify_signature(request: &SignedRequest, signer: &Signer) -> Result<(), SignatureError> {
    check_signature_method(request, signer.method())?;

    let base_string = match signer.method() {
        SignatureMethod::Plaintext => String::new(),
        SignatureMethod::HmacSha1 | SignatureMethod::RsaSha1 => request.base_string()?,
    };

    let expected_signature = signer.sign(&base_string)?;
    let is_equal: bool = request.signature().as_bytes().ct_eq(expected_signature.as_bytes()).into();
    if !is_equal {
        debug!("{} signature mismatch for {} {}", signer.method(), request.http_method(), request.uri());
        return Err(SignatureError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
    }

    trace!("{} signature verified", signer.method());
    Ok(())
}

/// Verify an `HMAC-SHA1` signature.
pub fn verify_hmac_sha1(
    request: &SignedRequest,
    client_secret: &str,
    resource_owner_secret: &str,
) -> Result<(), SignatureError> {
    verify_signature(
        request,
        &Signer::HmacSha1 {
            client_secret,
            resource_owner_secret,
        },
    )
}

/// Verify a `PLAINTEXT` signature.
pub fn verify_plaintext(
    request: &SignedRequest,
    client_secret: &str,
    resource_owner_secret: &str,
) -> Result<(), SignatureError> {
    verify_signature(
        request,
        &Signer::Plaintext {
            client_secret,
            resource_owner_secret,
        },
    )
}

/// Verify an `RSA-SHA1` signature with the client's public key, PEM encoded as `PUBLIC KEY` or `RSA PUBLIC KEY`.
///
/// The server rarely holds the client's private key, so this checks the signature with the RSA primitive instead of
/// re-signing.
///
/// # Errors
/// Returns [`SignatureError::SignatureDoesNotMatch`] if the signature is not valid base64 or does not verify, and
/// [`SignatureError::Crypto`] if the key cannot be decoded.
pub fn verify_rsa_sha1(request: &SignedRequest, public_key_pem: &str) -> Result<(), SignatureError> {
    check_signature_method(request, SignatureMethod::RsaSha1)?;

    let key = rsa_public_key_from_pem(public_key_pem)?;
    let base_string = request.base_string()?;

    let signature = match base64_decode(request.signature()) {
        Ok(signature) => signature,
        Err(e) => {
            debug!("RSA-SHA1 signature is not valid base64: {}", e);
            return Err(SignatureError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
        }
    };

    match rsa_sha1_verify(&key, base_string.as_bytes(), &signature) {
        Ok(()) => {
            trace!("RSA-SHA1 signature verified");
            Ok(())
        }
        Err(e) => {
            debug!("RSA-SHA1 signature mismatch for {} {}: {}", request.http_method(), request.uri(), e);
            Err(SignatureError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())))
        }
    }
}

/// Reject a request that declares a different signature method than the one being verified.
fn check_signature_method(request: &SignedRequest, method: SignatureMethod) -> Result<(), SignatureError> {
    match request.signature_method()? {
        Some(declared) if declared != method => {
            debug!("Request declares {} but is being verified as {}", declared, method);
            Err(SignatureError::SignatureDoesNotMatch(Some(format!(
                "Signature method mismatch: request uses {}, expected {}",
                declared, method
            ))))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            canonical::{
                collect_parameters, construct_base_string, normalize_base_string_uri, normalize_parameters,
                percent_encode, CollectOptions, Parameter,
            },
            signature::{sign_hmac_sha1, Signer},
            verify::{verify_hmac_sha1, verify_plaintext, verify_signature, SignedRequest},
            SignatureError,
        },
        http::request::Request,
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(ref v) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), v),
                Err(ref e) => match e {
                    SignatureError::$expected(_) => e.to_string(),
                    _ => panic!("Expected {}; got {:#?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    const CLIENT_SECRET: &str = "kd94hf93k423kf44";
    const TOKEN_SECRET: &str = "pfkkdhi9sl3r4s00";
    const PHOTOS_SIGNATURE: &str = "1IAE9RzK+DqSqVTdQ/0zWANXVzs=";
    const PHOTOS_AUTHORIZATION: &str = "OAuth realm=\"Photos\", oauth_consumer_key=\"dpf43f3p2l4k3l03\", \
        oauth_token=\"nnch734d00sl2jdk\", oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"137131202\", \
        oauth_nonce=\"chapoH\", oauth_version=\"1.0\", oauth_signature=\"1IAE9RzK%2BDqSqVTdQ%2F0zWANXVzs%3D\"";

    fn p(name: &str, value: &str) -> Parameter {
        (name.to_string(), value.to_string())
    }

    fn photos_parameters() -> Vec<Parameter> {
        vec![
            p("file", "vacation.jpg"),
            p("size", "original"),
            p("oauth_consumer_key", "dpf43f3p2l4k3l03"),
            p("oauth_token", "nnch734d00sl2jdk"),
            p("oauth_signature_method", "HMAC-SHA1"),
            p("oauth_timestamp", "137131202"),
            p("oauth_nonce", "chapoH"),
            p("oauth_version", "1.0"),
        ]
    }

    fn photos_request(signature: &str) -> SignedRequest {
        SignedRequest::builder()
            .http_method("GET")
            .uri("http://photos.example.net/photos?file=vacation.jpg&size=original")
            .parameters(photos_parameters())
            .signature(signature)
            .build()
            .expect("failed to build SignedRequest")
    }

    #[test_log::test]
    fn base_string() {
        assert_eq!(
            photos_request(PHOTOS_SIGNATURE).base_string().unwrap(),
            "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3DchapoH%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D137131202%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
        );
    }

    #[test_log::test]
    fn hmac_sha1_accepts() {
        verify_hmac_sha1(&photos_request(PHOTOS_SIGNATURE), CLIENT_SECRET, TOKEN_SECRET).unwrap();
    }

    #[test_log::test]
    fn hmac_sha1_rejects_every_single_byte_change() {
        for i in 0..PHOTOS_SIGNATURE.len() {
            let mut altered = PHOTOS_SIGNATURE.as_bytes().to_vec();
            altered[i] = if altered[i] == b'A' {
                b'B'
            } else {
                b'A'
            };
            let altered = String::from_utf8(altered).unwrap();
            let msg = expect_err!(
                verify_hmac_sha1(&photos_request(&altered), CLIENT_SECRET, TOKEN_SECRET),
                SignatureDoesNotMatch
            );
            assert!(msg.starts_with("The request signature we calculated does not match"));
        }

        expect_err!(verify_hmac_sha1(&photos_request(""), CLIENT_SECRET, TOKEN_SECRET), SignatureDoesNotMatch);
        expect_err!(verify_hmac_sha1(&photos_request(PHOTOS_SIGNATURE), CLIENT_SECRET, ""), SignatureDoesNotMatch);
    }

    #[test_log::test]
    fn hmac_sha1_rejects_tampered_parameters() {
        let mut request = photos_request(PHOTOS_SIGNATURE);
        request.parameters[1] = p("size", "large");
        expect_err!(verify_hmac_sha1(&request, CLIENT_SECRET, TOKEN_SECRET), SignatureDoesNotMatch);
    }

    #[test_log::test]
    fn method_mismatch() {
        let msg = expect_err!(
            verify_plaintext(&photos_request("kd94hf93k423kf44&pfkkdhi9sl3r4s00"), CLIENT_SECRET, TOKEN_SECRET),
            SignatureDoesNotMatch
        );
        assert_eq!(msg, "Signature method mismatch: request uses HMAC-SHA1, expected PLAINTEXT");
    }

    #[test_log::test]
    fn unsupported_declared_method() {
        let mut request = photos_request(PHOTOS_SIGNATURE);
        request.parameters[4] = p("oauth_signature_method", "HMAC-SHA256");
        expect_err!(verify_hmac_sha1(&request, CLIENT_SECRET, TOKEN_SECRET), UnsupportedSignatureMethod);
    }

    #[test_log::test]
    fn plaintext() {
        let request = SignedRequest::builder()
            .http_method("POST")
            .uri("not even a uri")
            .parameters(vec![p("oauth_signature_method", "PLAINTEXT")])
            .signature("kd94hf93k423kf44&")
            .build()
            .unwrap();
        verify_plaintext(&request, CLIENT_SECRET, "").unwrap();
        expect_err!(verify_plaintext(&request, CLIENT_SECRET, TOKEN_SECRET), SignatureDoesNotMatch);
    }

    #[test_log::test]
    fn signer_without_declared_method() {
        let request = SignedRequest::builder()
            .http_method("get")
            .uri("https://api.example.com:443/items")
            .signature(sign_hmac_sha1("GET&https%3A%2F%2Fapi.example.com%2Fitems&", "c", "t").unwrap())
            .build()
            .unwrap();
        assert!(request.parameters().is_empty());
        assert_eq!(request.signature_method().unwrap(), None);
        verify_signature(
            &request,
            &Signer::HmacSha1 {
                client_secret: "c",
                resource_owner_secret: "t",
            },
        )
        .unwrap();
    }

    #[test_log::test]
    fn builder_requires_fields() {
        assert!(SignedRequest::builder().http_method("GET").build().is_err());
    }

    #[test_log::test]
    fn from_http_request_parts_absolute() {
        let request = Request::get("http://photos.example.net/photos?file=vacation.jpg&size=original")
            .header("Authorization", PHOTOS_AUTHORIZATION)
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        let signed = SignedRequest::from_http_request_parts(&parts, None, "https", CollectOptions::default()).unwrap();
        assert_eq!(signed.http_method(), "GET");
        assert_eq!(signed.uri(), "http://photos.example.net/photos");
        assert_eq!(signed.signature(), PHOTOS_SIGNATURE);

        let mut parameters = signed.parameters().to_vec();
        parameters.sort();
        let mut expected = photos_parameters();
        expected.sort();
        assert_eq!(parameters, expected);

        verify_hmac_sha1(&signed, CLIENT_SECRET, TOKEN_SECRET).unwrap();
    }

    #[test_log::test]
    fn from_http_request_parts_empty_path() {
        let uri = "http://example.com?file=x";
        let oauth = "OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_signature_method=\"HMAC-SHA1\", \
            oauth_timestamp=\"137131202\", oauth_nonce=\"chapoH\"";

        // Sign the way a client would, from the raw URI text.
        let (parts, _) = Request::get(uri).header("Authorization", oauth).body(()).unwrap().into_parts();
        let params = collect_parameters(Some("file=x"), None, Some(&parts.headers), CollectOptions::default()).unwrap();
        let client_uri = normalize_base_string_uri(uri).unwrap();
        assert_eq!(client_uri, "http://example.com");
        let base_string = construct_base_string("GET", &client_uri, &normalize_parameters(&params));
        let signature = sign_hmac_sha1(&base_string, CLIENT_SECRET, "").unwrap();

        let (parts, _) = Request::get(uri)
            .header("Authorization", format!("{}, oauth_signature=\"{}\"", oauth, percent_encode(&signature)))
            .body(())
            .unwrap()
            .into_parts();
        let signed = SignedRequest::from_http_request_parts(&parts, None, "https", CollectOptions::default()).unwrap();
        assert_eq!(signed.uri(), "http://example.com");
        assert_eq!(signed.base_string().unwrap(), base_string);
        verify_hmac_sha1(&signed, CLIENT_SECRET, "").unwrap();

        let (parts, _) = Request::get("/?file=x")
            .header("Host", "example.com")
            .header("Authorization", format!("{}, oauth_signature=\"x\"", oauth))
            .body(())
            .unwrap()
            .into_parts();
        let signed = SignedRequest::from_http_request_parts(&parts, None, "http", CollectOptions::default()).unwrap();
        assert_eq!(signed.uri(), "http://example.com/");
    }

    #[test_log::test]
    fn from_http_request_parts_origin_form() {
        let request = Request::get("/photos?file=vacation.jpg&size=original")
            .header("Host", "Photos.Example.net:80")
            .header("Authorization", PHOTOS_AUTHORIZATION)
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();
        let signed = SignedRequest::from_http_request_parts(&parts, None, "http", CollectOptions::default()).unwrap();
        assert_eq!(signed.uri(), "http://photos.example.net/photos");
        verify_hmac_sha1(&signed, CLIENT_SECRET, TOKEN_SECRET).unwrap();
    }

    #[test_log::test]
    fn from_http_request_parts_errors() {
        let (parts, _) =
            Request::get("/photos").header("Authorization", PHOTOS_AUTHORIZATION).body(()).unwrap().into_parts();
        expect_err!(SignedRequest::from_http_request_parts(&parts, None, "http", CollectOptions::default()), InvalidText);

        let (parts, _) =
            Request::get("http://photos.example.net/photos?file=vacation.jpg").body(()).unwrap().into_parts();
        let msg = expect_err!(
            SignedRequest::from_http_request_parts(&parts, None, "http", CollectOptions::default()),
            MissingSignature
        );
        assert_eq!(msg, "Request does not include an 'oauth_signature' parameter.");
    }
}
