//! Canonicalization functionality for signature generation and validation.
//!
//! This covers the three stages of RFC 5849 §3.4.1: collecting the request parameters from the query string, the
//! `Authorization` header and a form-encoded body; normalizing the base string URI and the parameter list; and
//! joining them with the request method into the signature base string.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! Items that are only public with the `unstable` feature are subject to change in minor/patch versions.

use {
    crate::{constants::*, SignatureError},
    http::{header::HeaderMap, request::Parts},
    lazy_static::lazy_static,
    log::trace,
    percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC},
    qualifier_attr::qualifiers,
    regex::Regex,
    std::borrow::Cow,
};

/// A single `(name, value)` request parameter. Names are not unique.
pub type Parameter = (String, String);

/// Request parameters in the order they were collected.
pub type ParameterList = Vec<Parameter>;

/// Everything except the RFC 3986 unreserved characters (`ALPHA`, `DIGIT`, `-`, `.`, `_`, `~`) is percent-encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

lazy_static! {
    /// A `%` that is not followed by two hex digits.
    static ref INVALID_HEX_ESCAPE: Regex = Regex::new(r"%(?:[^0-9A-Fa-f]|[0-9A-Fa-f](?:[^0-9A-Fa-f]|$)|$)").unwrap();

    /// Pattern for the start of an OAuth Authorization header.
    static ref OAUTH_SCHEME_RE: Regex = Regex::new(r"(?i)^\s*OAuth(?:\s+|$)").unwrap();

    /// Absolute URI: scheme, authority, path, then the query and fragment which are discarded.
    static ref ABSOLUTE_URI_RE: Regex =
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^/?#]*)([^?#]*)(?:\?[^#]*)?(?:#.*)?$").unwrap();
}

/// Options controlling which parameters [`collect_parameters`] gathers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectOptions {
    /// Keep the `realm` parameter from the `Authorization` header.
    pub with_realm: bool,

    /// Drop `oauth_signature` from every source.
    pub exclude_oauth_signature: bool,

    /// The caller has determined that the body is `application/x-www-form-urlencoded`, so its parameters are signed.
    pub form_urlencoded_body: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CollectOptions {
    /// Ignore the body and the realm; exclude the signature.
    pub const DEFAULT: Self = Self {
        with_realm: false,
        exclude_oauth_signature: true,
        form_urlencoded_body: false,
    };

    /// Create a `CollectOptions` for requests whose body is an HTML form.
    ///
    /// Content-type detection is the caller's job; bodies of other types must never be passed with this set, since
    /// they would be silently mis-signed.
    pub const fn form_body() -> Self {
        Self {
            form_urlencoded_body: true,
            ..Self::DEFAULT
        }
    }

    /// Return a copy of these options with `with_realm` set.
    pub const fn with_realm(self, with_realm: bool) -> Self {
        Self {
            with_realm,
            ..self
        }
    }

    /// Return a copy of these options with `exclude_oauth_signature` set.
    pub const fn exclude_oauth_signature(self, exclude_oauth_signature: bool) -> Self {
        Self {
            exclude_oauth_signature,
            ..self
        }
    }
}

/// Collect the signable parameters of a request (RFC 5849 §3.4.1.3.1).
///
/// Parameters are gathered from the query string, the `OAuth` `Authorization` header, and (when
/// `options.form_urlencoded_body` is set) the body, in that order. Duplicates are preserved.
///
/// # Errors
/// Returns [`SignatureError::InvalidText`] if a query or body component has a malformed percent escape or decodes to
/// something other than UTF-8, or if the `Authorization` header is not visible ASCII or uses a scheme other than
/// `OAuth`.
pub fn collect_parameters(
    query: Option<&str>,
    body: Option<&str>,
    headers: Option<&HeaderMap>,
    options: CollectOptions,
) -> Result<ParameterList, SignatureError> {
    let mut params = ParameterList::new();

    if let Some(query) = query {
        params.extend(decode_form_urlencoded(query)?);
    }

    if let Some(auth_header) = headers.and_then(|h| h.get(AUTHORIZATION)) {
        let auth_header = auth_header
            .to_str()
            .map_err(|_| SignatureError::InvalidText(MSG_AUTH_HEADER_NOT_TEXT.to_string()))?;
        params.extend(
            parse_authorization_header(auth_header)?
                .into_iter()
                .filter(|(name, _)| options.with_realm || name != REALM),
        );
    }

    if options.form_urlencoded_body {
        if let Some(body) = body {
            params.extend(decode_form_urlencoded(body)?);
        }
    }

    if options.exclude_oauth_signature {
        params.retain(|(name, _)| name != OAUTH_SIGNATURE);
    }

    trace!("Collected {} parameters", params.len());
    Ok(params)
}

/// Collect the signable parameters from HTTP request [`Parts`] and an optional body.
///
/// The body is only consulted when `options.form_urlencoded_body` is set.
pub fn collect_parameters_from_request_parts(
    parts: &Parts,
    body: Option<&str>,
    options: CollectOptions,
) -> Result<ParameterList, SignatureError> {
    collect_parameters(parts.uri.query(), body, Some(&parts.headers), options)
}

/// Normalize a request URI into the base string URI (RFC 5849 §3.4.1.2).
///
/// The scheme and host are lower-cased, a default port (80 for `http`, 443 for `https`) is removed, user information,
/// the query and the fragment are dropped. The path is kept exactly as given; an empty path stays empty.
///
/// # Errors
/// Returns [`SignatureError::InvalidText`] if `uri` is not an absolute URI with a host.
///
/// # Example
/// ```
/// use scratchstack_oauth1_signature::normalize_base_string_uri;
/// assert_eq!(normalize_base_string_uri("HTTP://Example.COM:80/r%20v?x=1#f").unwrap(), "http://example.com/r%20v");
/// ```
pub fn normalize_base_string_uri(uri: &str) -> Result<String, SignatureError> {
    let (scheme, authority, path) = split_absolute_uri(uri)?;
    build_base_string_uri(scheme, authority, path, uri)
}

/// Normalize a request URI into the base string URI, taking the authority from a `Host` header value instead of the
/// URI itself. `uri` may be absolute or origin-form (`/path?query`); an origin-form target with an empty path
/// (`?query` or the empty string) keeps the empty path.
///
/// # Errors
/// Returns [`SignatureError::InvalidText`] if the host is empty or `uri` cannot be split into a path.
pub fn normalize_base_string_uri_with_host(uri: &str, scheme: &str, host: &str) -> Result<String, SignatureError> {
    let path = if uri.is_empty() || uri.starts_with(['/', '?', '#']) {
        let end = uri.find(['?', '#']).unwrap_or(uri.len());
        &uri[..end]
    } else {
        split_absolute_uri(uri)?.2
    };

    build_base_string_uri(scheme, host, path, uri)
}

/// Normalize the request parameters into a single string (RFC 5849 §3.4.1.3.2).
///
/// Names and values are percent-encoded, sorted by name and then by value, and joined as `name=value` pairs separated
/// by `&`. The result does not depend on the input order.
pub fn normalize_parameters(parameters: &[Parameter]) -> String {
    let mut encoded: Vec<(String, String)> =
        parameters.iter().map(|(name, value)| (percent_encode(name), percent_encode(value))).collect();
    encoded.sort_unstable();

    let result = encoded.iter().map(|(name, value)| format!("{}={}", name, value)).collect::<Vec<String>>().join("&");
    trace!("Normalized parameters: {}", result);
    result
}

/// Construct the signature base string (RFC 5849 §3.4.1.1).
///
/// The method is upper-cased and the normalized URI and normalized parameters are percent-encoded once more before
/// being joined with `&`. The base string is therefore doubly encoded relative to the raw request.
///
/// All arguments are text; raw bytes are rejected at compile time:
/// ```compile_fail
/// use scratchstack_oauth1_signature::construct_base_string;
/// construct_base_string(b"POST", "http://example.com/request", "a=b");
/// ```
pub fn construct_base_string(method: &str, normalized_base_string_uri: &str, normalized_parameters: &str) -> String {
    let result = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(normalized_base_string_uri),
        percent_encode(normalized_parameters)
    );
    trace!("Signature base string: {}", result);
    result
}

/// Percent-encode a string using the RFC 3986 unreserved set (RFC 5849 §3.6).
///
/// ```
/// use scratchstack_oauth1_signature::percent_encode;
/// assert_eq!(percent_encode("just-a-string  ~"), "just-a-string%20%20~");
/// ```
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Percent-decode a string as UTF-8. `+` is left alone.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn percent_decode(value: &str) -> Result<String, SignatureError> {
    if INVALID_HEX_ESCAPE.is_match(value) {
        return Err(SignatureError::InvalidText(MSG_INVALID_HEX_ENCODING.to_string()));
    }

    percent_decode_str(value)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| SignatureError::InvalidText(MSG_INVALID_UTF8.to_string()))
}

/// Decode an `application/x-www-form-urlencoded` string (also used for query strings) into parameters. `+` decodes to
/// a space; a component without `=` has an empty value.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn decode_form_urlencoded(query: &str) -> Result<ParameterList, SignatureError> {
    let mut result = ParameterList::new();

    for component in query.split('&') {
        if component.is_empty() {
            continue;
        }

        let (name, value) = component.split_once('=').unwrap_or((component, ""));
        let name = percent_decode(&name.replace('+', " "))?;
        let value = percent_decode(&value.replace('+', " "))?;
        result.push((name, value));
    }

    Ok(result)
}

/// Parse an `OAuth` `Authorization` header value into its parameters, percent-decoding names and values.
///
/// Parameters are separated by commas outside of double quotes. Quotes around values are optional. `realm` is
/// returned like any other parameter.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn parse_authorization_header(auth_header: &str) -> Result<ParameterList, SignatureError> {
    let scheme = match OAUTH_SCHEME_RE.find(auth_header) {
        Some(scheme) => scheme,
        None => return Err(SignatureError::InvalidText(MSG_AUTH_HEADER_NOT_OAUTH.to_string())),
    };

    let mut result = ParameterList::new();
    for item in split_header_list(&auth_header[scheme.end()..]) {
        let item = item.trim();

        // Needed if we have no parameters at all, or a trailing comma.
        if item.is_empty() {
            continue;
        }

        let (name, value) = item.split_once('=').unwrap_or((item, ""));
        let value = value.trim();
        let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(quoted) => unescape_quoted_pairs(quoted),
            None => Cow::Borrowed(value),
        };
        result.push((percent_decode(name.trim())?, percent_decode(&value)?));
    }

    Ok(result)
}

/// Drop the backslash from each `\x` quoted-pair inside a quoted-string (RFC 7230 §3.2.6).
fn unescape_quoted_pairs(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            _ => result.push(c),
        }
    }

    Cow::Owned(result)
}

/// Split a comma-separated header list, ignoring commas inside double-quoted strings.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn split_header_list(value: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if in_quotes && c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            result.push(&value[start..i]);
            start = i + 1;
        }
    }

    result.push(&value[start..]);
    result
}

/// Split an absolute URI into its scheme, authority, and path.
fn split_absolute_uri(uri: &str) -> Result<(&str, &str, &str), SignatureError> {
    let captures = match ABSOLUTE_URI_RE.captures(uri) {
        Some(captures) => captures,
        None => return Err(SignatureError::InvalidText(format!("{}{}", MSG_URI_NOT_ABSOLUTE, uri))),
    };

    // All three groups are non-optional.
    match (captures.get(1), captures.get(2), captures.get(3)) {
        (Some(scheme), Some(authority), Some(path)) => Ok((scheme.as_str(), authority.as_str(), path.as_str())),
        _ => Err(SignatureError::InvalidText(format!("{}{}", MSG_URI_NOT_ABSOLUTE, uri))),
    }
}

/// Assemble `scheme://host[:port]path` with the default port removed.
fn build_base_string_uri(scheme: &str, authority: &str, path: &str, uri: &str) -> Result<String, SignatureError> {
    let scheme = scheme.to_ascii_lowercase();

    // Drop any user information.
    let host_port = authority.rsplit_once('@').map(|(_, hp)| hp).unwrap_or(authority);

    // IPv6 literals contain colons; only a colon after the closing bracket introduces a port.
    let (host, port) = match host_port.rfind(':') {
        Some(i) if !host_port[i..].contains(']') => (&host_port[..i], Some(&host_port[i + 1..])),
        _ => (host_port, None),
    };

    if host.is_empty() {
        return Err(SignatureError::InvalidText(format!("{}{}", MSG_URI_NOT_ABSOLUTE, uri)));
    }

    let host = host.to_lowercase();
    let port = match port {
        None | Some("") => None,
        Some(port) => match port.parse::<u16>() {
            Ok(DEFAULT_HTTP_PORT) if scheme == "http" => None,
            Ok(DEFAULT_HTTPS_PORT) if scheme == "https" => None,
            Ok(port) => Some(port),
            Err(_) => return Err(SignatureError::InvalidText(format!("Invalid port in URI: {}", uri))),
        },
    };

    let result = match port {
        Some(port) => format!("{}://{}:{}{}", scheme, host, port, path),
        None => format!("{}://{}{}", scheme, host, path),
    };

    trace!("Normalized base string URI: {}", result);
    Ok(result)
}
