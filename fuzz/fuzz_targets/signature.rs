#![no_main]
use {
    arbitrary::Arbitrary,
    http::{Method, Request, Uri},
    libfuzzer_sys::{fuzz_target, Corpus},
    scratchstack_oauth1_signature::{
        collect_parameters, construct_base_string, normalize_base_string_uri, normalize_parameters, verify_hmac_sha1,
        verify_plaintext, CollectOptions, SignedRequest,
    },
    std::error::Error,
};

#[derive(Arbitrary, Debug)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct VerifyInput {
    method: HttpMethod,
    uri: String,
    authorization: String,
    host: String,
    body: String,
    form_body: bool,
    with_realm: bool,
    client_secret: String,
    resource_owner_secret: String,
}

fuzz_target!(|data: VerifyInput| -> Corpus {
    let result = run_target(data);
    result.map(|_| Corpus::Keep).unwrap_or(Corpus::Reject)
});

fn run_target(data: VerifyInput) -> Result<(), Box<dyn Error>> {
    let options = CollectOptions {
        form_urlencoded_body: data.form_body,
        ..CollectOptions::default()
    }
    .with_realm(data.with_realm);

    // Text that fails to parse must be rejected, never panic.
    if let Ok(params) = collect_parameters(Some(data.uri.as_str()), Some(data.body.as_str()), None, options) {
        let _ = normalize_parameters(&params);
    }
    if let Ok(uri) = normalize_base_string_uri(&data.uri) {
        let _ = construct_base_string("GET", &uri, "");
    }

    let uri = Uri::from_maybe_shared(data.uri)?;
    let method: Method = data.method.into();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Host", data.host)
        .header("Authorization", data.authorization)
        .body(())?;
    let (parts, _) = request.into_parts();

    let signed = SignedRequest::from_http_request_parts(&parts, Some(data.body.as_str()), "https", options)?;
    let _ = verify_hmac_sha1(&signed, &data.client_secret, &data.resource_owner_secret);
    let _ = verify_plaintext(&signed, &data.client_secret, &data.resource_owner_secret);
    Ok(())
}
