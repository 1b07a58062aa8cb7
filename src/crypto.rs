use {
    crate::{constants::SHA1_OUTPUT_LEN, SignatureError},
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    hmac::{Hmac, Mac},
    rsa::{
        pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
        pkcs8::{DecodePrivateKey, DecodePublicKey},
        Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
    },
    sha1::{Digest, Sha1},
};

type HmacSha1 = Hmac<Sha1>;

/// Wrapper function to form a HMAC-SHA1 operation using the RustCrypto `hmac` crate.
pub(crate) fn hmac_sha1(key: &[u8], value: &[u8]) -> Result<[u8; SHA1_OUTPUT_LEN], SignatureError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|e| SignatureError::Crypto(e.to_string().into()))?;
    mac.update(value);
    Ok(mac.finalize().into_bytes().into())
}

#[inline(always)]
pub(crate) fn sha1(value: &[u8]) -> [u8; SHA1_OUTPUT_LEN] {
    Sha1::digest(value).into()
}

/// Decode an RSA private key from PEM text. Both PKCS#1 (`RSA PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) are
/// accepted.
pub(crate) fn rsa_private_key_from_pem(pem: &str) -> Result<RsaPrivateKey, SignatureError> {
    match RsaPrivateKey::from_pkcs1_pem(pem) {
        Ok(key) => Ok(key),
        Err(_) => Ok(RsaPrivateKey::from_pkcs8_pem(pem)?),
    }
}

/// Decode an RSA public key from PEM text. Both SubjectPublicKeyInfo (`PUBLIC KEY`) and PKCS#1
/// (`RSA PUBLIC KEY`) are accepted.
pub(crate) fn rsa_public_key_from_pem(pem: &str) -> Result<RsaPublicKey, SignatureError> {
    match RsaPublicKey::from_public_key_pem(pem) {
        Ok(key) => Ok(key),
        Err(_) => Ok(RsaPublicKey::from_pkcs1_pem(pem)?),
    }
}

/// RSASSA-PKCS1-v1_5 signature over the SHA-1 digest of `value`.
pub(crate) fn rsa_sha1_sign(key: &RsaPrivateKey, value: &[u8]) -> Result<Vec<u8>, SignatureError> {
    Ok(key.sign(Pkcs1v15Sign::new::<Sha1>(), &sha1(value))?)
}

/// Verify an RSASSA-PKCS1-v1_5 signature over the SHA-1 digest of `value`.
pub(crate) fn rsa_sha1_verify(key: &RsaPublicKey, value: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
    Ok(key.verify(Pkcs1v15Sign::new::<Sha1>(), &sha1(value), signature)?)
}

#[inline(always)]
pub(crate) fn base64_encode(value: &[u8]) -> String {
    BASE64.encode(value)
}

#[inline(always)]
pub(crate) fn base64_decode(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(value)
}
