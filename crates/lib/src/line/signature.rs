//! Webhook signature: base64(HMAC-SHA256(channel secret, raw body)).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on every webhook POST.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn keyed_mac(secret: &str) -> Result<HmacSha256, InvalidLength> {
    HmacSha256::new_from_slice(secret.as_bytes())
}

/// Canonical signature for `body` under `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = keyed_mac(secret)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// True when `header` is the signature of exactly these body bytes. A missing header,
/// an empty secret, or a header that is not base64 is treated as invalid.
pub fn verify(secret: &str, body: &[u8], header: Option<&str>) -> bool {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return false;
    };
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = STANDARD.decode(header) else {
        return false;
    };
    let Ok(mut mac) = keyed_mac(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel-secret";
    const BODY: &[u8] = br#"{"destination":"U1","events":[]}"#;

    #[test]
    fn accepts_own_signature() {
        let sig = sign(SECRET, BODY).expect("sign");
        assert!(verify(SECRET, BODY, Some(&sig)));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2, base64 of 5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843
        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?").expect("sign"),
            "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM="
        );
    }

    #[test]
    fn any_single_byte_mutation_rejects() {
        let sig = sign(SECRET, BODY).expect("sign");
        for i in 0..BODY.len() {
            let mut mutated = BODY.to_vec();
            mutated[i] ^= 0x01;
            assert!(!verify(SECRET, &mutated, Some(&sig)), "byte {} flip accepted", i);
        }
    }

    #[test]
    fn wrong_secret_rejects() {
        let sig = sign("other-secret", BODY).expect("sign");
        assert!(!verify(SECRET, BODY, Some(&sig)));
    }

    #[test]
    fn missing_header_or_secret_rejects() {
        let sig = sign(SECRET, BODY).expect("sign");
        assert!(!verify(SECRET, BODY, None));
        assert!(!verify(SECRET, BODY, Some("")));
        assert!(!verify("", BODY, Some(&sig)));
    }

    #[test]
    fn any_key_length_signs() {
        let long_key = "k".repeat(200);
        for secret in ["", "k", long_key.as_str()] {
            let sig = sign(secret, BODY).expect("hmac takes keys of any length");
            assert_eq!(STANDARD.decode(&sig).expect("base64").len(), 32);
        }
        let long_sig = sign(&long_key, BODY).expect("sign");
        assert!(verify(&long_key, BODY, Some(&long_sig)));
    }

    #[test]
    fn garbage_header_rejects() {
        assert!(!verify(SECRET, BODY, Some("not base64 !!")));
        assert!(!verify(SECRET, BODY, Some("AAAA")));
    }
}
