use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::repository::SignatureVerifier;

type HmacSha256 = Hmac<Sha256>;

/// Checks `x-payment-signature`: lowercase or uppercase hex of
/// HMAC-SHA256(raw body, secret).
#[derive(Clone)]
pub struct HmacVerifier {
    pub secret: String,
}

impl HmacVerifier {
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl SignatureVerifier for HmacVerifier {
    fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return false;
        };
        mac.update(body);
        // verify_slice compares in constant time.
        mac.verify_slice(&expected).is_ok()
    }
}
