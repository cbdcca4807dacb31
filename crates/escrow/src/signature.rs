//! Gateway callback signature verification
//!
//! The gateway signs its payment callbacks with a keyed hash over
//! `orderId|paymentId`. Verification recomputes the expected value with
//! the shared secret and compares.

use sha2::{Digest, Sha256};

/// Compute the expected callback signature
pub fn expected_signature(key_secret: &str, order_id: &str, gateway_payment_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key_secret.as_bytes());
    hasher.update(b"|");
    hasher.update(order_id.as_bytes());
    hasher.update(b"|");
    hasher.update(gateway_payment_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a supplied callback signature
pub fn verify_signature(
    key_secret: &str,
    order_id: &str,
    gateway_payment_id: &str,
    supplied: &str,
) -> bool {
    expected_signature(key_secret, order_id, gateway_payment_id) == supplied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_signature_deterministic() {
        let a = expected_signature("secret", "order_1", "pay_1");
        let b = expected_signature("secret", "order_1", "pay_1");
        assert_eq!(a, b);
        // 32-byte SHA-256 as hex
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_varies_with_inputs() {
        let base = expected_signature("secret", "order_1", "pay_1");
        assert_ne!(base, expected_signature("other", "order_1", "pay_1"));
        assert_ne!(base, expected_signature("secret", "order_2", "pay_1"));
        assert_ne!(base, expected_signature("secret", "order_1", "pay_2"));
    }

    #[test]
    fn test_verify() {
        let sig = expected_signature("secret", "order_1", "pay_1");
        assert!(verify_signature("secret", "order_1", "pay_1", &sig));
        assert!(!verify_signature("secret", "order_1", "pay_1", "bogus"));
    }
}
