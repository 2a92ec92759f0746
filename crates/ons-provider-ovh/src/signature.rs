//! Request signing
//!
//! Every authenticated call carries `X-Ovh-Signature`:
//!
//! ```text
//! "$1$" + hex(sha1(AS + "+" + CK + "+" + METHOD + "+" + URL + "+" + BODY + "+" + TIMESTAMP))
//! ```
//!
//! where `URL` is the full request URL (query string included) and
//! `TIMESTAMP` is the server-adjusted Unix time also sent as
//! `X-Ovh-Timestamp`.

use sha1::{Digest, Sha1};

/// Compute the signature header value
pub fn sign(
    application_secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let mut hasher = Sha1::new();
    hasher.update(
        format!(
            "{}+{}+{}+{}+{}+{}",
            application_secret, consumer_key, method, url, body, timestamp
        )
        .as_bytes(),
    );
    format!("$1${:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_prefixed_sha1_hex() {
        let sig = sign(
            "secret",
            "consumer",
            "GET",
            "https://eu.api.ovh.com/1.0/domain/zone/example.com/record",
            "",
            1_700_000_000,
        );

        assert!(sig.starts_with("$1$"));
        assert_eq!(sig.len(), 3 + 40);
        assert!(sig[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_covers_every_part() {
        let base = sign("s", "c", "GET", "u", "", 1);
        assert_ne!(base, sign("s", "c", "POST", "u", "", 1));
        assert_ne!(base, sign("s", "c", "GET", "u", "{}", 1));
        assert_ne!(base, sign("s", "c", "GET", "u", "", 2));
        assert_eq!(base, sign("s", "c", "GET", "u", "", 1));
    }

    #[test]
    fn matches_known_digest() {
        // sha1("a+b+GET+u++0")
        assert_eq!(
            sign("a", "b", "GET", "u", "", 0),
            "$1$0ed323982bedc2f62487156f3c55ac07fa2d30aa"
        );
    }
}
