//! QR payloads printed on ID cards.
//!
//! A payload is a URL of the form `<public_url>/attend/<token>` where the
//! token is the URL-safe base64 of the student id. Scanning it at an event
//! lets the student self-mark without typing their id.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

const ATTEND_SEGMENT: &str = "/attend/";

pub fn payload_for(public_url: &str, student_id: &str) -> String {
    format!(
        "{}{}{}",
        public_url.trim_end_matches('/'),
        ATTEND_SEGMENT,
        URL_SAFE_NO_PAD.encode(student_id.trim())
    )
}

/// Recovers the student id from a scanned payload, or `None` if it is not one of ours.
pub fn student_id_from_payload(payload: &str) -> Option<String> {
    let (_, token) = payload.trim().rsplit_once(ATTEND_SEGMENT)?;
    let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('/')).ok()?;
    String::from_utf8(bytes).ok().filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_back_to_student() {
        let payload = payload_for("https://club.example.org/", "IEEE-93 01");
        assert!(payload.starts_with("https://club.example.org/attend/"));
        assert_eq!(student_id_from_payload(&payload).as_deref(), Some("IEEE-93 01"));
    }

    #[test]
    fn foreign_payloads_are_ignored() {
        assert_eq!(student_id_from_payload("https://example.org/other"), None);
        assert_eq!(student_id_from_payload("https://x/attend/!!!"), None);
        assert_eq!(student_id_from_payload("https://x/attend/"), None);
    }
}
