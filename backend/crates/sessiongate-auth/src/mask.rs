/// Redact a session identifier for logging.
///
/// Identifiers of up to eight characters become `****`. Longer ones keep
/// their first and last four characters around `****`.
pub fn mask_session_id(session_id: &str) -> String {
    let count = session_id.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let head: String = session_id.chars().take(4).collect();
    let tail: String = session_id.chars().skip(count - 4).collect();
    format!("{head}****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_session_id() {
        assert_eq!(mask_session_id(""), "****");
        assert_eq!(mask_session_id("abcdefgh"), "****");
        assert_eq!(mask_session_id("abcdefghi"), "abcd****fghi");
        assert_eq!(
            mask_session_id("k3x9q2m1p8z7w6v5u4t3s2r1"),
            "k3x9****s2r1"
        );
    }

    #[test]
    fn test_mask_counts_characters() {
        assert_eq!(mask_session_id("ééééééééé"), "éééé****éééé");
    }
}
