use uuid::Uuid;

/// Issue a fresh chat session id (UUID v4, hyphenated lowercase).
///
/// Nothing is persisted: a session exists once a message references it.
pub fn issue_chat_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_are_uuid_v4_text() {
        let id = issue_chat_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id, id.to_lowercase());
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: std::collections::HashSet<_> = (0..256).map(|_| issue_chat_id()).collect();
        assert_eq!(ids.len(), 256);
    }
}
