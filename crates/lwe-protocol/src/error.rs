/// Errors produced by the framing layer.
///
/// Routing misses and undersized sentences are *not* errors — they are
/// normal [`RelayAction::Drop`](crate::framer::RelayAction) outcomes.
#[derive(Debug, thiserror::Error)]
pub enum LweProtocolError {
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LweProtocolError {
    fn from(e: serde_json::Error) -> Self {
        LweProtocolError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config() {
        let err = LweProtocolError::Config("bad interface address".into());
        assert_eq!(err.to_string(), "invalid configuration: bad interface address");
    }
}
