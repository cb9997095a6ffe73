use std::fmt;

/// Two-character NMEA 0183 talker identifier, e.g. `GP` in `$GPGLL`.
///
/// Extracted from the two bytes immediately after the sentence-start
/// delimiter (`$` or `!`), before the three-character formatter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TalkerId([u8; 2]);

impl TalkerId {
    /// Extract the talker identifier from a raw sentence.
    ///
    /// Returns `None` for sentences shorter than 3 bytes or with
    /// non-ASCII bytes in the talker position — such sentences never
    /// match a transmission group and are dropped by the framer.
    pub fn from_sentence(sentence: &str) -> Option<Self> {
        let bytes = sentence.as_bytes();
        if bytes.len() < 3 {
            return None;
        }
        let pair = [bytes[1], bytes[2]];
        if !pair[0].is_ascii() || !pair[1].is_ascii() {
            return None;
        }
        Some(Self(pair))
    }

    /// Build a talker identifier from a 2-character ASCII string.
    ///
    /// Used when keying the registry from the static group table.
    pub fn from_pair(pair: &str) -> Option<Self> {
        let bytes = pair.as_bytes();
        if bytes.len() != 2 || !bytes[0].is_ascii() || !bytes[1].is_ascii() {
            return None;
        }
        Some(Self([bytes[0], bytes[1]]))
    }

    pub fn as_str(&self) -> &str {
        // ASCII by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for TalkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_talker_after_delimiter() {
        let talker = TalkerId::from_sentence("$GPGLL,5321.45,N,00630.12,W*6D").unwrap();
        assert_eq!(talker.as_str(), "GP");
    }

    #[test]
    fn extracts_talker_from_encapsulated_sentence() {
        let talker = TalkerId::from_sentence("!AIVDM,1,1,,A,14eG;o@034o8,0*7D").unwrap();
        assert_eq!(talker.as_str(), "AI");
    }

    #[test]
    fn undersized_sentences_yield_none() {
        assert!(TalkerId::from_sentence("").is_none());
        assert!(TalkerId::from_sentence("$").is_none());
        assert!(TalkerId::from_sentence("$G").is_none());
    }

    #[test]
    fn exactly_three_bytes_is_enough() {
        let talker = TalkerId::from_sentence("$GP").unwrap();
        assert_eq!(talker.as_str(), "GP");
    }

    #[test]
    fn non_ascii_talker_yields_none() {
        assert!(TalkerId::from_sentence("$é,").is_none());
    }

    #[test]
    fn from_pair_requires_two_chars() {
        assert!(TalkerId::from_pair("GP").is_some());
        assert!(TalkerId::from_pair("G").is_none());
        assert!(TalkerId::from_pair("GPS").is_none());
    }

    #[test]
    fn display_matches_pair() {
        let talker = TalkerId::from_pair("ZA").unwrap();
        assert_eq!(talker.to_string(), "ZA");
    }
}
