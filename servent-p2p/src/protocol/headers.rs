//! Handshake header parsing.

use std::collections::HashMap;

/// Synthetic key holding the status line.
pub const TITLE: &str = "Title";

/// Headers of a handshake response, keyed exactly as transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeHeaders {
    entries: HashMap<String, String>,
}

impl HandshakeHeaders {
    /// Parse a raw response.
    ///
    /// Only the header block is considered: parsing stops at the first empty
    /// line. Rules, per line:
    /// - starts with a space or tab: continuation, appended to the last key
    ///   with a single space
    /// - the status line (starts with `GNUTELLA`, or has no colon): stored
    ///   under [`TITLE`]
    /// - `Key: Value`: a header; a repeated key appends `,Value`
    pub fn parse(raw: &str) -> Self {
        let block = match raw.find("\r\n\r\n") {
            Some(end) => &raw[..end],
            None => raw,
        };

        let mut headers = Self::default();
        let mut last_key: Option<&str> = None;

        for line in block.trim().split("\r\n") {
            if line.is_empty() {
                continue;
            }

            if line.starts_with([' ', '\t']) {
                if let Some(value) = last_key.and_then(|key| headers.entries.get_mut(key)) {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            match line.split_once(':') {
                Some((key, value)) if !line.starts_with("GNUTELLA") => {
                    let value = value.strip_prefix(' ').unwrap_or(value);
                    headers.append(key, value);
                    last_key = Some(key);
                }
                _ => {
                    headers.entries.insert(TITLE.to_string(), line.to_string());
                }
            }
        }

        headers
    }

    fn append(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(value);
            }
            None => {
                self.entries.insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Look up a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// The status line, or an empty string when none was sent.
    pub fn title(&self) -> &str {
        self.get(TITLE).unwrap_or_default()
    }

    /// Whether `name` is present with a `True` value (any case).
    pub fn is_true(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Iterate over all entries, status line included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries, status line included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_folding() {
        let headers =
            HandshakeHeaders::parse("Title: 200 OK\r\nX-Try: 1.2.3.4:6346\r\n X-extra\r\n\r\n");

        assert_eq!(headers.get("Title"), Some("200 OK"));
        assert_eq!(headers.get("X-Try"), Some("1.2.3.4:6346 X-extra"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_status_line() {
        let headers = HandshakeHeaders::parse(
            "GNUTELLA/0.6 200 OK\r\nUser-Agent: Shareaza 2.7\r\nX-Ultrapeer: True\r\n\r\n",
        );

        assert_eq!(headers.title(), "GNUTELLA/0.6 200 OK");
        assert_eq!(headers.get("User-Agent"), Some("Shareaza 2.7"));
        assert!(headers.is_true("X-Ultrapeer"));
    }

    #[test]
    fn test_status_line_with_colon() {
        let headers = HandshakeHeaders::parse("GNUTELLA/0.6 503 Busy: try later\r\n\r\n");
        assert_eq!(headers.title(), "GNUTELLA/0.6 503 Busy: try later");
    }

    #[test]
    fn test_repeated_keys_join_with_comma() {
        let headers = HandshakeHeaders::parse(
            "GNUTELLA/0.6 200 OK\r\nX-Try: 1.1.1.1:6346\r\nX-Try: 2.2.2.2:6346\r\n\r\n",
        );
        assert_eq!(headers.get("X-Try"), Some("1.1.1.1:6346,2.2.2.2:6346"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let headers = HandshakeHeaders::parse("GNUTELLA/0.6 200 OK\r\nx-try: 1.1.1.1:6346\r\n\r\n");
        assert_eq!(headers.get("X-Try"), None);
        assert_eq!(headers.get("x-try"), Some("1.1.1.1:6346"));
    }

    #[test]
    fn test_value_keeps_colons() {
        let headers = HandshakeHeaders::parse("GNUTELLA/0.6 200 OK\r\nRemote-IP: 10.0.0.1:6346\r\n");
        assert_eq!(headers.get("Remote-IP"), Some("10.0.0.1:6346"));
    }

    #[test]
    fn test_stops_at_blank_line() {
        let headers =
            HandshakeHeaders::parse("GNUTELLA/0.6 200 OK\r\nX-Hub: True\r\n\r\nbinary: junk\r\n");
        assert_eq!(headers.get("binary"), None);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_continuation_without_key_is_dropped() {
        let headers = HandshakeHeaders::parse("GNUTELLA/0.6 200 OK\r\n\tstray\r\n\r\n");
        assert_eq!(headers.title(), "GNUTELLA/0.6 200 OK");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let headers = HandshakeHeaders::parse("");
        assert!(headers.is_empty());
        assert_eq!(headers.title(), "");
    }
}
