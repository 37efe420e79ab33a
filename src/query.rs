use std::fmt;

/// Insertion-ordered `application/x-www-form-urlencoded` query builder.
///
/// Serializes the way browsers serialize `URLSearchParams`, so the account
/// creation service sees the same URL the web plugin would produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `base?query`, or just `base` when nothing was set
    pub fn append_to(&self, base: &str) -> String {
        if self.is_empty() {
            return base.to_string();
        }
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}", base, separator, self)
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", form_urlencode(key), form_urlencode(value))?;
        }
        Ok(())
    }
}

fn form_urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_url_search_params() {
        let mut qs = QueryString::new();
        qs.set("scope", "Test App")
            .set("owner_key", "PUB_K1_abc")
            .set("odd", "a&b=c/d~é");
        assert_eq!(
            qs.to_string(),
            "scope=Test+App&owner_key=PUB_K1_abc&odd=a%26b%3Dc%2Fd%7E%C3%A9"
        );
    }

    #[test]
    fn set_replaces_in_place() {
        let mut qs = QueryString::new();
        qs.set("a", "1").set("b", "2").set("a", "3");
        assert_eq!(qs.to_string(), "a=3&b=2");
    }

    #[test]
    fn appends_to_base_url() {
        let mut qs = QueryString::new();
        assert_eq!(qs.append_to("https://x.test/buy"), "https://x.test/buy");
        qs.set("k", "v");
        assert_eq!(qs.append_to("https://x.test/buy"), "https://x.test/buy?k=v");
        assert_eq!(
            qs.append_to("https://x.test/buy?ref=1"),
            "https://x.test/buy?ref=1&k=v"
        );
    }
}
