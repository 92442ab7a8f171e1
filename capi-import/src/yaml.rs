use serde::de::DeserializeOwned;

pub fn from_str<T>(s: &str) -> serde_yaml::Result<T>
where
    T: DeserializeOwned,
{
    serde_yaml::from_str(s)
}

pub fn from_slice<T>(s: &[u8]) -> serde_yaml::Result<T>
where
    T: DeserializeOwned,
{
    serde_yaml::from_slice(s)
}

pub fn to_string<T>(value: &T) -> serde_yaml::Result<String>
where
    T: serde::Serialize,
{
    serde_yaml::to_string(value)
}

/// Makes sure there is exactly one newline at the end of a file.
pub fn ensure_newline(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    out.push_str(s.trim_end_matches('\n'));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_newline_normalizes_trailing_newlines() {
        assert_eq!(ensure_newline("a"), "a\n");
        assert_eq!(ensure_newline("a\n"), "a\n");
        assert_eq!(ensure_newline("a\n\n\n"), "a\n");
        assert_eq!(ensure_newline(""), "\n");
    }
}
