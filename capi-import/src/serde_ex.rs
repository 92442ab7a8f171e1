pub mod string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

pub mod regex {
    pub mod option {
        use ::regex::Regex;
        use serde::{Deserialize, Deserializer, de};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Regex>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let Some(pattern) = Option::<String>::deserialize(deserializer)? else {
                return Ok(None);
            };

            Regex::new(&pattern)
                .map(Some)
                .map_err(|err| de::Error::custom(format!("invalid pattern `{pattern}`: {err}")))
        }
    }
}
