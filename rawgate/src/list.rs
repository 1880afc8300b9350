//! Parsing of delimited configuration lists.
//!
//! Pool and rule settings are written by hand into environment variables, so
//! the separator is forgiving: commas, any whitespace and stray quote
//! characters all split entries.

/// Split a raw configuration value into its non-empty entries, in order.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(is_separator)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Same as [`parse_list`] but accepts an unset value.
pub fn parse_optional_list(raw: Option<&str>) -> Vec<String> {
    raw.map(parse_list).unwrap_or_default()
}

fn is_separator(c: char) -> bool {
    c == ',' || c == '"' || c == '\'' || c.is_whitespace()
}
