use std::fmt::Display;

pub fn format_comma_delimited<I: IntoIterator<Item = T>, T: Display>(values: I) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
