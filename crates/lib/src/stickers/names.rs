//! Name derivation from file and directory stems.

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn words(stem: &str) -> impl Iterator<Item = String> + '_ {
    stem.split(is_separator)
        .filter(|w| !w.is_empty())
        .map(capitalize)
}

/// `good_boy` -> `GoodBoy`.
pub fn camel_case(stem: &str) -> String {
    words(stem).collect()
}

/// `good_boy` -> `Good Boy`.
pub fn title_case(stem: &str) -> String {
    words(stem).collect::<Vec<_>>().join(" ")
}
