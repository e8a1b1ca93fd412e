/// Quote a name for use in diagnostics.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and converts each word
///   so that its first letter is uppercase and the rest lowercase.
/// - If the string does not contain underscores and is fully uppercase, it converts it
///   so that only the first letter is uppercase and the rest are lowercase.
/// - Otherwise, it ensures only the first letter is uppercase.
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => {
                first.to_uppercase().to_string() + &chars.as_str().to_lowercase()
            }
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| capitalize(word, true))
            .collect::<String>()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

const RUST_KEYWORDS: [&str; 38] = [
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
    "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    if RUST_KEYWORDS.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}
