//! Quote-aware argument splitting.

/// Split command text into a name and its arguments.
///
/// Whitespace separates arguments except inside double quotes. Quote
/// characters are removed from the output, an unterminated quote runs to the
/// end of the input, and empty tokens are dropped.
pub fn split(data: &str) -> Option<(String, Vec<String>)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in data.chars() {
        match c {
            '"' => quoted = !quoted,
            ' ' | '\t' if !quoted => push_token(&mut tokens, &mut current),
            c => current.push(c),
        }
    }
    push_token(&mut tokens, &mut current);

    let mut tokens = tokens.into_iter();
    let name = tokens.next()?;
    Some((name, tokens.collect()))
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_argument() {
        let (name, args) = split(r#"cmd "multi word" arg2"#).unwrap();
        assert_eq!(name, "cmd");
        assert_eq!(args, vec!["multi word", "arg2"]);
    }

    #[test]
    fn collapses_whitespace() {
        let (name, args) = split("  say \t  hello   world ").unwrap();
        assert_eq!(name, "say");
        assert_eq!(args, vec!["hello", "world"]);
    }

    #[test]
    fn unterminated_quote_takes_rest() {
        let (_, args) = split(r#"echo "one two three"#).unwrap();
        assert_eq!(args, vec!["one two three"]);
    }

    #[test]
    fn empty_quotes_are_dropped() {
        let (_, args) = split(r#"echo "" x"#).unwrap();
        assert_eq!(args, vec!["x"]);
    }

    #[test]
    fn nothing_to_split() {
        assert!(split("").is_none());
        assert!(split("   ").is_none());
    }
}
