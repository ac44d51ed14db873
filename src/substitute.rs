//! Placeholder substitution for `${name}` spans.

use std::collections::HashMap;

/// Replace every `${name}` occurrence in `input` using `vars`.
///
/// Scanning is left to right. A span whose key exists in `vars` is
/// replaced by its value; a span with an unknown key is kept verbatim,
/// delimiters included. A `${` with no closing brace is treated as
/// literal text up to the end of the input. Pure function, no side
/// effects.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use xml_binder::substitute::substitute;
///
/// let vars = HashMap::from([("a".to_string(), "X".to_string())]);
/// assert_eq!(substitute("${a}", &vars), "X");
/// assert_eq!(substitute("${a}${b}", &vars), "X${b}");
/// assert_eq!(substitute("plain", &vars), "plain");
/// ```
#[must_use]
pub fn substitute(input: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    // unknown key: keep the whole span, delimiters included
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                // unterminated span is literal, unconsumed
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_placeholders_is_identity() {
        assert_eq!(substitute("no keys here", &vars(&[])), "no keys here");
        assert_eq!(substitute("", &vars(&[("a", "1")])), "");
    }

    #[test]
    fn test_single_replacement() {
        assert_eq!(substitute("${a}", &vars(&[("a", "X")])), "X");
        assert_eq!(substitute("v=${a}!", &vars(&[("a", "X")])), "v=X!");
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(
            substitute("${a}${b}", &vars(&[("a", "1"), ("b", "2")])),
            "12"
        );
    }

    #[test]
    fn test_unresolved_left_verbatim() {
        assert_eq!(substitute("${a}${b}", &vars(&[("a", "1")])), "1${b}");
        assert_eq!(substitute("${missing}", &vars(&[])), "${missing}");
    }

    #[test]
    fn test_unterminated_is_literal() {
        assert_eq!(substitute("${a", &vars(&[("a", "X")])), "${a");
        assert_eq!(substitute("x ${a} ${b", &vars(&[("a", "1")])), "x 1 ${b");
    }

    #[test]
    fn test_trailing_text_copied() {
        assert_eq!(
            substitute("${a} tail", &vars(&[("a", "head")])),
            "head tail"
        );
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(substitute("${}", &vars(&[])), "${}");
        assert_eq!(substitute("${}", &vars(&[("", "E")])), "E");
    }
}
