//! Minimal CSV rendering.

use std::borrow::Cow;

/// Quote a field if it contains a comma, double quote or line break.
/// Embedded double quotes are doubled.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render one record as a CSV line terminated by `\n`.
pub fn render_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_untouched() {
        assert_eq!(escape_field("latte"), "latte");
        assert_eq!(render_line(&["a", "1", "true"]), "a,1,true\n");
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(escape_field("oat, large"), "\"oat, large\"");
        assert_eq!(escape_field("the \"house\" blend"), "\"the \"\"house\"\" blend\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }
}
