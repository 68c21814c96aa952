//! SSML envelope.

/// Wrap text in a `<speak>` document, escaping XML metacharacters.
pub fn wrap_ssml(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    out.push_str("<speak>");
    for ch in text.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out.push_str("</speak>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            wrap_ssml("Nice work playing the Am chord!"),
            "<speak>Nice work playing the Am chord!</speak>"
        );
    }

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            wrap_ssml(" Strum <soft> & \"slow\" "),
            "<speak>Strum &lt;soft&gt; &amp; &quot;slow&quot;</speak>"
        );
        assert_eq!(wrap_ssml("couldn't"), "<speak>couldn&apos;t</speak>");
    }
}
