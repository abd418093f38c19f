use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Derives a URL-safe slug from a human-readable name.
///
/// Lower-cases the input, strips diacritics (NFD decomposition followed by
/// dropping combining marks), collapses every run of non-alphanumeric
/// characters into a single hyphen and trims hyphens from both ends.
///
/// The function is idempotent: applying it to its own output is a no-op.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    for ch in input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Vestido Floral Ação", "vestido-floral-acao")]
    #[case("Calça Jeans Skinny", "calca-jeans-skinny")]
    #[case("  Blusa   Básica  ", "blusa-basica")]
    #[case("Saia-Midi (Nova!)", "saia-midi-nova")]
    #[case("ÉTÉ 2025", "ete-2025")]
    #[case("vestido-floral", "vestido-floral")]
    fn derives_expected_slugs(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn is_idempotent() {
        for input in ["Vestido Teste", "Ação & Reação", "--- já ---", ""] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn symbol_only_input_yields_empty_slug() {
        assert_eq!(slugify("!!! *** !!!"), "");
    }

    #[test]
    fn output_is_ascii_lowercase_and_hyphens() {
        let slug = slugify("Çamaço Über Größe 42");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
    }
}
