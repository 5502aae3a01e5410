//! Text normalization for search tokens.
//!
//! Turns raw field values into the lowercase, whitespace-collapsed form that
//! is stored in the index and compared against queries. Punctuation is kept
//! by default so identifiers like `BFL-001` stay matchable verbatim;
//! [`NormalizeOptions::strip_punctuation`] replaces it with spaces instead.
//!
//! Every function here is pure and total, and normalizing an already
//! normalized string returns it unchanged.

/// Knobs for [`normalize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Replace every non-alphanumeric, non-whitespace character with a space.
    pub strip_punctuation: bool,
}

/// Normalize with the default policy (punctuation kept).
pub fn normalize(text: &str) -> String {
    normalize_with(text, NormalizeOptions::default())
}

/// Lowercase, optionally strip punctuation, trim, and collapse whitespace runs
/// to a single space.
pub fn normalize_with(text: &str, opts: NormalizeOptions) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for word in lowered.split_whitespace() {
        let word: String = if opts.strip_punctuation {
            word.chars()
                .map(|c| if c.is_alphanumeric() { c } else { ' ' })
                .collect()
        } else {
            word.to_string()
        };

        for piece in word.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(piece);
        }
    }

    out
}

/// Normalize each present field independently and join the non-empty ones
/// with single spaces.
pub fn combine_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    combine_fields_with(fields, NormalizeOptions::default())
}

/// [`combine_fields`] with explicit normalization options.
pub fn combine_fields_with<'a, I>(fields: I, opts: NormalizeOptions) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fields
        .into_iter()
        .flatten()
        .filter(|f| !f.is_empty())
        .map(|f| normalize_with(f, opts))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIP: NormalizeOptions = NormalizeOptions {
        strip_punctuation: true,
    };

    #[test]
    fn test_lowercases_and_collapses() {
        assert_eq!(normalize("  Brass   Floor\tLamp \n"), "brass floor lamp");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn test_keeps_punctuation_by_default() {
        assert_eq!(normalize("SKU: BFL-001"), "sku: bfl-001");
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(normalize_with("SKU: BFL-001", STRIP), "sku bfl 001");
        assert_eq!(normalize_with("--", STRIP), "");
        assert_eq!(normalize_with("Café & Bar", STRIP), "café bar");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "Oak  Coffee\tTable",
            "BFL-001 / Brass",
            "ÀÉÎ ünïcödé   Mixed CASE",
            "line\nbreaks\r\nand\u{00a0}nbsp",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
            let once = normalize_with(s, STRIP);
            assert_eq!(normalize_with(&once, STRIP), once, "strip not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_combine_skips_empties() {
        let fields = [Some(""), None, Some("  "), Some("Sofa")];
        assert_eq!(combine_fields(fields), "sofa");
    }

    #[test]
    fn test_combine_preserves_order() {
        let fields = [Some("Oak Table"), None, Some("OT-9"), Some(" Acme ")];
        assert_eq!(combine_fields(fields), "oak table ot-9 acme");
    }

    #[test]
    fn test_combine_drops_fields_emptied_by_stripping() {
        let fields = [Some("---"), Some("Lamp")];
        assert_eq!(combine_fields_with(fields, STRIP), "lamp");
    }
}
