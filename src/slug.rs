//! Slug and listing-text utilities.
//!
//! A slug is the normalized, URL-safe identifier derived from an artwork
//! filename or title ("Il Cavallo Spettrale.png" -> "cavallo-spettrale");
//! every asset, composition and ledger entry for a product is keyed by it.

const LEADING_ARTICLES: [&str; 8] = ["il ", "la ", "lo ", "gli ", "le ", "un ", "una ", "uno "];

const LOWERCASE_PARTICLES: [&str; 19] = [
    "del", "della", "dell", "dello", "dei", "degli", "delle", "di", "da", "in", "con", "su", "per",
    "tra", "fra", "a", "e", "o", "ed",
];

/// Derive a kebab-case slug from a filename or free-form title.
pub fn kebab_slug(name: &str) -> String {
    let stem = strip_extension(name);
    let folded: String = stem.chars().map(fold_accent).collect();
    let mut lower = folded.to_lowercase();

    for article in LEADING_ARTICLES {
        if let Some(rest) = lower.strip_prefix(article) {
            lower = rest.to_string();
            break;
        }
    }

    let cleaned: String = lower
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Rebuild a display title from a slug, capped at `max_words` words.
/// Italian particles stay lowercase except in leading position.
pub fn title_from_slug(slug: &str, max_words: usize) -> String {
    let words: Vec<&str> = slug.split('-').filter(|w| !w.is_empty()).collect();
    let mut out = Vec::new();
    for word in words.into_iter().take(max_words) {
        if !out.is_empty() && LOWERCASE_PARTICLES.contains(&word) {
            out.push(word.to_string());
        } else {
            out.push(capitalize(word));
        }
    }
    out.join(" ")
}

/// Derive a slug that does not collide with `taken`, suffixing `-2`, `-3`, ...
pub fn unique_slug(name: &str, taken: &[String]) -> String {
    let base = kebab_slug(name);
    if !taken.iter().any(|s| *s == base) {
        return base;
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.iter().any(|s| *s == candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Structural check on a derived slug.
#[derive(Clone, Debug, Default)]
pub struct SlugReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn validate_slug(slug: &str) -> SlugReport {
    let mut report = SlugReport {
        valid: true,
        ..SlugReport::default()
    };

    if slug.len() < 3 {
        report.valid = false;
        report.issues.push("slug shorter than 3 characters".to_string());
    } else if slug.len() > 50 {
        report
            .warnings
            .push("slug longer than 50 characters".to_string());
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        report.valid = false;
        report
            .issues
            .push("characters outside [a-z0-9-]".to_string());
    }

    if slug.contains("--") {
        report.valid = false;
        report.issues.push("consecutive hyphens".to_string());
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        report.valid = false;
        report.issues.push("leading or trailing hyphen".to_string());
    }

    report
}

/// Storefront listing name, e.g. "OnlyOne — Cavallo Spettrale — T-Shirt".
pub fn listing_title(brand: &str, title: &str, product_type: &str) -> String {
    let type_name = match product_type {
        "tshirt" => "T-Shirt".to_string(),
        "hoodie" => "Hoodie".to_string(),
        "sweatshirt" => "Sweatshirt".to_string(),
        other => capitalize(other),
    };
    format!("{brand} — {title} — {type_name}")
}

/// Long-form listing description for a one-of-one drop.
pub fn listing_description(brand: &str, title: &str) -> String {
    format!(
        "{brand} — {title}\n\n\
         A unique piece, created exactly once.\n\
         The moment it becomes yours, it disappears from the store forever.\n\n\
         Premium materials, museum-grade print quality.\n\
         Limited edition: 1 piece available.\n\n\
         {title} is meant to stay one of a kind.\n\n\
         — The Only One —"
    )
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(['/', '\\']) => stem,
        _ => name,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Fold common Latin accented characters to their ASCII base letter.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_filename_drops_article_and_extension() {
        assert_eq!(kebab_slug("Il Cavallo Spettrale.png"), "cavallo-spettrale");
        assert_eq!(kebab_slug("Farfalla Cosmica.jpg"), "farfalla-cosmica");
    }

    #[test]
    fn slug_folds_accents_and_punctuation() {
        assert_eq!(kebab_slug("Città  di---Notte!.png"), "citta-di-notte");
        assert_eq!(kebab_slug("L'Éclair"), "l-eclair");
    }

    #[test]
    fn slug_handles_dotless_names() {
        assert_eq!(kebab_slug("Guardiano"), "guardiano");
    }

    #[test]
    fn title_from_slug_caps_words_and_keeps_particles_low() {
        assert_eq!(
            title_from_slug("guardiano-dell-obelisco", 4),
            "Guardiano dell Obelisco"
        );
        assert_eq!(title_from_slug("cavallo-spettrale", 4), "Cavallo Spettrale");
    }

    #[test]
    fn title_from_slug_caps_word_count() {
        assert_eq!(title_from_slug("volpe-e-luna-di-mare", 4), "Volpe e Luna di");
    }

    #[test]
    fn unique_slug_suffixes_on_collision() {
        let taken = vec!["volpe".to_string(), "volpe-2".to_string()];
        assert_eq!(unique_slug("Volpe.png", &taken), "volpe-3");
        assert_eq!(unique_slug("Lepre.png", &taken), "lepre");
    }

    #[test]
    fn validate_slug_flags_structural_issues() {
        assert!(validate_slug("cavallo-spettrale").valid);
        assert!(!validate_slug("ab").valid);
        assert!(!validate_slug("has--double").valid);
        assert!(!validate_slug("-edge").valid);
        assert!(!validate_slug("Upper").valid);
    }

    #[test]
    fn listing_title_formats_known_types() {
        assert_eq!(
            listing_title("OnlyOne", "Cavallo Spettrale", "tshirt"),
            "OnlyOne — Cavallo Spettrale — T-Shirt"
        );
    }
}
