//! URL slug derivation, used for firm and term lookup keys.

/// Lowercase a name into a dash-separated slug: ASCII alphanumerics pass
/// through lowercased, every other run of characters collapses to a single
/// dash, with no leading or trailing dash.
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in input.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}
