//! URL slugs for articles and tags.

/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-` and trims dashes from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Article slug: the title followed by the article id, so two articles
/// with the same title never collide.
pub fn article_slug(title: &str, id: &uuid::Uuid) -> String {
    slugify(&format!("{} {}", title, id))
}
