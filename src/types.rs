use std::fmt;

/// Primary key of a row in the posts table.
pub type PostId = u64;

/// Key addressing a post in the content store.
///
/// The keyed form renders as `<post_id>_<slug>` and only matches a record when
/// both halves agree, so renaming a post invalidates every identifier that
/// still carries the old slug. The bare form carries only a slug and is what a
/// path without a numeric prefix decodes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId {
    post_id: Option<PostId>,
    slug: String,
}

impl ContentId {
    pub fn keyed(post_id: PostId, slug: impl Into<String>) -> Self {
        Self { post_id: Some(post_id), slug: slug.into() }
    }

    pub fn slug_only(slug: impl Into<String>) -> Self {
        Self { post_id: None, slug: slug.into() }
    }

    pub fn post_id(&self) -> Option<PostId> {
        self.post_id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn is_keyed(&self) -> bool {
        self.post_id.is_some()
    }

    /// Same post id, different slug. Used to describe a record after rename.
    pub fn with_slug(&self, slug: impl Into<String>) -> Self {
        Self { post_id: self.post_id, slug: slug.into() }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.post_id {
            Some(id) => write!(f, "{}_{}", id, self.slug),
            None => f.write_str(&self.slug),
        }
    }
}

/// Splits a `<digits>_<rest>` name into its numeric prefix and the remainder.
pub fn split_id_prefix(name: &str) -> Option<(PostId, &str)> {
    let (digits, rest) = name.split_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id = digits.parse().ok()?;
    Some((id, rest))
}
