//! Turns raw post-card HTML into [`Content`] records.
//!
//! Two outcomes are possible for a fragment that parses:
//! - no author link (or the link has no `href`): the fragment is not a real
//!   post card (promoted or system entry) and is skipped
//! - an author but no `data-urn` on the post container: the markup no longer
//!   matches what we expect, and the whole batch fails
//!
//! Nothing is returned from a batch that fails.

mod selectors;

pub use selectors::Selectors;

use crate::model::{Author, Content, Post};
use scraper::{ElementRef, Html, Selector};
use selectors::CompiledSelectors;

/// Attribute on the post container holding the unique post token
const POST_ID_ATTR: &str = "data-urn";

/// Extract content from fragments using the default selectors.
pub fn extract_content<S: AsRef<str>>(fragments: &[S]) -> crate::Result<Vec<Content>> {
    ContentExtractor::new()?.extract(fragments)
}

pub struct ContentExtractor {
    selectors: CompiledSelectors,
}

impl ContentExtractor {
    /// Create an extractor with the default selectors
    pub fn new() -> crate::Result<Self> {
        Self::with_selectors(&Selectors::default())
    }

    /// Create an extractor with custom selectors
    pub fn with_selectors(selectors: &Selectors) -> crate::Result<Self> {
        Ok(Self {
            selectors: CompiledSelectors::compile(selectors)?,
        })
    }

    /// Extract one `Content` per post card, in input order.
    pub fn extract<S: AsRef<str>>(&self, fragments: &[S]) -> crate::Result<Vec<Content>> {
        tracing::debug!("Extracting content from {} fragments", fragments.len());

        let mut contents = Vec::with_capacity(fragments.len());

        for (index, fragment) in fragments.iter().enumerate() {
            let dom = Html::parse_document(fragment.as_ref());

            let Some(author) = self.extract_author(&dom) else {
                tracing::debug!("Fragment {} has no author link, skipping", index);
                continue;
            };

            let post = self
                .extract_post(&dom)
                .ok_or(crate::Error::MissingPostIdentifier { index })?;

            contents.push(Content::new(post, author));
        }

        tracing::info!(
            "Extracted {} posts from {} fragments",
            contents.len(),
            fragments.len()
        );

        Ok(contents)
    }

    /// Read the author block. `None` when there is no author link `href`.
    pub fn extract_author(&self, dom: &Html) -> Option<Author> {
        let url = first(dom, &self.selectors.author_link)?
            .value()
            .attr("href")?
            .to_string();

        Some(Author::new(
            url,
            first_text(dom, &self.selectors.author_name),
            first_text(dom, &self.selectors.author_description),
        ))
    }

    /// Read the post block. `None` when the post identifier is missing.
    ///
    /// `author_url` is left empty; [`Content::new`] fills it in.
    pub fn extract_post(&self, dom: &Html) -> Option<Post> {
        let url = first(dom, &self.selectors.post_container)?
            .value()
            .attr(POST_ID_ATTR)?
            .to_string();

        Some(Post::new(
            url,
            first_text(dom, &self.selectors.post_body),
            String::new(),
        ))
    }
}

fn first<'a>(dom: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    dom.select(selector).next()
}

/// Trimmed text of the first match, or an empty string
fn first_text(dom: &Html, selector: &Selector) -> String {
    first(dom, selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
