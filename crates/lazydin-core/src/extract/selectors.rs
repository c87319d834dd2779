use scraper::Selector;

/// CSS selectors used to pick a post card apart.
///
/// The defaults track the feed markup the search workflow returns. Every
/// selector is anchored at the `li` that wraps a single result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Link to the author's profile; its `href` is the author url
    pub author_link: String,
    pub author_name: String,
    pub author_description: String,
    /// Container carrying the `data-urn` post identifier
    pub post_container: String,
    pub post_body: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            author_link: "li div.update-components-actor div a.app-aware-link".to_string(),
            author_name:
                "li div.update-components-actor div .update-components-actor__title span span span"
                    .to_string(),
            author_description:
                "li div.update-components-actor div .update-components-actor__description"
                    .to_string(),
            post_container: "li div.feed-shared-update-v2".to_string(),
            post_body: "li div.update-components-text span.break-words".to_string(),
        }
    }
}

/// Selectors compiled once per extractor.
#[derive(Debug)]
pub(crate) struct CompiledSelectors {
    pub author_link: Selector,
    pub author_name: Selector,
    pub author_description: Selector,
    pub post_container: Selector,
    pub post_body: Selector,
}

impl CompiledSelectors {
    pub fn compile(selectors: &Selectors) -> crate::Result<Self> {
        Ok(Self {
            author_link: parse(&selectors.author_link)?,
            author_name: parse(&selectors.author_name)?,
            author_description: parse(&selectors.author_description)?,
            post_container: parse(&selectors.post_container)?,
            post_body: parse(&selectors.post_body)?,
        })
    }
}

fn parse(css: &str) -> crate::Result<Selector> {
    Selector::parse(css)
        .map_err(|e| crate::Error::Selector(format!("Invalid selector '{}': {:?}", css, e)))
}
