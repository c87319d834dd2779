//! Login and search as an explicit state machine over [`BrowserDriver`].
//!
//! Every operation is validated against the current [`SessionState`] before
//! the browser is touched, then runs its steps in order. The first failing
//! step aborts the operation with [`Error::StepFailed`], and the machine goes
//! back to the state it started the operation in.

use crate::driver::{BrowserDriver, Locator};
use crate::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    SearchResultsReady,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated => "authenticated",
            SessionState::SearchResultsReady => "search results ready",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// URLs and element locators of the site being automated
#[derive(Debug, Clone)]
pub struct SiteMap {
    pub home_url: String,
    pub login_url: String,
    pub feed_url: String,
    pub username_field: Locator,
    pub password_field: Locator,
    pub submit_button: Locator,
    /// Global search box; its presence also marks a successful login
    pub search_box: Locator,
    pub posts_filter: Locator,
    pub result_items: Locator,
    pub profile_actions: Locator,
}

impl Default for SiteMap {
    fn default() -> Self {
        Self {
            home_url: "https://linkedin.com".to_string(),
            login_url: "https://linkedin.com/login".to_string(),
            feed_url: "https://www.linkedin.com/feed".to_string(),
            username_field: Locator::css("input#username"),
            password_field: Locator::css("input#password"),
            submit_button: Locator::css("button[type='submit']"),
            search_box: Locator::css("input[placeholder='Search']"),
            posts_filter: Locator::css_with_text("nav ul li button", "Posts"),
            result_items: Locator::css(
                "ul[role='list'].reusable-search__entity-result-list > li",
            ),
            profile_actions: Locator::css("main button.pvs-profile-actions__action"),
        }
    }
}

/// One atomic browser action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Navigate(String),
    WaitVisible(Locator),
    SendKeys(Locator, String),
    Click(Locator),
    KeyEvent(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Typed text stays out of the description; it may be a password
        match self {
            Step::Navigate(url) => write!(f, "navigate to {}", url),
            Step::WaitVisible(locator) => write!(f, "wait for {}", locator),
            Step::SendKeys(locator, _) => write!(f, "type into {}", locator),
            Step::Click(locator) => write!(f, "click {}", locator),
            Step::KeyEvent(key) => write!(f, "press {}", key),
        }
    }
}

/// What the caller wants the session to do next
#[derive(Debug, Clone)]
enum Action<'a> {
    Authenticate(&'a Credentials),
    Search(&'a str),
    ExtractFragments,
    ProfileActions(&'a str),
}

impl Action<'_> {
    fn name(&self) -> &'static str {
        match self {
            Action::Authenticate(_) => "authenticate",
            Action::Search(_) => "search",
            Action::ExtractFragments => "extract fragments",
            Action::ProfileActions(_) => "list profile actions",
        }
    }
}

/// Steps to run, and the state entered once they all succeed
type Phase = (Vec<Step>, SessionState);

pub struct Workflow<D: BrowserDriver> {
    driver: D,
    site: SiteMap,
    state: SessionState,
}

impl<D: BrowserDriver> Workflow<D> {
    pub fn new(driver: D) -> Self {
        Self::with_site(driver, SiteMap::default())
    }

    pub fn with_site(driver: D, site: SiteMap) -> Self {
        Self {
            driver,
            site,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Log in. Fails with a timeout on bad credentials, since the post-login
    /// landmark never appears.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        tracing::info!("Logging in as {}", credentials.username);
        self.transition(Action::Authenticate(credentials)).await
    }

    pub async fn search(&mut self, query: &str) -> Result<()> {
        tracing::info!("Searching posts for '{}'", query);
        self.transition(Action::Search(query)).await
    }

    /// Outer HTML of every search result item, in page order
    pub async fn extract_fragments(&mut self) -> Result<Vec<String>> {
        self.transition(Action::ExtractFragments).await?;

        let nodes = self.query(&self.site.result_items).await?;
        let mut fragments = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let html = self
                .driver
                .outer_html(node)
                .await
                .map_err(|e| self.step_failed("read result item html", e))?;
            fragments.push(html);
        }

        tracing::info!("Collected {} result fragments", fragments.len());
        Ok(fragments)
    }

    /// Labels of the action buttons on a profile page. Nothing is clicked.
    pub async fn profile_actions(&mut self, profile_url: &str) -> Result<Vec<String>> {
        self.transition(Action::ProfileActions(profile_url)).await?;

        let nodes = self.query(&self.site.profile_actions).await?;
        let mut labels = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let label = self
                .driver
                .text(node)
                .await
                .map_err(|e| self.step_failed("read profile action label", e))?;
            tracing::debug!("Profile action: {}", label);
            labels.push(label);
        }
        Ok(labels)
    }

    async fn transition(&mut self, action: Action<'_>) -> Result<()> {
        let phases = self.plan(&action)?;
        let started_in = self.state;

        for (steps, next) in phases {
            if let Err(e) = self.run_steps(&steps).await {
                self.state = started_in;
                return Err(e);
            }
            tracing::debug!("Session state: {} -> {}", self.state, next);
            self.state = next;
        }
        Ok(())
    }

    /// The single transition table: which actions each state accepts, and
    /// the steps they take
    fn plan(&self, action: &Action<'_>) -> Result<Vec<Phase>> {
        use SessionState::*;
        let site = &self.site;

        match (self.state, action) {
            (Unauthenticated, Action::Authenticate(credentials)) => Ok(vec![
                (
                    vec![
                        Step::Navigate(site.home_url.clone()),
                        Step::Navigate(site.login_url.clone()),
                        Step::WaitVisible(site.username_field.clone()),
                        Step::SendKeys(site.username_field.clone(), credentials.username.clone()),
                        Step::WaitVisible(site.password_field.clone()),
                        Step::SendKeys(site.password_field.clone(), credentials.password.clone()),
                        Step::Click(site.submit_button.clone()),
                    ],
                    Authenticating,
                ),
                (vec![Step::WaitVisible(site.search_box.clone())], Authenticated),
            ]),
            (Authenticated | SearchResultsReady, Action::Search(query)) => Ok(vec![(
                vec![
                    Step::Navigate(site.feed_url.clone()),
                    Step::WaitVisible(site.search_box.clone()),
                    Step::SendKeys(site.search_box.clone(), query.to_string()),
                    Step::KeyEvent("Enter".to_string()),
                    Step::WaitVisible(site.posts_filter.clone()),
                    Step::Click(site.posts_filter.clone()),
                    Step::WaitVisible(site.result_items.clone()),
                ],
                SearchResultsReady,
            )]),
            (SearchResultsReady, Action::ExtractFragments) => Ok(vec![]),
            (Authenticated | SearchResultsReady, Action::ProfileActions(url)) => Ok(vec![(
                vec![
                    Step::Navigate(url.to_string()),
                    Step::WaitVisible(site.profile_actions.clone()),
                ],
                Authenticated,
            )]),
            (state, action) => Err(Error::InvalidTransition {
                state,
                action: action.name(),
            }),
        }
    }

    async fn run_steps(&self, steps: &[Step]) -> Result<()> {
        for step in steps {
            tracing::debug!("[{}] {}", self.state, step);
            let result = match step {
                Step::Navigate(url) => self.driver.navigate(url).await,
                Step::WaitVisible(locator) => self.driver.wait_visible(locator).await,
                Step::SendKeys(locator, text) => self.driver.send_keys(locator, text).await,
                Step::Click(locator) => self.driver.click(locator).await,
                Step::KeyEvent(key) => self.driver.key_event(key).await,
            };
            result.map_err(|e| self.step_failed(step.to_string(), e))?;
        }
        Ok(())
    }

    async fn query(&self, locator: &Locator) -> Result<Vec<D::Node>> {
        self.driver
            .query_nodes(locator)
            .await
            .map_err(|e| self.step_failed(format!("query {}", locator), e))
    }

    fn step_failed(&self, step: impl Into<String>, source: Error) -> Error {
        Error::StepFailed {
            state: self.state,
            step: step.into(),
            source: Box::new(source),
        }
    }
}
