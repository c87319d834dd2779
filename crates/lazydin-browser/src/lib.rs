//! Chrome automation for lazydin: locating and launching Chrome, driving a
//! page over the DevTools protocol, and the login/search workflow.

mod chrome_finder;
mod driver;
mod error;
mod launcher;
mod profile;
mod session;
pub mod workflow;

pub use chrome_finder::{CHROME_PATH_ENV, ChromeFinder};
pub use driver::{BrowserDriver, CdpDriver, DEFAULT_WAIT_TIMEOUT, Locator};
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT, free_port};
pub use profile::ProfileManager;
pub use session::{BrowserOptions, ChromeSession};
pub use workflow::{Credentials, SessionState, SiteMap, Step, Workflow};
