use crate::driver::{CdpDriver, DEFAULT_WAIT_TIMEOUT};
use crate::launcher::free_port;
use crate::{ChromeFinder, ChromeLauncher, Error, ProfileManager, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_DELAY: Duration = Duration::from_millis(500);
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How to launch the browser for a session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub chrome_path: Option<PathBuf>,
    /// Persistent profile directory; a temporary one is used when `None`
    pub profile: Option<PathBuf>,
    pub headless: bool,
    pub maximized: bool,
    /// Remote debugging port; a free one is picked when `None`
    pub debugging_port: Option<u16>,
    pub wait_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            profile: None,
            headless: true,
            maximized: true,
            debugging_port: None,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// A launched Chrome process with an attached DevTools connection.
///
/// Not shareable between concurrent workflows. Dropping the session kills
/// Chrome; prefer [`ChromeSession::close`] to shut down cleanly.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    process: Child,
    wait_timeout: Duration,
    _profile: ProfileManager,
}

impl ChromeSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_binary = ChromeFinder::new(options.chrome_path.clone()).find()?;

        let profile = match &options.profile {
            Some(path) => ProfileManager::persistent(path.clone())?,
            None => ProfileManager::temporary()?,
        };

        let port = match options.debugging_port {
            Some(port) => port,
            None => free_port()?,
        };

        let launcher = ChromeLauncher::new(chrome_binary, profile.path().to_path_buf())
            .headless(options.headless)
            .maximized(options.maximized)
            .debugging_port(port);

        let mut process = launcher.launch()?;
        tracing::info!("Chrome started (pid {}, debugging port {})", process.id(), port);

        // Chrome must be gone before the profile is dropped
        let (browser, page, handler_task) = match attach(port).await {
            Ok(attached) => attached,
            Err(e) => {
                terminate(&mut process).await;
                return Err(e);
            }
        };

        Ok(Self {
            browser,
            page,
            handler_task,
            process,
            wait_timeout: options.wait_timeout,
            _profile: profile,
        })
    }

    /// Driver bound to the session's page
    pub fn driver(&self) -> CdpDriver {
        CdpDriver::new(self.page.clone()).with_wait_timeout(self.wait_timeout)
    }

    /// Close the browser and wait for the Chrome process to exit
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!("Closing browser session");

        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser.close failed, killing Chrome: {}", e);
            let _ = self.process.kill();
        }
        self.handler_task.abort();

        if !wait_for_exit(&mut self.process, EXIT_TIMEOUT).await? {
            tracing::warn!("Chrome did not exit after {:?}, killing it", EXIT_TIMEOUT);
            terminate(&mut self.process).await;
        }
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
        if let Ok(None) = self.process.try_wait() {
            let _ = self.process.kill();
            let _ = self.process.wait();
        }
    }
}

/// Connect over CDP, drive the connection from a background task and pick
/// the page to work in. The handler task is stopped if any part fails.
async fn attach(port: u16) -> Result<(Browser, Page, JoinHandle<()>)> {
    let (browser, mut handler) = connect(port).await?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("CDP handler event error (continuing): {}", e);
            }
        }
    });

    match first_page(&browser).await {
        Ok(page) => Ok((browser, page, handler_task)),
        Err(e) => {
            handler_task.abort();
            Err(e)
        }
    }
}

/// Connect over CDP, retrying while Chrome finishes starting up
async fn connect(port: u16) -> Result<(Browser, chromiumoxide::Handler)> {
    let url = format!("http://127.0.0.1:{}", port);
    let mut attempts_left = CONNECT_ATTEMPTS;

    loop {
        tracing::debug!("Attempting CDP connection to {}...", url);
        match Browser::connect(&url).await {
            Ok(connection) => {
                tracing::info!("CDP connection established");
                return Ok(connection);
            }
            Err(e) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(Error::Cdp(format!(
                        "Failed to connect to Chrome after {} attempts: {}",
                        CONNECT_ATTEMPTS, e
                    )));
                }
                tracing::debug!("CDP connection failed, retrying... ({} left)", attempts_left);
                tokio::time::sleep(CONNECT_DELAY).await;
            }
        }
    }
}

async fn first_page(browser: &Browser) -> Result<Page> {
    // Chrome may still be creating its initial tab
    tokio::time::sleep(CONNECT_DELAY).await;

    match browser.pages().await?.into_iter().next() {
        Some(page) => Ok(page),
        None => {
            tracing::debug!("No existing pages, creating new page");
            Ok(browser.new_page("about:blank").await?)
        }
    }
}

/// Poll the process until it exits. `Ok(false)` when it is still running
/// after `timeout`.
async fn wait_for_exit(process: &mut Child, timeout: Duration) -> Result<bool> {
    let started = Instant::now();
    loop {
        if process.try_wait()?.is_some() {
            return Ok(true);
        }
        if started.elapsed() >= timeout {
            return Ok(false);
        }
        tokio::time::sleep(EXIT_POLL_INTERVAL).await;
    }
}

/// Kill the process and reap it without blocking the runtime
async fn terminate(process: &mut Child) {
    if let Err(e) = process.kill() {
        tracing::debug!("Killing Chrome failed (already exited?): {}", e);
    }
    match wait_for_exit(process, EXIT_TIMEOUT).await {
        Ok(true) => tracing::debug!("Chrome exited"),
        Ok(false) => tracing::warn!("Chrome (pid {}) still running after kill", process.id()),
        Err(e) => tracing::warn!("Failed to wait for Chrome: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BrowserOptions::default();

        assert!(options.headless);
        assert!(options.profile.is_none());
        assert!(options.debugging_port.is_none());
        assert_eq!(options.wait_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_launch_fails_without_chrome() {
        let options = BrowserOptions {
            chrome_path: Some(PathBuf::from("/nonexistent/chrome")),
            ..Default::default()
        };

        let result = ChromeSession::launch(&options).await;

        assert!(matches!(result, Err(Error::Browser(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_reaps_running_process() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();

        terminate(&mut child).await;

        assert!(child.try_wait().unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wait_for_exit_times_out_on_running_process() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();

        let exited = wait_for_exit(&mut child, Duration::from_millis(100)).await.unwrap();

        assert!(!exited);
        terminate(&mut child).await;
    }

    /// A "browser" that never opens a debugging endpoint: attaching fails and
    /// the spawned process must not outlive the failed launch
    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_attach_kills_chrome() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let pid_file = temp_dir.path().join("chrome.pid");
        let fake_chrome = temp_dir.path().join("chrome");
        std::fs::write(
            &fake_chrome,
            format!("#!/bin/sh\necho $$ > {}\nexec sleep 30\n", pid_file.display()),
        )
        .unwrap();
        std::fs::set_permissions(&fake_chrome, std::fs::Permissions::from_mode(0o755)).unwrap();

        let options = BrowserOptions {
            chrome_path: Some(fake_chrome),
            ..Default::default()
        };

        let result = ChromeSession::launch(&options).await;
        assert!(matches!(result, Err(Error::Cdp(_))));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let alive = std::process::Command::new("kill")
            .args(["-0", pid.trim()])
            .status()
            .unwrap()
            .success();
        assert!(!alive, "fake Chrome (pid {}) still running", pid.trim());
    }
}
