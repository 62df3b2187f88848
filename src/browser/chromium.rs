use crate::browser::js_string;
use crate::browser::stealth::{Fingerprint, WEBDRIVER_MASK_SCRIPT};
use crate::browser::traits::{Browser, BrowserError, BrowserResult, Node};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Attributes captured for every node returned by `query_all`
const CAPTURED_ATTRIBUTES: [&str; 2] = ["href", "aria-label"];

/// A single-tab Chromium session driven over CDP
pub struct ChromiumSession {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl ChromiumSession {
    /// Launches Chromium with a persistent profile and the given fingerprint
    ///
    /// The profile directory is created if missing so cookies and consent
    /// state survive between runs.
    pub async fn launch(config: &BrowserConfig, fingerprint: &Fingerprint) -> BrowserResult<Self> {
        std::fs::create_dir_all(&config.user_data_dir).map_err(|e| {
            BrowserError::Launch(format!(
                "cannot create profile dir {}: {}",
                config.user_data_dir, e
            ))
        })?;

        let mut builder = CdpBrowserConfig::builder()
            .user_data_dir(&config.user_data_dir)
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg("--disable-blink-features=AutomationControlled");

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let cdp_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let session = Self {
            browser,
            page,
            handler,
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        };
        session.apply_fingerprint(fingerprint).await?;

        tracing::info!(
            "Browser launched (headless: {}, viewport: {}x{}, profile: {})",
            config.headless,
            fingerprint.viewport_width,
            fingerprint.viewport_height,
            config.user_data_dir
        );

        Ok(session)
    }

    async fn apply_fingerprint(&self, fingerprint: &Fingerprint) -> BrowserResult<()> {
        let launch_err = |e: chromiumoxide::error::CdpError| BrowserError::Launch(e.to_string());

        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(
                WEBDRIVER_MASK_SCRIPT,
            ))
            .await
            .map_err(launch_err)?;

        let mut user_agent = SetUserAgentOverrideParams::new(fingerprint.user_agent.clone());
        user_agent.accept_language = Some(fingerprint.accept_language.clone());
        self.page.execute(user_agent).await.map_err(launch_err)?;

        self.page
            .execute(SetExtraHttpHeadersParams::new(Headers::new(
                serde_json::json!({ "Accept-Language": fingerprint.accept_language }),
            )))
            .await
            .map_err(launch_err)?;

        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(fingerprint.viewport_width),
                i64::from(fingerprint.viewport_height),
                1.0,
                false,
            ))
            .await
            .map_err(launch_err)?;

        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> bool {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== "hidden" && style.display !== "none";
            }})()"#,
            js_string(selector)
        );

        match self.page.evaluate(script).await {
            Ok(result) => result
                .value()
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            Err(e) => {
                tracing::trace!("Visibility probe for '{}' failed: {}", selector, e);
                false
            }
        }
    }
}

#[async_trait]
impl Browser for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str) -> BrowserResult<()> {
        let deadline = Instant::now() + self.wait_timeout;

        loop {
            if self.is_visible(selector).await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::WaitTimeout {
                    selector: selector.to_string(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn query_all(&mut self, selector: &str) -> BrowserResult<Vec<Node>> {
        let query_err = |e: chromiumoxide::error::CdpError| BrowserError::Query {
            selector: selector.to_string(),
            message: e.to_string(),
        };

        let elements = self.page.find_elements(selector).await.map_err(query_err)?;

        let mut nodes = Vec::with_capacity(elements.len());
        for element in elements {
            let mut node = Node::new();
            for name in CAPTURED_ATTRIBUTES {
                if let Some(value) = element.attribute(name).await.map_err(query_err)? {
                    node = node.with_attribute(name, value);
                }
            }
            nodes.push(node);
        }

        Ok(nodes)
    }

    async fn dispatch_pointer_move(&mut self, x: f64, y: f64) -> BrowserResult<()> {
        self.page
            .execute(DispatchMouseEventParams::new(
                DispatchMouseEventType::MouseMoved,
                x,
                y,
            ))
            .await
            .map_err(|e| BrowserError::Input(e.to_string()))?;
        Ok(())
    }

    async fn scroll_feed_to_bottom(&mut self, feed_selector: &str) -> BrowserResult<()> {
        let script = format!(
            r#"(function() {{
                const feed = document.querySelector({});
                if (!feed) return false;
                feed.scrollTop = feed.scrollHeight;
                return true;
            }})()"#,
            js_string(feed_selector)
        );

        let found = self.evaluate(&script).await?;
        if found.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(BrowserError::Query {
                selector: feed_selector.to_string(),
                message: "feed element not found".to_string(),
            })
        }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
    }
}

