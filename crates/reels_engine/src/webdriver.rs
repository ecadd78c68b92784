use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reels_logging::{reels_debug, reels_info, reels_trace, Lane};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::{AutomationDriver, AutomationError, AutomationSession, FailureKind, WebDriverSettings};

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// WebDriver key code for ArrowDown.
const ARROW_DOWN: &str = "\u{E015}";

/// Opens sessions on a W3C WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverDriver {
    settings: WebDriverSettings,
    client: reqwest::Client,
    endpoint: String,
}

impl WebDriverDriver {
    pub fn new(settings: WebDriverSettings) -> Result<Self, AutomationError> {
        let parsed = url::Url::parse(&settings.endpoint)
            .map_err(|err| AutomationError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| AutomationError::new(FailureKind::Unavailable, err.to_string()))?;
        let endpoint = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }

    fn capabilities(&self) -> Value {
        let settings = &self.settings;
        let mut args = settings.args.clone();
        if settings.browser.eq_ignore_ascii_case("firefox") {
            if settings.headless {
                args.push("-headless".to_string());
            }
            args.push(format!("--width={}", settings.window_width));
            args.push(format!("--height={}", settings.window_height));
            let mut options = json!({ "args": args });
            if let Some(agent) = &settings.user_agent {
                options["prefs"] = json!({ "general.useragent.override": agent });
            }
            json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "firefox",
                        "moz:firefoxOptions": options,
                    }
                }
            })
        } else {
            if settings.headless {
                args.push("--headless=new".to_string());
            }
            args.push(format!(
                "--window-size={},{}",
                settings.window_width, settings.window_height
            ));
            if let Some(agent) = &settings.user_agent {
                args.push(format!("--user-agent={agent}"));
            }
            json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": settings.browser,
                        "goog:chromeOptions": { "args": args },
                    }
                }
            })
        }
    }
}

#[async_trait::async_trait]
impl AutomationDriver for WebDriverDriver {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, AutomationError> {
        let request = self
            .client
            .post(format!("{}/session", self.endpoint));
        let value = send(with_json(request, &self.capabilities())).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AutomationError::new(FailureKind::Protocol, "response has no sessionId"))?;

        reels_info!(Lane::Driver, "opened webdriver session {}", session_id);
        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            base: format!("{}/session/{}", self.endpoint, session_id),
            id: session_id.to_string(),
            poll_interval: self.settings.poll_interval(),
            open: AtomicBool::new(true),
        }))
    }
}

/// One browsing context on the WebDriver endpoint.
#[derive(Debug)]
pub struct WebDriverSession {
    client: reqwest::Client,
    base: String,
    id: String,
    poll_interval: Duration,
    open: AtomicBool,
}

impl WebDriverSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, AutomationError> {
        if !self.is_open() {
            return Err(AutomationError::new(
                FailureKind::SessionClosed,
                format!("session {} is closed", self.id),
            ));
        }
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base, path));
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = with_json(request, &body);
        }
        let result = send(request).await;
        if let Err(err) = &result {
            if err.kind == FailureKind::SessionClosed {
                self.open.store(false, Ordering::Release);
            }
        }
        result
    }

    async fn find_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, AutomationError> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": "css selector", "value": selector })),
                Some(timeout),
            )
            .await?;
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AutomationError::new(FailureKind::Protocol, "element reference missing"))
    }

    /// Polls for `selector` until it shows up or `timeout` passes. Each poll
    /// is bounded by the time left, not the client-wide request timeout.
    async fn await_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<String, AutomationError> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline
                .saturating_duration_since(Instant::now())
                .max(Duration::from_millis(1));
            match self.find_element(selector, left).await {
                Ok(element) => return Ok(element),
                Err(err) if err.kind == FailureKind::ElementNotFound => {
                    reels_trace!(Lane::Driver, "{} not present yet", selector);
                }
                Err(err) => return Err(err),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(AutomationError::new(
                    FailureKind::Timeout,
                    format!("{selector} not visible after {timeout:?}"),
                ));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

#[async_trait::async_trait]
impl AutomationSession for WebDriverSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), AutomationError> {
        reels_debug!(Lane::Driver, "session {} navigating to {}", self.id, url);
        self.command(Method::POST, "/url", Some(json!({ "url": url })), Some(timeout))
            .await
            .map(|_| ())
            .map_err(|err| match err.kind {
                FailureKind::Protocol => AutomationError::new(FailureKind::Navigation, err.message),
                _ => err,
            })
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AutomationError> {
        self.await_element(selector, timeout).await.map(|_| ())
    }

    async fn current_location(&self) -> Result<String, AutomationError> {
        let value = self.command(Method::GET, "/url", None, None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AutomationError::new(FailureKind::Protocol, "url is not a string"))
    }

    async fn advance_gesture(&self) -> Result<(), AutomationError> {
        let actions = json!({
            "actions": [{
                "type": "key",
                "id": "keyboard",
                "actions": [
                    { "type": "keyDown", "value": ARROW_DOWN },
                    { "type": "keyUp", "value": ARROW_DOWN },
                ],
            }]
        });
        self.command(Method::POST, "/actions", Some(actions), None)
            .await
            .map(|_| ())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), AutomationError> {
        let element = self.await_element(selector, timeout).await?;
        self.command(
            Method::POST,
            &format!("/element/{element}/click"),
            Some(json!({})),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        if !self.open.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        reels_info!(Lane::Driver, "closing webdriver session {}", self.id);
        let request = self.client.delete(self.base.as_str());
        match send(request).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind == FailureKind::SessionClosed => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

fn with_json(request: RequestBuilder, body: &Value) -> RequestBuilder {
    request
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(body.to_string())
}

/// Sends a command and unwraps the `value` member of the reply.
async fn send(request: RequestBuilder) -> Result<Value, AutomationError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    let reply: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| AutomationError::new(FailureKind::Protocol, err.to_string()))?
    };

    if !status.is_success() {
        return Err(map_webdriver_error(status, &reply));
    }
    Ok(reply.get("value").cloned().unwrap_or(Value::Null))
}

fn map_webdriver_error(status: StatusCode, reply: &Value) -> AutomationError {
    let value = reply.get("value");
    let code = value
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let message = value
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string());

    let kind = match code {
        "timeout" | "script timeout" => FailureKind::Timeout,
        "no such element" => FailureKind::ElementNotFound,
        "invalid session id" | "no such window" => FailureKind::SessionClosed,
        "" if status == StatusCode::NOT_FOUND => FailureKind::SessionClosed,
        _ if message.contains("net::ERR_") => FailureKind::Navigation,
        _ => FailureKind::Protocol,
    };
    AutomationError::new(kind, message)
}

fn map_reqwest_error(err: reqwest::Error) -> AutomationError {
    if err.is_timeout() {
        return AutomationError::new(FailureKind::Timeout, err.to_string());
    }
    AutomationError::new(FailureKind::Unavailable, err.to_string())
}
