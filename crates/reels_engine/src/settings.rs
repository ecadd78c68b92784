use std::time::Duration;

use reels_core::{BufferPolicy, CollectionPlan, ContentId, DEFAULT_MIN_MARGIN};
use serde::{Deserialize, Deserializer, Serialize};

/// Tuning for the acquisition pipeline.
///
/// Delays and timeouts mask render latency of the scraped surface; they are
/// empirical and safe to tune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub entry_url: String,
    /// Last path segment that means "landing page, no item".
    pub sentinel: String,
    /// Element whose presence means the first item rendered.
    pub item_selector: String,
    /// Shareable URL of a reel; `{id}` is replaced by the identifier.
    pub reel_url_template: String,
    pub like_selector: String,
    pub save_selector: String,
    pub min_margin: usize,
    #[serde(deserialize_with = "foreground_pass")]
    pub foreground: PassSettings,
    #[serde(deserialize_with = "background_pass")]
    pub background: PassSettings,
    /// Delay after navigating before waiting on the first item.
    pub initial_settle_ms: u64,
    pub first_item_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub interaction_timeout_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            entry_url: "https://www.instagram.com/reels/".to_string(),
            sentinel: "reels".to_string(),
            item_selector: "video".to_string(),
            reel_url_template: "https://www.instagram.com/reel/{id}/".to_string(),
            like_selector: r#"svg[aria-label*="like"], svg[aria-label*="Like"]"#.to_string(),
            save_selector: r#"svg[aria-label*="save"], svg[aria-label*="Save"]"#.to_string(),
            min_margin: DEFAULT_MIN_MARGIN,
            foreground: PassSettings::foreground(),
            background: PassSettings::background(),
            initial_settle_ms: 3000,
            first_item_timeout_ms: 15_000,
            navigation_timeout_ms: 30_000,
            interaction_timeout_ms: 300_000,
        }
    }
}

impl PipelineSettings {
    pub fn policy(&self) -> BufferPolicy {
        BufferPolicy::new(self.min_margin)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    pub fn first_item_timeout(&self) -> Duration {
        Duration::from_millis(self.first_item_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_millis(self.interaction_timeout_ms)
    }

    pub fn reel_url(&self, id: &ContentId) -> String {
        self.reel_url_template.replace("{id}", id.as_str())
    }
}

/// Bounds of one collection pass. A settings file may name any subset of the
/// fields; the rest keep the values of that pass's own plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassSettings {
    pub max_steps: usize,
    pub target_new: usize,
    pub settle_delay_ms: u64,
}

impl PassSettings {
    pub fn from_plan(plan: CollectionPlan) -> Self {
        Self {
            max_steps: plan.max_steps,
            target_new: plan.target_new,
            settle_delay_ms: u64::try_from(plan.settle_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn foreground() -> Self {
        Self::from_plan(CollectionPlan::foreground())
    }

    pub fn background() -> Self {
        Self::from_plan(CollectionPlan::background())
    }

    pub fn plan(&self) -> CollectionPlan {
        CollectionPlan {
            max_steps: self.max_steps,
            target_new: self.target_new,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

#[derive(Deserialize)]
struct PassOverrides {
    #[serde(default, deserialize_with = "present")]
    max_steps: Option<usize>,
    #[serde(default, deserialize_with = "present")]
    target_new: Option<usize>,
    #[serde(default, deserialize_with = "present")]
    settle_delay_ms: Option<u64>,
}

impl PassOverrides {
    fn onto(self, base: PassSettings) -> PassSettings {
        PassSettings {
            max_steps: self.max_steps.unwrap_or(base.max_steps),
            target_new: self.target_new.unwrap_or(base.target_new),
            settle_delay_ms: self.settle_delay_ms.unwrap_or(base.settle_delay_ms),
        }
    }
}

/// Plain values rather than `Some(..)`, so RON files read naturally.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn foreground_pass<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PassSettings, D::Error> {
    PassOverrides::deserialize(deserializer).map(|o| o.onto(PassSettings::foreground()))
}

fn background_pass<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PassSettings, D::Error> {
    PassOverrides::deserialize(deserializer).map(|o| o.onto(PassSettings::background()))
}

/// Connection to a W3C WebDriver endpoint (chromedriver, geckodriver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverSettings {
    pub endpoint: String,
    /// `chrome` or `firefox`.
    pub browser: String,
    pub headless: bool,
    pub args: Vec<String>,
    pub user_agent: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            browser: "chrome".to_string(),
            headless: true,
            args: [
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--no-first-run",
                "--disable-background-timer-throttling",
                "--disable-backgrounding-occluded-windows",
                "--disable-renderer-backgrounding",
            ]
            .iter()
            .map(|arg| arg.to_string())
            .collect(),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            window_width: 1280,
            window_height: 720,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            poll_interval_ms: 250,
        }
    }
}

impl WebDriverSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
