//! Display configuration types and builder

pub use crate::error::BuilderError;
use crate::panel::{PanelProfile, PanelSize};

/// Temperature assumed until the caller sets one, in °C
pub const DEFAULT_TEMPERATURE: i16 = 25;

/// What the display does after a power up that did not reach Ready
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BeginPolicy {
    /// Refuse `clear`, `paint` and `end` with [`Error::NotReady`](crate::Error::NotReady)
    #[default]
    FailClosed,
    /// Log a warning and carry on driving the panel
    FailOpen,
}

/// Display configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Panel size
    pub panel: PanelSize,
    /// Initial ambient temperature in °C
    pub temperature: i16,
    /// Behaviour after a failed power up
    pub begin_policy: BeginPolicy,
}

impl Config {
    /// Panel geometry for the configured size
    pub fn profile(&self) -> PanelProfile {
        PanelProfile::new(self.panel)
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use epd_cog::{BeginPolicy, Builder, PanelSize};
///
/// let config = match Builder::new()
///     .panel(PanelSize::Epd2_7)
///     .temperature(18)
///     .begin_policy(BeginPolicy::FailOpen)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Panel size (required)
    panel: Option<PanelSize>,
    /// Initial ambient temperature in °C
    temperature: i16,
    /// Behaviour after a failed power up
    begin_policy: BeginPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            panel: None,
            temperature: DEFAULT_TEMPERATURE,
            begin_policy: BeginPolicy::FailClosed,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel size (required)
    pub fn panel(mut self, panel: PanelSize) -> Self {
        self.panel = Some(panel);
        self
    }

    /// Set the initial ambient temperature in °C
    pub fn temperature(mut self, celsius: i16) -> Self {
        self.temperature = celsius;
        self
    }

    /// Set the behaviour after a failed power up
    pub fn begin_policy(mut self, policy: BeginPolicy) -> Self {
        self.begin_policy = policy;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingPanel` if the panel size was not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            panel: self.panel.ok_or(BuilderError::MissingPanel)?,
            temperature: self.temperature,
            begin_policy: self.begin_policy,
        })
    }
}
