use crate::parse::MAX_NESTING_DEPTH;

/// Settings for an [`Injector`](crate::Injector).
///
/// Use `InjectOptions::default()` for the standard behaviour, or adjust it
/// with the builder methods. Missing fields take their defaults when loaded
/// from JSON.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InjectOptions {
    /// Maximum container nesting accepted in keyword values.
    /// `None` means [`MAX_NESTING_DEPTH`].
    pub max_nesting_depth: Option<u16>,
    /// Whether each source line is whitespace-normalized while segmenting.
    pub normalize_whitespace: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: None,
            normalize_whitespace: true,
        }
    }
}

impl InjectOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum container nesting depth for literal values.
    #[must_use]
    pub fn max_nesting_depth(mut self, limit: Option<u16>) -> Self {
        self.max_nesting_depth = limit;
        self
    }

    /// Enables or disables whitespace normalization of source lines.
    #[must_use]
    pub fn normalize_whitespace(mut self, enabled: bool) -> Self {
        self.normalize_whitespace = enabled;
        self
    }

    /// The effective nesting limit.
    #[must_use]
    pub fn nesting_limit(&self) -> u16 {
        self.max_nesting_depth.unwrap_or(MAX_NESTING_DEPTH)
    }
}
