//! Import configuration and statistics

/// Text the importer puts in place of a horizontal rule.
pub const DEFAULT_RULE_TEXT: &str = "────────────";

/// Configuration for markup import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Text of the paragraph that stands in for `<hr>`
    pub rule_text: String,
    /// Inline style of unsupported-tag placeholders (empty: unstyled)
    pub placeholder_style: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            rule_text: DEFAULT_RULE_TEXT.to_string(),
            placeholder_style: String::new(),
        }
    }
}

impl ImportConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal-rule stand-in text.
    pub fn with_rule_text(mut self, text: impl Into<String>) -> Self {
        self.rule_text = text.into();
        self
    }

    /// Set the placeholder style, e.g. `"color: #b00"` to make them stand out.
    pub fn with_placeholder_style(mut self, style: impl Into<String>) -> Self {
        self.placeholder_style = style.into();
        self
    }
}

/// Counters collected during one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Nodes appended to the tree (all variants)
    pub nodes: usize,
    /// Text nodes among them
    pub texts: usize,
    /// Whitespace-only text runs dropped
    pub whitespace_dropped: usize,
    /// Unsupported tags replaced by placeholders
    pub unsupported: usize,
    /// `img`/`a` elements dropped for a missing `src`/`href`
    pub dropped: usize,
    /// Tables created
    pub tables: usize,
    /// Table rows created
    pub rows: usize,
    /// Table cells created
    pub cells: usize,
}

impl ImportStats {
    /// Check if the import produced nothing
    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    /// Check if anything was replaced or dropped
    pub fn has_losses(&self) -> bool {
        self.unsupported > 0 || self.dropped > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = ImportConfig::new()
            .with_rule_text("***")
            .with_placeholder_style("color: red");
        assert_eq!(config.rule_text, "***");
        assert_eq!(config.placeholder_style, "color: red");
        assert_eq!(ImportConfig::default().rule_text, DEFAULT_RULE_TEXT);
    }

    #[test]
    fn test_stats_flags() {
        let stats = ImportStats::default();
        assert!(stats.is_empty());
        assert!(!stats.has_losses());

        let lossy = ImportStats {
            nodes: 2,
            dropped: 1,
            ..Default::default()
        };
        assert!(!lossy.is_empty());
        assert!(lossy.has_losses());
    }
}
