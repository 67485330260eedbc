//! Observer configuration.
//!
//! Options can be built programmatically, parsed from JSON, or overlaid from
//! environment variables.

use crate::host::NodeKey;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Per-observer configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StickyObserverOptions {
    /// Visible sentinels, outlined subjects, and transition logging.
    pub debug: bool,
    /// Scroll container used as the reference frame. `None` is the viewport.
    pub container: Option<NodeKey>,
    /// Stay stuck after the container's bottom edge scrolls past; only
    /// unstick when scrolling back above the top edge.
    pub remain_sticky_beyond_sticky_edge: bool,
}

impl StickyObserverOptions {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            debug: false,
            container: None,
            remain_sticky_beyond_sticky_edge: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_container(mut self, container: Option<NodeKey>) -> Self {
        self.container = container;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_remain_sticky_beyond_sticky_edge(mut self, remain: bool) -> Self {
        self.remain_sticky_beyond_sticky_edge = remain;
        self
    }

    /// Parse options from a JSON object such as
    /// `{"debug": true, "container": 12, "remainStickyBeyondStickyEdge": false}`.
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is not a valid options object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid sticky observer options")
    }

    /// Overlay flags from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `STICKY_OBSERVER_DEBUG`: Set to "1" to enable debug mode
    /// - `STICKY_OBSERVER_REMAIN_BEYOND_EDGE`: Set to "1" to keep subjects
    ///   stuck past the sticky edge
    ///
    /// Unset variables leave the current values untouched.
    #[must_use]
    pub fn overlay_env(self) -> Self {
        self.overlay_flags(|name| env::var(name).ok())
    }

    /// [`Self::overlay_env`] with variables read through `lookup`.
    #[must_use]
    pub fn overlay_flags<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| lookup(name).as_deref() == Some("1");
        if flag(DEBUG_VAR) {
            self.debug = true;
        }
        if flag(REMAIN_BEYOND_EDGE_VAR) {
            self.remain_sticky_beyond_sticky_edge = true;
        }
        self
    }

    /// Defaults overlaid with the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().overlay_env()
    }
}

const DEBUG_VAR: &str = "STICKY_OBSERVER_DEBUG";
const REMAIN_BEYOND_EDGE_VAR: &str = "STICKY_OBSERVER_REMAIN_BEYOND_EDGE";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_camel_case_and_defaults_missing_keys() {
        let options = StickyObserverOptions::from_json(
            r#"{"remainStickyBeyondStickyEdge": true, "container": 42}"#,
        )
        .unwrap_or_default();
        assert!(options.remain_sticky_beyond_sticky_edge);
        assert_eq!(options.container, Some(NodeKey(42)));
        assert!(!options.debug);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(StickyObserverOptions::from_json("[1, 2]").is_err());
        assert!(StickyObserverOptions::from_json(r#"{"debug": "yes"}"#).is_err());
    }

    #[test]
    fn builder_sets_every_field() {
        let options = StickyObserverOptions::new()
            .with_debug(true)
            .with_container(Some(NodeKey(3)))
            .with_remain_sticky_beyond_sticky_edge(true);
        assert_eq!(
            options,
            StickyObserverOptions {
                debug: true,
                container: Some(NodeKey(3)),
                remain_sticky_beyond_sticky_edge: true,
            }
        );
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let owned: Vec<(String, String)> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| {
            owned
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        }
    }

    #[test]
    fn flags_set_to_one_are_applied() {
        let options = StickyObserverOptions::new().overlay_flags(vars(&[
            ("STICKY_OBSERVER_DEBUG", "1"),
            ("STICKY_OBSERVER_REMAIN_BEYOND_EDGE", "1"),
        ]));
        assert!(options.debug);
        assert!(options.remain_sticky_beyond_sticky_edge);
        assert_eq!(options.container, None);
    }

    #[test]
    fn other_flag_values_are_ignored() {
        let options = StickyObserverOptions::new().overlay_flags(vars(&[
            ("STICKY_OBSERVER_DEBUG", "true"),
            ("STICKY_OBSERVER_REMAIN_BEYOND_EDGE", "0"),
        ]));
        assert_eq!(options, StickyObserverOptions::new());
    }

    #[test]
    fn unset_flags_keep_configured_values() {
        let configured = StickyObserverOptions::new()
            .with_debug(true)
            .with_container(Some(NodeKey(7)))
            .with_remain_sticky_beyond_sticky_edge(true);
        assert_eq!(configured.overlay_flags(vars(&[])), configured);
        assert_eq!(
            configured.overlay_flags(vars(&[("STICKY_OBSERVER_DEBUG", "0")])),
            configured
        );
    }
}
