//! `[base]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in docweave.toml - site-wide metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Quarterly Report"
/// name = "report"
/// language = "en-GB"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Appended to every page title.
    #[serde(default)]
    pub title: String,

    /// Logical name of the root document, the first segment of every
    /// `link(to=...)` path.
    #[serde(default = "defaults::base::name")]
    #[educe(Default = defaults::base::name())]
    pub name: String,

    /// BCP 47 language code for `<html lang>`.
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,
}
