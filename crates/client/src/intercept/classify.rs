//! Request classification.
//!
//! Classification is an ordered rule list evaluated top-down; the first
//! matching rule wins and anything unmatched is [`StrategyClass::Generic`].
//! A URL matching both a static and an image rule (a stylesheet served from
//! an image host) is [`StrategyClass::Static`].
//!
//! Requests are classified by their absolute URL, so relative and absolute
//! spellings of one resource always land in the same class.

use offgrid_core::{AppConfig, Error, InterceptedRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::resolve;

/// Which caching strategy handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StrategyClass {
    /// Pre-provisioned assets: cache-first against the static store.
    Static,
    /// Images: network-first, persisting opaque responses too.
    Image,
    /// Everything else: network-first against the dynamic store.
    Generic,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// URL contains any of the needles.
    Contains(Vec<String>),
    /// URL ends with any of the suffixes (case-sensitive).
    EndsWith(Vec<String>),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Contains(needles) => needles.iter().any(|needle| url.contains(needle.as_str())),
            Matcher::EndsWith(suffixes) => suffixes.iter().any(|suffix| url.ends_with(suffix.as_str())),
            Matcher::Pattern(re) => re.is_match(url),
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    name: &'static str,
    matcher: Matcher,
    class: StrategyClass,
}

/// Maps request URLs to strategy classes.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Build the rule list.
    ///
    /// Order: listed assets, static extensions, image hosts, image
    /// extensions (optionally followed by a query string).
    pub fn new(
        assets: &[String], static_extensions: &[String], image_hosts: &[String], image_extensions: &[String],
    ) -> Result<Self, Error> {
        let non_empty = |items: &[String]| items.iter().filter(|s| !s.is_empty()).cloned().collect::<Vec<_>>();

        let mut rules = vec![
            Rule { name: "listed-asset", matcher: Matcher::Contains(non_empty(assets)), class: StrategyClass::Static },
            Rule {
                name: "static-extension",
                matcher: Matcher::EndsWith(non_empty(static_extensions)),
                class: StrategyClass::Static,
            },
            Rule { name: "image-host", matcher: Matcher::Contains(non_empty(image_hosts)), class: StrategyClass::Image },
        ];

        let extensions = non_empty(image_extensions);
        if !extensions.is_empty() {
            let alternation = extensions.iter().map(|ext| regex::escape(ext)).collect::<Vec<_>>().join("|");
            let re = Regex::new(&format!(r"(?i)\.({alternation})(\?.*)?$"))
                .map_err(|e| Error::InvalidInput(format!("invalid image extension pattern: {e}")))?;
            rules.push(Rule { name: "image-extension", matcher: Matcher::Pattern(re), class: StrategyClass::Image });
        }

        Ok(Self { rules })
    }

    /// Build the rule list from the configured asset and pattern tables.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.static_assets, &config.static_extensions, &config.image_hosts, &config.image_extensions)
    }

    /// Classify a request by URL and method.
    ///
    /// Returns None for methods other than GET: those requests are not
    /// intercepted at all.
    pub fn classify(&self, url: &str, method: &str) -> Option<StrategyClass> {
        if !method.eq_ignore_ascii_case("GET") {
            return None;
        }

        let class = match self.rules.iter().find(|rule| rule.matcher.matches(url)) {
            Some(rule) => {
                tracing::trace!(url, rule = rule.name, "classified");
                rule.class
            }
            None => StrategyClass::Generic,
        };
        Some(class)
    }

    /// Classify a request after resolving its URL against `origin`.
    ///
    /// A URL that does not resolve to http(s) is not intercepted.
    pub fn classify_request(&self, origin: &Url, request: &InterceptedRequest) -> Option<StrategyClass> {
        if !request.method.eq_ignore_ascii_case("GET") {
            return None;
        }

        match resolve(origin, &request.url) {
            Ok(resolved) => self.classify(resolved.as_str(), &request.method),
            Err(e) => {
                tracing::trace!(url = %request.url, error = %e, "unresolvable url, not classified");
                None
            }
        }
    }
}
