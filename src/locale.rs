//! Locale partitioning: locale sources and physical index naming.
//!
//! Each locale (language or tenant code) gets its own physical index. The
//! [`IndexNamer`] derives index names deterministically from
//! `(base, locale)` and guards the mapping's injectivity at runtime: two
//! distinct locale strings that fold to the same index name are a fatal
//! configuration error, caught the first time both are seen.
//!
//! Locale partitioning may or may not be active in a deployment. Rather than
//! a runtime existence check, [`LocaleSource`] makes the two shapes explicit:
//! a single sentinel `default` locale, or a pluggable [`LocaleProvider`].
//!
//! # Example
//!
//! ```
//! use search_sync::{IndexNamer, LocaleSource};
//!
//! let namer = IndexNamer::new("documents");
//! assert_eq!(namer.index_for("en-US").unwrap(), "documentsenus");
//!
//! let source = LocaleSource::SingleDefault;
//! assert_eq!(source.locales(), vec!["default".to_string()]);
//! ```

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::SyncError;

/// Sentinel locale used when no locale provider is active.
pub const DEFAULT_LOCALE: &str = "default";

/// Supplies the current set of locale identifiers.
///
/// The set may change between calls; iteration order must be stable so that
/// fan-out and index creation are reproducible.
pub trait LocaleProvider: Send + Sync {
    fn locales(&self) -> Vec<String>;
}

/// Fixed locale list, useful for tests and static deployments.
#[derive(Debug, Clone)]
pub struct StaticLocales(Vec<String>);

impl StaticLocales {
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(locales.into_iter().map(Into::into).collect())
    }
}

impl LocaleProvider for StaticLocales {
    fn locales(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Where the engine learns which locales exist.
///
/// Selected at construction time: either locale partitioning is off and
/// everything lives under the sentinel `default` locale, or a provider
/// supplies the live set.
#[derive(Clone)]
pub enum LocaleSource {
    /// No locale partitioning; the single sentinel locale.
    SingleDefault,
    /// Live locale set from an external collaborator.
    Provider(Arc<dyn LocaleProvider>),
}

impl LocaleSource {
    /// Wrap a provider.
    pub fn provider(provider: Arc<dyn LocaleProvider>) -> Self {
        Self::Provider(provider)
    }

    /// The current locale set, in the provider's stable order.
    ///
    /// An empty provider set falls back to the sentinel, so callers always
    /// get at least one locale to target.
    #[must_use]
    pub fn locales(&self) -> Vec<String> {
        match self {
            Self::SingleDefault => vec![DEFAULT_LOCALE.to_string()],
            Self::Provider(provider) => {
                let locales = provider.locales();
                if locales.is_empty() {
                    vec![DEFAULT_LOCALE.to_string()]
                } else {
                    locales
                }
            }
        }
    }
}

impl fmt::Debug for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleDefault => write!(f, "LocaleSource::SingleDefault"),
            Self::Provider(_) => write!(f, "LocaleSource::Provider(..)"),
        }
    }
}

/// Normalize a locale to its index-name fragment: lowercase, then keep only
/// `a-z`.
#[must_use]
pub fn normalize(locale: &str) -> String {
    locale
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// Maps locales to physical index names, collision-safely.
///
/// The seen-name table is owned by the namer instance (injected state, not
/// a process global) so tests stay isolated. It is append-only for the life
/// of the instance: locale sets are assumed stable for a service's lifetime.
/// Insert-if-absent-else-compare keeps it safe under concurrent use from the
/// incremental and reindex paths.
#[derive(Debug)]
pub struct IndexNamer {
    base: String,
    /// Derived index name -> first locale that produced it.
    seen: DashMap<String, String>,
}

impl IndexNamer {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            seen: DashMap::new(),
        }
    }

    /// The configured base name prefix.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve a locale to its physical index name.
    ///
    /// Fails with [`SyncError::LocaleCollision`] if a different locale
    /// already produced the same name. This is a runtime guard, only as
    /// strong as the set of locales actually exercised.
    pub fn index_for(&self, locale: &str) -> Result<String, SyncError> {
        let name = format!("{}{}", self.base, normalize(locale));
        match self.seen.entry(name.clone()) {
            Entry::Occupied(entry) => {
                if entry.get() != locale {
                    return Err(SyncError::LocaleCollision {
                        first: entry.get().clone(),
                        second: locale.to_string(),
                        index: name,
                    });
                }
                Ok(name)
            }
            Entry::Vacant(slot) => {
                slot.insert(locale.to_string());
                Ok(name)
            }
        }
    }
}
