//! PublishAliases: makes the virtual device findable at fixed paths.
//!
//! The kernel numbers the virtual device's nodes (`eventN`, `jsN`)
//! dynamically.  Consumers are configured with stable alias paths instead;
//! an [`AliasPublisher`] resolves the numbered nodes by device name and
//! points the aliases at them.
//!
//! Discovery is advisory.  [`publish_with_retry`] logs failures and returns
//! `None`; it never stops the relay from starting.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Error type for alias publication.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No input device with the given name is registered (yet).
    #[error("no input device named {name:?} found")]
    NotFound { name: String },
    /// A filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One published alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The stable path consumers open.
    pub link: PathBuf,
    /// The kernel device node it points at.
    pub target: PathBuf,
}

/// Result of one successful publication.
///
/// A field is `None` when the device has no node of that kind (not every
/// device gets a `jsN` node).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedAliases {
    pub event: Option<Alias>,
    pub joystick: Option<Alias>,
}

/// Locates a device by name and publishes aliases to its nodes.
pub trait AliasPublisher {
    /// Points `event_alias` and `js_alias` at the nodes of `device_name`.
    ///
    /// Existing files or links at the alias paths are replaced.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::NotFound`] if no device has that name,
    /// [`DiscoveryError::Io`] if the aliases cannot be written.
    fn publish(
        &self,
        device_name: &str,
        event_alias: &Path,
        js_alias: &Path,
    ) -> Result<PublishedAliases, DiscoveryError>;
}

/// Retry policy for [`publish_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryRetry {
    pub attempts: u32,
    pub delay: Duration,
}

/// Publishes aliases, retrying while the device or its event node has not
/// shown up yet.
///
/// Returns the last successful publication, or `None` once attempts are
/// exhausted or a non-retryable error occurs.
pub async fn publish_with_retry<P>(
    publisher: &P,
    device_name: &str,
    event_alias: &Path,
    js_alias: &Path,
    retry: DiscoveryRetry,
) -> Option<PublishedAliases>
where
    P: AliasPublisher + ?Sized,
{
    let attempts = retry.attempts.max(1);
    for attempt in 1..=attempts {
        let last = attempt == attempts;
        match publisher.publish(device_name, event_alias, js_alias) {
            Ok(published) if published.event.is_some() || last => {
                log_published(&published);
                return Some(published);
            }
            Ok(_) => debug!("event node for {device_name:?} not present yet (attempt {attempt})"),
            Err(DiscoveryError::NotFound { .. }) if !last => {
                debug!("{device_name:?} not registered yet (attempt {attempt})")
            }
            Err(e) => {
                warn!("could not publish aliases for {device_name:?}: {e}");
                return None;
            }
        }
        sleep(retry.delay).await;
    }
    None
}

fn log_published(published: &PublishedAliases) {
    for alias in [&published.event, &published.joystick].into_iter().flatten() {
        info!(
            "published {} -> {}",
            alias.link.display(),
            alias.target.display()
        );
    }
    if published.event.is_none() {
        warn!("virtual device has no event node to alias");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
