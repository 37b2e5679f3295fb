//! sysfs-based alias publisher.
//!
//! Every registered input device appears as `/sys/class/input/inputN/` with
//! a `name` file and one child directory per handler node (`event7`, `js1`,
//! ...).  The matching device nodes live in `/dev/input/`.  Publishing means:
//!
//! 1. Scan `inputN` entries for the one whose `name` matches.  If several
//!    match (a stale device from an earlier run, for example) the highest
//!    `N`, the most recently registered, wins.
//! 2. Pick its first `eventN` and `jsN` children.
//! 3. For each node that exists under the device root, replace whatever is
//!    at the alias path with a symlink to it.
//!
//! Both roots are configurable so tests can build a fake tree in a temp dir.

mod alias;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use alias::replace_alias;

use crate::application::publish_aliases::{
    Alias, AliasPublisher, DiscoveryError, PublishedAliases,
};

/// Publishes aliases by scanning a sysfs input class directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsAliasPublisher {
    sysfs_input_root: PathBuf,
    dev_input_root: PathBuf,
}

impl SysfsAliasPublisher {
    pub fn new(sysfs_input_root: impl Into<PathBuf>, dev_input_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_input_root: sysfs_input_root.into(),
            dev_input_root: dev_input_root.into(),
        }
    }

    /// Finds the sysfs directory of the input device called `name`.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::NotFound`] if no entry matches,
    /// [`DiscoveryError::Io`] if the class directory cannot be read.
    pub fn find_device(&self, name: &str) -> Result<PathBuf, DiscoveryError> {
        let entries = read_dir(&self.sysfs_input_root)?;

        entries
            .into_iter()
            .filter_map(|entry| {
                let number = input_number(&entry)?;
                let device_name = fs::read_to_string(entry.join("name")).ok()?;
                (device_name.trim_end_matches('\n') == name).then_some((number, entry))
            })
            .max_by_key(|(number, _)| *number)
            .map(|(_, entry)| entry)
            .ok_or_else(|| DiscoveryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Returns the first existing device node of `device_dir` whose name
    /// starts with `prefix`.
    fn node(&self, device_dir: &Path, prefix: &str) -> Result<Option<PathBuf>, DiscoveryError> {
        let mut children: Vec<String> = read_dir(device_dir)?
            .iter()
            .filter_map(|child| child.file_name()?.to_str().map(str::to_string))
            .filter(|child| is_node_name(child, prefix))
            .collect();
        children.sort_by_key(|child| node_number(child, prefix));

        Ok(children
            .into_iter()
            .map(|child| self.dev_input_root.join(child))
            .find(|node| {
                let exists = node.exists();
                if !exists {
                    debug!("{} not present yet", node.display());
                }
                exists
            }))
    }
}

impl AliasPublisher for SysfsAliasPublisher {
    fn publish(
        &self,
        device_name: &str,
        event_alias: &Path,
        js_alias: &Path,
    ) -> Result<PublishedAliases, DiscoveryError> {
        let device_dir = self.find_device(device_name)?;

        let mut published = PublishedAliases::default();
        if let Some(target) = self.node(&device_dir, "event")? {
            replace_alias(&target, event_alias)?;
            published.event = Some(Alias {
                link: event_alias.to_path_buf(),
                target,
            });
        }
        if let Some(target) = self.node(&device_dir, "js")? {
            replace_alias(&target, js_alias)?;
            published.joystick = Some(Alias {
                link: js_alias.to_path_buf(),
                target,
            });
        }
        Ok(published)
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let io_error = |source: io::Error| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()).map_err(io_error))
        .collect()
}

/// `N` of an `inputN` class entry.
fn input_number(entry: &Path) -> Option<u32> {
    entry
        .file_name()?
        .to_str()?
        .strip_prefix("input")?
        .parse()
        .ok()
}

fn is_node_name(name: &str, prefix: &str) -> bool {
    node_number(name, prefix).is_some()
}

fn node_number(name: &str, prefix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
