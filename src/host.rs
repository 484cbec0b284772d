//! Host environment: program lookup, hostname and clock.
//!
//! Resolution and building read the host through the [`Host`] trait so that
//! tests (and reproducible builds) can pin every value with [`StaticHost`].

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Where sendmail lives when it is not on the command path.
pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Hostname used when the system one cannot be read.
pub const FALLBACK_HOSTNAME: &str = "localhost";

/// Access to the machine the composer runs on.
pub trait Host: Send + Sync {
    /// Search the command path for `program`.
    fn find_program(&self, program: &str) -> Option<PathBuf>;

    /// Check whether `path` is an executable file.
    fn is_executable(&self, path: &Path) -> bool;

    /// Name of this machine, used in attachment content-ids.
    fn hostname(&self) -> String;

    /// Current time, used as the default `Date`.
    fn now(&self) -> DateTime<Utc>;

    /// Location of the sendmail binary, falling back to
    /// [`DEFAULT_SENDMAIL`] when the search yields nothing.
    fn sendmail_binary(&self) -> PathBuf {
        self.find_program("sendmail")
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SENDMAIL))
    }
}

/// The real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    /// Create a handle to the running system.
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn find_program(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn is_executable(&self, path: &Path) -> bool {
        let Ok(metadata) = std::fs::metadata(path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o111 != 0
        }
        #[cfg(not(unix))]
        {
            true
        }
    }

    fn hostname(&self) -> String {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    fallback = FALLBACK_HOSTNAME,
                    "Could not read system hostname"
                );
                FALLBACK_HOSTNAME.to_string()
            })
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A host with fixed answers.
///
/// ```
/// use postbox::{Host, StaticHost};
///
/// let host = StaticHost::new("mail.example.com").with_sendmail("/opt/bin/sendmail");
/// assert_eq!(host.hostname(), "mail.example.com");
/// assert!(host.is_executable(&host.sendmail_binary()));
/// ```
#[derive(Debug, Clone)]
pub struct StaticHost {
    hostname: String,
    now: DateTime<Utc>,
    sendmail: Option<PathBuf>,
    sendmail_executable: bool,
}

impl StaticHost {
    /// A host with the given name, no sendmail, and the clock stopped at
    /// the Unix epoch.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            now: DateTime::<Utc>::default(),
            sendmail: None,
            sendmail_executable: false,
        }
    }

    /// Put an executable sendmail at `path` on the command path.
    pub fn with_sendmail(mut self, path: impl Into<PathBuf>) -> Self {
        self.sendmail = Some(path.into());
        self.sendmail_executable = true;
        self
    }

    /// Put a sendmail at `path` on the command path that cannot be run.
    pub fn with_broken_sendmail(mut self, path: impl Into<PathBuf>) -> Self {
        self.sendmail = Some(path.into());
        self.sendmail_executable = false;
        self
    }

    /// Stop the clock at `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

impl Host for StaticHost {
    fn find_program(&self, program: &str) -> Option<PathBuf> {
        match program {
            "sendmail" => self.sendmail.clone(),
            _ => None,
        }
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.sendmail_executable && self.sendmail.as_deref() == Some(path)
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendmail_fallback() {
        let host = StaticHost::new("example");
        assert_eq!(host.sendmail_binary(), PathBuf::from(DEFAULT_SENDMAIL));
        assert!(!host.is_executable(&host.sendmail_binary()));
    }

    #[test]
    fn test_broken_sendmail() {
        let host = StaticHost::new("example").with_broken_sendmail("/bin/sendmail");
        assert_eq!(host.sendmail_binary(), PathBuf::from("/bin/sendmail"));
        assert!(!host.is_executable(Path::new("/bin/sendmail")));
    }

    #[test]
    fn test_system_host_missing_path_is_not_executable() {
        let host = SystemHost::new();
        assert!(!host.is_executable(Path::new("/does/not/exist")));
    }

    #[test]
    fn test_system_hostname_is_never_empty() {
        assert!(!SystemHost::new().hostname().is_empty());
    }
}
