//! Process listing types.

use serde::{Deserialize, Serialize};

/// One row of a `ps aux` listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID as printed by `ps`
    pub pid: String,
    /// Owning user
    pub user: String,
    /// Start time (`START` column)
    pub start: String,
    /// Accumulated CPU time (`TIME` column)
    pub time: String,
    /// Full command line, spaces included
    pub command: String,
    /// Working directory, filled in after parsing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl ProcessRecord {
    /// Returns the process ID as a number, if it is one
    #[must_use]
    pub fn pid_number(&self) -> Option<u32> {
        self.pid.parse().ok()
    }

    /// Render as a tab-separated line: PID, START, TIME, COMMAND, `(cwd=...)`.
    #[must_use]
    pub fn to_tsv_line(&self) -> String {
        let cwd = format!("(cwd={})", self.cwd.as_deref().unwrap_or(""));
        [
            self.pid.as_str(),
            self.start.as_str(),
            self.time.as_str(),
            self.command.as_str(),
            cwd.as_str(),
        ]
        .join("\t")
    }
}
