use serde::{Deserialize, Serialize};

/// Port the vMix Web Controller listens on by default.
pub const DEFAULT_VMIX_PORT: u16 = 8088;

/// Connection settings for the remote vMix instance.
///
/// Field names stay camelCase on the wire so the persisted blob keeps the
/// `{vmixIp, vmixPort, vmixInput, folderPath, useProxy}` shape front ends
/// already understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    pub vmix_ip: String,
    pub vmix_port: String,
    pub vmix_input: String,
    pub folder_path: String,
    pub use_proxy: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            vmix_ip: String::new(),
            vmix_port: DEFAULT_VMIX_PORT.to_string(),
            vmix_input: String::new(),
            folder_path: String::new(),
            use_proxy: true,
        }
    }
}

impl ConnectionSettings {
    /// Parsed port, clamped to 1-65535. Falls back to the default whenever
    /// the stored value is missing or unusable, so callers always get a
    /// port they can dial.
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        match self.vmix_port.trim().parse::<u32>() {
            Ok(port) if (1..=65535).contains(&port) => port as u16,
            _ => DEFAULT_VMIX_PORT,
        }
    }

    /// True when ip, input and folder are all present.
    #[must_use]
    pub fn configured(&self) -> bool {
        !self.vmix_ip.trim().is_empty()
            && !self.vmix_input.trim().is_empty()
            && !self.folder_path.trim().is_empty()
    }

    /// Apply save-time normalization: trim all fields, default an empty
    /// port, terminate the folder path with a separator.
    #[must_use]
    pub fn normalized(self) -> Self {
        let port = self.vmix_port.trim();
        Self {
            vmix_ip: self.vmix_ip.trim().to_string(),
            vmix_port: if port.is_empty() {
                DEFAULT_VMIX_PORT.to_string()
            } else {
                port.to_string()
            },
            vmix_input: self.vmix_input.trim().to_string(),
            folder_path: normalize_folder(&self.folder_path),
            use_proxy: self.use_proxy,
        }
    }
}

/// Ensure a non-empty folder path ends with a path separator. vMix runs on
/// Windows, so a backslash is appended when neither separator terminates
/// the path.
#[must_use]
pub fn normalize_folder(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }
    if path.ends_with('\\') || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}\\")
    }
}
