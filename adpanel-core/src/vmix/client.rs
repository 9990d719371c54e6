//! HTTP client for the vMix Web Controller API
//!
//! All control happens over plain GET requests against
//! `http://{host}:{port}/api/` with `Function`/`Input`/`Value` query
//! parameters; the status document is the same endpoint with no
//! parameters.

use std::time::Duration;

use crate::config::VmixHttpConfig;
use crate::models::ConnectionSettings;
use crate::{Error, Result};

/// Resolved call target. `input` may be empty for callers that only fetch
/// state; operations that address the playlist input validate it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmixTarget {
    pub host: String,
    pub port: u16,
    pub input: String,
}

impl VmixTarget {
    /// Build a target from stored settings. The host must be present and
    /// well-formed; the port falls back to the default when unusable.
    pub fn from_settings(settings: &ConnectionSettings) -> Result<Self> {
        let host = settings.vmix_ip.trim();
        if host.is_empty() {
            return Err(Error::Config("vMix IP address is not configured".to_string()));
        }
        if !is_valid_host(host) {
            return Err(Error::Config(format!("invalid vMix host: \"{host}\"")));
        }
        Ok(Self {
            host: host.to_string(),
            port: settings.effective_port(),
            input: settings.vmix_input.trim().to_string(),
        })
    }
}

/// Hostname or IP literal: letters, digits, dots and hyphens only.
#[must_use]
pub fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

#[derive(Debug, Clone)]
pub struct VmixClient {
    http: reqwest::Client,
}

impl VmixClient {
    pub fn new(config: &VmixHttpConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { http })
    }

    #[must_use]
    pub fn api_url(host: &str, port: u16) -> String {
        format!("http://{host}:{port}/api/")
    }

    /// Issue a function call. Empty `input`/`value` are omitted from the
    /// query string, matching what the control API expects.
    pub async fn call(
        &self,
        target: &VmixTarget,
        function: &str,
        input: Option<&str>,
        value: Option<&str>,
    ) -> Result<String> {
        let url = Self::api_url(&target.host, target.port);
        let mut query: Vec<(&str, &str)> = vec![("Function", function)];
        if let Some(input) = input.filter(|s| !s.is_empty()) {
            query.push(("Input", input));
        }
        if let Some(value) = value.filter(|s| !s.is_empty()) {
            query.push(("Value", value));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Fetch the full status document.
    pub async fn fetch_state(&self, target: &VmixTarget) -> Result<String> {
        let url = Self::api_url(&target.host, target.port);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        if !body.contains("<vmix>") {
            return Err(Error::UnexpectedResponse(
                "status document has no <vmix> root; is the Web Controller enabled?".to_string(),
            ));
        }
        Ok(body)
    }

    /// GET an absolute URL, returning the upstream status code and raw
    /// body. Used by the relay, which forwards whatever the remote said.
    pub async fn get_raw(&self, url: &str) -> Result<(u16, String)> {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_host() {
        assert!(is_valid_host("192.168.1.20"));
        assert!(is_valid_host("vmix-machine.local"));
        assert!(!is_valid_host(""));
        assert!(!is_valid_host("host name"));
        assert!(!is_valid_host("host/../etc"));
        assert!(!is_valid_host("host:8088"));
    }

    #[test]
    fn test_target_from_settings() {
        let settings = ConnectionSettings {
            vmix_ip: "10.0.0.5".to_string(),
            vmix_port: "bogus".to_string(),
            vmix_input: " Ads ".to_string(),
            ..ConnectionSettings::default()
        };
        let target = VmixTarget::from_settings(&settings).unwrap();
        assert_eq!(target.host, "10.0.0.5");
        assert_eq!(target.port, 8088);
        assert_eq!(target.input, "Ads");
    }

    #[test]
    fn test_target_requires_host() {
        let err = VmixTarget::from_settings(&ConnectionSettings::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let settings = ConnectionSettings {
            vmix_ip: "bad host!".to_string(),
            ..ConnectionSettings::default()
        };
        assert!(VmixTarget::from_settings(&settings).is_err());
    }

    #[test]
    fn test_api_url() {
        assert_eq!(VmixClient::api_url("10.0.0.5", 8088), "http://10.0.0.5:8088/api/");
    }
}
