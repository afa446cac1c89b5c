use serde::Serialize;

pub const APP_NAME: &str = "Languages API";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identification of the running application, reported by the health check.
#[derive(Debug, Clone, Serialize)]
pub struct AppInfo {
    #[serde(rename = "ApplicationName")]
    pub application_name: &'static str,
    #[serde(rename = "Version")]
    pub version: &'static str,
}

impl Default for AppInfo {
    fn default() -> Self {
        AppInfo {
            application_name: APP_NAME,
            version: VERSION,
        }
    }
}
