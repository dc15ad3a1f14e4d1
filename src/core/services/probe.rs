//! Function health probe
//!
//! One GET against the function's public URL. A probe never errors: every
//! failure mode is folded into the returned [`ProbeResult`].

use crate::config::DeployConfig;
use crate::core::models::ProbeResult;
use crate::core::ports::{HttpClient, HttpRequest};

/// Probe the configured function and classify the response
#[must_use]
pub fn probe_function<H: HttpClient>(http: &H, config: &DeployConfig) -> ProbeResult {
    let url = config.probe_url();
    log::info!("🧪 Testing function at: {url}");

    let request = HttpRequest::get(url)
        .header("User-Agent", config.user_agent.as_str())
        .timeout(config.probe_timeout());

    match http.send(&request) {
        Ok(response) => {
            log::info!("📊 Response status: {}", response.status);
            let result =
                ProbeResult::from_response(response.status, response.body, &config.markers);
            if result.success {
                log::info!("✅ Function is working correctly!");
            } else if response.status == 200 {
                log::warn!("⚠️  Function responded but content may be unexpected");
            } else {
                log::warn!("❌ HTTP Error: {}", response.status);
            }
            result
        },
        Err(e) => {
            log::warn!("❌ Request failed: {e}");
            ProbeResult::transport_failure(e.to_string())
        },
    }
}
