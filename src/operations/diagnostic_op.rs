use crate::camera_config::CameraConfiguration;
use crate::config_loader::MasterConfig;
use crate::errors::AppError;
use anyhow::Result;
use log::{debug, error, info, warn};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

#[derive(Debug)]
pub struct DiagnosticResult {
    pub test_name: String,
    pub success: bool,
    pub details: String,
}

/// Status endpoint of the vendor CGI, e.g. `http://host:81/cgi-bin/api.cgi?action=getStatus`.
pub fn status_url(config: &CameraConfiguration, control_path: &str, status_query: &str) -> String {
    format!("http://{}:{}{}?{}", config.host, config.http_port, control_path, status_query)
}

/// Any HTTP answer from the status endpoint counts as reachable.
pub async fn probe_http_status(url: &str, config: &CameraConfiguration, timeout: Duration) -> DiagnosticResult {
    let test_name = "HTTP-CGI status endpoint".to_string();
    let probe_start = Instant::now();
    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            return DiagnosticResult {
                test_name,
                success: false,
                details: format!("http client build failed: {}", e),
            }
        }
    };

    let mut request = client.get(url);
    if let Some((user, pass)) = config.credentials() {
        request = request.basic_auth(user, Some(pass));
    }
    debug!("  DIAGNOSTIC [HTTP]: GET {}", url);

    let outcome = match tokio::time::timeout(timeout, request.send()).await {
        Ok(Ok(response)) => Ok(response.status().as_u16()),
        Ok(Err(e)) => Err(AppError::from_reqwest(&e)),
        Err(_) => Err(AppError::TransportTimeout(format!("no response within {:?}", timeout))),
    };

    match outcome {
        Ok(code) => {
            info!("    DIAGNOSTIC [HTTP]: {} answered HTTP {} in {:?}.", url, code, probe_start.elapsed());
            DiagnosticResult {
                test_name,
                success: true,
                details: format!("HTTP {} in {:?}", code, probe_start.elapsed()),
            }
        }
        Err(e) => {
            error!("    DIAGNOSTIC [HTTP]: {} FAILED in {:?}: {}", url, probe_start.elapsed(), e);
            DiagnosticResult {
                test_name,
                success: false,
                details: e.to_string(),
            }
        }
    }
}

/// Opens and immediately drops a TCP connection; nothing is written.
pub async fn probe_tcp_port(label: &str, host: &str, port: u16, timeout: Duration) -> DiagnosticResult {
    let test_name = format!("{} port {}", label, port);
    let probe_start = Instant::now();
    let outcome = tokio::time::timeout(timeout, TcpStream::connect((host, port))).await;
    match outcome {
        Ok(Ok(stream)) => {
            drop(stream);
            info!("    DIAGNOSTIC [{}]: {}:{} accepted a connection in {:?}.", label, host, port, probe_start.elapsed());
            DiagnosticResult {
                test_name,
                success: true,
                details: format!("connected in {:?}", probe_start.elapsed()),
            }
        }
        Ok(Err(e)) => {
            error!("    DIAGNOSTIC [{}]: {}:{} refused in {:?}: {}", label, host, port, probe_start.elapsed(), e);
            DiagnosticResult {
                test_name,
                success: false,
                details: format!("connect failed: {}", e),
            }
        }
        Err(_) => {
            error!("    DIAGNOSTIC [{}]: {}:{} did not answer within {:?}.", label, host, port, timeout);
            DiagnosticResult {
                test_name,
                success: false,
                details: format!("no answer within {:?}", timeout),
            }
        }
    }
}

/// Runs every probe against the configured camera. Never sends a motion command.
pub async fn run_diagnostics(master_config: &MasterConfig) -> Vec<DiagnosticResult> {
    let app = &master_config.app_settings;
    let camera = &master_config.camera;
    let timeout = app.request_timeout();

    info!("  DIAGNOSTIC [{}]: Probing protocol endpoints (active: {})...", camera.host, camera.protocol);
    let url = status_url(camera, &app.cgi_control_path, &app.cgi_status_query);
    let (http, onvif, visca) = tokio::join!(
        probe_http_status(&url, camera, timeout),
        probe_tcp_port("ONVIF", &camera.host, camera.onvif_port, timeout),
        probe_tcp_port("VISCA", &camera.host, camera.visca_port, timeout),
    );
    vec![http, onvif, visca]
}

pub async fn handle_diagnostic_cli(master_config: &MasterConfig) -> Result<()> {
    let overall_diag_start_time = Instant::now();
    info!("🩺 Starting diagnostic test suite...");
    if master_config.camera.credentials().is_none() {
        warn!("⚠️ DIAGNOSTIC: No credentials configured; the HTTP probe runs unauthenticated.");
    }

    let results = run_diagnostics(master_config).await;

    info!("\n\n📋 ----- Diagnostic Test Summary (Total Suite Time: {:?}) -----", overall_diag_start_time.elapsed());
    let mut overall_success = true;
    for result in &results {
        let status_emoji = if result.success { "✅ PASS" } else { "❌ FAIL" };
        info!("Test: {:<40} | Status: {:<10} | Details: {}", result.test_name, status_emoji, result.details);
        if !result.success {
            overall_success = false;
        }
    }
    info!("----------------------------------------------------------------------");
    if overall_success {
        info!("🎉 Every protocol endpoint answered.");
    } else {
        // Unused protocols are often closed on purpose; a failed probe is reported, not fatal.
        error!("🔥 One or more endpoints did not answer. Please review logs above.");
    }
    info!("🏁 Diagnostic test suite finished in {:?}.", overall_diag_start_time.elapsed());
    Ok(())
}
