// `diagmon collect`

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use diagmon_core::application::{cancellation_channel, RuleReport};
use diagmon_core::domain::EndpointInfo;

use crate::cli::SharedOptions;
use crate::settings::MonitorSettings;

pub async fn run(options: SharedOptions) -> Result<()> {
    let settings = MonitorSettings::load(&options)?;

    info!(
        urls = %settings.urls,
        metric_urls = %settings.metric_urls,
        metrics = settings.metrics,
        diagnostic_port = ?settings.diagnostic_port,
        rules = settings.collection_rules.len(),
        "Monitoring agent configured"
    );
    if settings.no_auth {
        warn!("Authentication is disabled");
    }

    let runner = super::build_runner();
    let endpoint = EndpointInfo::current_process();
    let (source, token) = cancellation_channel();

    // Ctrl+C cancels in-flight actions; spawned processes keep running
    let shutdown = tokio::spawn(async move {
        let signal = tokio::signal::ctrl_c().await;
        if signal.is_ok() {
            info!("Shutdown signal received. Cancelling in-flight actions...");
        }
        source.cancel();
        signal
    });

    let reports = runner
        .run_all(&settings.collection_rules, &endpoint, &token)
        .await;
    log_reports(&reports);

    if !token.is_cancelled() {
        info!("Collection rules finished. Press Ctrl+C to shutdown");
    }

    shutdown
        .await
        .context("Shutdown listener failed")?
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutdown complete.");
    Ok(())
}

fn log_reports(reports: &[RuleReport]) {
    for report in reports {
        match &report.error {
            None => {
                let outputs: Vec<_> = report.results.iter().map(|r| r.output_values()).collect();
                info!(rule = %report.rule, outputs = ?outputs, "Rule succeeded");
            }
            Some(e) if e.is_cancelled() => {
                warn!(rule = %report.rule, completed = report.results.len(), "Rule cancelled");
            }
            Some(e) => {
                error!(rule = %report.rule, completed = report.results.len(), error = %e, "Rule failed");
            }
        }
    }
}
