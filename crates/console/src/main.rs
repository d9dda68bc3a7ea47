use anyhow::Context;
use chrono::{Datelike, Local};

use zbalo_console::{Console, ConsoleConfig, Period};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zbalo_observability::init();

    let config = ConsoleConfig::from_env();
    tracing::info!(api_url = %config.api_url, "starting console");

    let console = Console::connect(config).context("failed to build the record service client")?;
    let _reloads = console.start();

    console.reload().await.context("initial load failed")?;

    let today = Local::now().date_naive();
    let dashboard = console.dashboard(today);
    tracing::info!(
        active_crops = dashboard.stats.active_crops,
        month_revenue = dashboard.stats.month_revenue,
        upcoming_reminders = dashboard.upcoming.len(),
        reminder_badge = dashboard.reminder_badge,
        low_stock = dashboard.low_stock.len(),
        "dashboard"
    );

    let chart_dir = console.config().chart_dir.clone();
    std::fs::create_dir_all(&chart_dir)
        .with_context(|| format!("cannot create {}", chart_dir.display()))?;

    for chart in console.history_charts(Period::year(today.year())) {
        let path = chart_dir.join(format!("{}.png", chart.name));
        chart
            .surface
            .save_png(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        tracing::info!(path = %path.display(), outcome = ?chart.outcome, "chart written");
    }

    Ok(())
}
