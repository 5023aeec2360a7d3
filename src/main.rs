use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Datelike;

use absensi_client::services::{AttendanceStatusTracker, absence};
use absensi_client::{
    AttendanceApi, Clock, Config, HttpAttendanceApi, Role, SessionContext, ShiftResolver,
    SystemClock,
};

/// Headless status check: resolves today's attendance context for the
/// employee named in the environment and lists this month's alpha days.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {}, api: {})",
        config.environment,
        config.api_base_url
    );

    let employee_id: i64 = env::var("EMPLOYEE_ID")
        .context("EMPLOYEE_ID must be set")?
        .parse()
        .context("EMPLOYEE_ID must be a number")?;
    let role: Role = env::var("EMPLOYEE_ROLE")
        .unwrap_or_else(|_| "pegawai".to_string())
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let name = env::var("EMPLOYEE_NAME").unwrap_or_default();
    let session = SessionContext::new(employee_id, name, role);

    let api: Arc<dyn AttendanceApi> = Arc::new(HttpAttendanceApi::new(&config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let resolver = ShiftResolver::new(api.clone(), session.clone(), clock.clone());
    let mut tracker = AttendanceStatusTracker::new(api, session);

    let context = resolver
        .resolve_context(&mut tracker, employee_id, None)
        .await;

    println!("{}", context.state.label());
    if let Some(mapping) = &context.shift {
        println!(
            "Shift {} ({} - {}) on {}",
            mapping.shift.name, mapping.shift.clock_in, mapping.shift.clock_out, context.date
        );
    }

    if tracker.loaded_month().is_none() {
        log::warn!("Attendance history unavailable, skipping alpha listing");
        return Ok(());
    }

    let today = clock.today();
    let month_start = today.with_day(1).unwrap_or(today);
    let alphas = absence::alpha_dates(month_start, today, today, tracker.status_map());
    if !alphas.is_empty() {
        let days: Vec<String> = alphas.iter().map(|d| d.to_string()).collect();
        println!("Alpha this month: {}", days.join(", "));
    }

    Ok(())
}
