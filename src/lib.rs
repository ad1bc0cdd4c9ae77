pub mod db;
pub mod planner;
pub mod schedule;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

pub use db::{Category, CategoryInput, Database, Session, SessionEdit};
pub use planner::{EditOutcome, PlannerController, PlannerView, Selection};
pub use schedule::{
    clamp_duration_to_midnight, compute_week_layout, validate_start_against_opening,
    validate_start_time, week_start_of, ClampOutcome, LayoutConfig, PositionedSession,
    ValidationOutcome,
};
pub use settings::{LayoutSettings, SettingsStore};

const DATABASE_FILE: &str = "trainplan.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// Non-interactive host: warnings go to the log and deletions are declined.
struct LogView;

impl PlannerView for LogView {
    fn session_added(&self, session: &Session) {
        info!("Session added: {}", session.description());
    }

    fn confirm_delete(&self, _session: &Session) -> bool {
        false
    }

    fn warn_past_midnight(&self, session: &Session) {
        warn!("Session may not run past midnight: {}", session.description());
    }

    fn warn_before_opening(&self, session: &Session) {
        warn!("Session may not start before opening: {}", session.description());
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekReport {
    week: String,
    days: Vec<NaiveDate>,
    today_index: Option<usize>,
    sessions: Vec<PositionedSession>,
}

/// Opens the planner in `TRAINPLAN_DATA_DIR` and prints the layout of the week
/// containing the date given as first argument (default: today) as JSON.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("trainplan starting up...");

    let data_dir = std::env::var_os("TRAINPLAN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let week_of = std::env::args()
        .nth(1)
        .map(|arg| {
            NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
                .with_context(|| format!("expected a YYYY-MM-DD date, got '{arg}'"))
        })
        .transpose()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let database = Database::new(data_dir.join(DATABASE_FILE))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;

        let mut planner =
            PlannerController::load(database, Arc::new(LogView), settings.layout()).await?;
        if let Some(date) = week_of {
            planner.show_week_of(date);
        }

        let report = WeekReport {
            week: planner.week_label(),
            days: planner.day_dates(),
            today_index: planner.today_index(),
            sessions: planner.week_layout(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    })
}
