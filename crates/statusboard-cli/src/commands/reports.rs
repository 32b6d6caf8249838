use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;

use statusboard_application::{AppContext, ReportForm};
use statusboard_core::StatusboardError;
use statusboard_infrastructure::ConfigService;

use crate::output::{self, OutputMode};

/// Report fields. List options may be repeated, one entry each.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    /// Week start date (YYYY-MM-DD); defaults to today on create
    #[arg(long, value_name = "DATE")]
    pub week_of: Option<NaiveDate>,
    #[arg(long = "accomplishment", value_name = "TEXT")]
    pub accomplishments: Vec<String>,
    #[arg(long = "blocker", value_name = "TEXT")]
    pub blockers: Vec<String>,
    #[arg(long = "plan", value_name = "TEXT")]
    pub plans: Vec<String>,
}

impl ReportArgs {
    fn into_form(self) -> ReportForm {
        ReportForm {
            title: self.title,
            team: self.team,
            week_of: self.week_of,
            accomplishments: joined(self.accomplishments),
            blockers: joined(self.blockers),
            plans: joined(self.plans),
        }
    }
}

/// An option given zero times leaves the field untouched.
fn joined(lines: Vec<String>) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn missing(id: &str) -> anyhow::Error {
    StatusboardError::not_found("report", id).into()
}

pub async fn list(context: &AppContext, mine: bool, mode: OutputMode) -> Result<()> {
    let reports = if mine {
        context.reports().list_mine().await
    } else {
        context.reports().list().await
    };
    output::report_list(&reports, mode)
}

pub async fn show(context: &AppContext, id: &str, mode: OutputMode) -> Result<()> {
    let report = context.reports().get(id).await.ok_or_else(|| missing(id))?;
    output::report_detail(&report, mode)
}

pub async fn create(context: &AppContext, fields: ReportArgs, mode: OutputMode) -> Result<()> {
    let report = context.reports().create_report(fields.into_form()).await?;
    output::report_detail(&report, mode)
}

pub async fn edit(
    context: &AppContext,
    id: &str,
    fields: ReportArgs,
    mode: OutputMode,
) -> Result<()> {
    let report = context
        .reports()
        .save_report(id, fields.into_form())
        .await?
        .ok_or_else(|| missing(id))?;
    output::report_detail(&report, mode)
}

pub async fn delete(context: &AppContext, id: &str) -> Result<()> {
    if !context.reports().delete_report(id).await? {
        return Err(missing(id));
    }
    Ok(())
}

pub async fn summary(context: &AppContext, id: &str, mode: OutputMode) -> Result<()> {
    let text = context
        .reports()
        .generate_summary(id)
        .await?
        .ok_or_else(|| missing(id))?;
    match mode {
        OutputMode::Json => output::print_json(&serde_json::json!({ "id": id, "aiSummary": text })),
        OutputMode::Human => {
            println!("{text}");
            Ok(())
        }
    }
}

pub async fn export(context: &AppContext, id: &str) -> Result<()> {
    if !context.reports().export_report(id).await {
        return Err(missing(id));
    }
    Ok(())
}

pub async fn share(context: &AppContext, id: &str) -> Result<()> {
    if !context.reports().share_report(id).await {
        return Err(missing(id));
    }
    Ok(())
}

pub async fn dashboard(context: &AppContext, mode: OutputMode) -> Result<()> {
    let dashboard = context.reports().dashboard(Utc::now()).await;
    output::dashboard(&dashboard, mode)
}

pub async fn history(context: &AppContext, mode: OutputMode) -> Result<()> {
    output::report_list(&context.reports().history().await, mode)
}

/// Toggles persistence for this run and saves it as the startup default.
pub async fn persist(
    context: &AppContext,
    config_service: &ConfigService,
    enabled: bool,
) -> Result<()> {
    context.reports().set_persistence(enabled).await;
    config_service.update(|config| config.persist_reports = enabled)?;
    if let Some(err) = context.reports().last_persist_error().await {
        tracing::warn!("Last write-through failed: {}", err);
    }
    Ok(())
}
