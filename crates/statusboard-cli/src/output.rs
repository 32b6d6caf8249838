//! Human and JSON rendering for command results.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use statusboard_application::Dashboard;
use statusboard_core::identity::Identity;
use statusboard_core::policy::Permissions;
use statusboard_core::report::Report;

/// Shared width for separators.
const RULE_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

pub fn report_list(reports: &[Report], mode: OutputMode) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(reports);
    }

    let mut out = io::stdout().lock();
    if reports.is_empty() {
        writeln!(out, "No reports")?;
        return Ok(());
    }
    for report in reports {
        writeln!(
            out,
            "{}  {}  {:<10} {}  {}",
            report.id.dimmed(),
            report.week_of,
            report.team,
            report.title.bold(),
            report.author.name.dimmed()
        )?;
    }
    Ok(())
}

pub fn report_detail(report: &Report, mode: OutputMode) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(report);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", report.title.bold())?;
    rule(&mut out)?;
    kv(&mut out, "ID", &report.id)?;
    kv(&mut out, "Team", &report.team)?;
    kv(&mut out, "Week of", report.week_of.to_string())?;
    kv(
        &mut out,
        "Author",
        format!("{} <{}>", report.author.name, report.author.email),
    )?;
    kv(&mut out, "Updated", report.updated_at.to_rfc3339())?;

    for (heading, lines) in [
        ("Accomplishments", &report.accomplishments),
        ("Blockers", &report.blockers),
        ("Plans", &report.plans),
    ] {
        writeln!(out)?;
        writeln!(out, "{}", heading.underline())?;
        if lines.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for line in lines {
            writeln!(out, "  - {line}")?;
        }
    }

    if report.has_summary() {
        writeln!(out)?;
        writeln!(out, "{}", report.ai_summary.italic())?;
    }
    Ok(())
}

pub fn dashboard(dashboard: &Dashboard, mode: OutputMode) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        return print_json(dashboard);
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Dashboard".bold())?;
    rule(&mut out)?;
    kv(
        &mut out,
        "This month",
        dashboard.stats.reports_this_month.to_string(),
    )?;
    kv(
        &mut out,
        "Avg. done",
        dashboard.stats.average_accomplishments.to_string(),
    )?;
    kv(&mut out, "Blockers", dashboard.stats.total_blockers.to_string())?;

    writeln!(out)?;
    writeln!(out, "{}", "Accomplishments by team".underline())?;
    let widest = dashboard
        .accomplishments_by_team
        .iter()
        .map(|p| p.label.len())
        .max()
        .unwrap_or(0);
    for point in &dashboard.accomplishments_by_team {
        writeln!(
            out,
            "  {:<widest$}  {} {}",
            point.label,
            "█".repeat(point.value).green(),
            point.value
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WhoamiView<'a> {
    mode: String,
    authenticated: bool,
    name: Option<&'a str>,
    email: Option<&'a str>,
    role: String,
    roles: Vec<String>,
    permissions: Permissions,
}

pub fn whoami(identity: &Identity, permissions: Permissions, mode: OutputMode) -> anyhow::Result<()> {
    let view = WhoamiView {
        mode: identity.mode.to_string(),
        authenticated: identity.is_authenticated(),
        name: identity.user.as_ref().map(|u| u.name.as_str()),
        email: identity.email(),
        role: identity.primary_role.to_string(),
        roles: identity.roles.iter().map(|r| r.to_string()).collect(),
        permissions,
    };
    if mode == OutputMode::Json {
        return print_json(&view);
    }

    let mut out = io::stdout().lock();
    kv(&mut out, "Mode", &view.mode)?;
    match (view.name, view.email) {
        (Some(name), Some(email)) if view.authenticated => {
            kv(&mut out, "User", format!("{name} <{email}>"))?
        }
        _ => kv(&mut out, "User", "signed out".yellow().to_string())?,
    }
    kv(&mut out, "Role", &view.role)?;
    kv(
        &mut out,
        "Permissions",
        format!(
            "edit={} delete={} summary={}",
            permissions.can_edit, permissions.can_delete, permissions.can_generate_summary
        ),
    )?;
    Ok(())
}
