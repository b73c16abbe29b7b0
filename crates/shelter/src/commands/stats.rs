//! Dashboard headline counts and the recent activity feed.

use chrono::Utc;
use tabled::Tabled;

use shelter_core::activity::time_ago;
use shelter_core::{Activity, DashboardStats, RecentActivity};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &DashboardStats) -> String {
    output::detail(&[
        ("Animals", s.total_animals.to_string()),
        ("Available", s.available.to_string()),
        ("Adopted", s.adopted.to_string()),
        ("Under care", s.under_care.to_string()),
        ("Donations", format!("₹{:.2}", s.donation_total)),
        ("Volunteers", s.volunteers.to_string()),
        (
            "Messages",
            format!("{} ({} unread)", s.messages, s.unread_messages),
        ),
        ("Adoption requests", s.adoption_requests.to_string()),
    ])
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let (client, _) = util::connect(global)?;
    let stats = DashboardStats::load(client.as_ref()).await?;
    let out = output::render_single(&global.output, &stats, detail, |s| {
        s.total_animals.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "What")]
    title: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&Activity> for ActivityRow {
    fn from(a: &Activity) -> Self {
        Self {
            when: a
                .time
                .map_or_else(|| "-".to_owned(), |t| time_ago(t, Utc::now())),
            title: a.title.to_owned(),
            details: util::opt(a.details.as_deref()),
        }
    }
}

pub async fn activity(global: &GlobalOpts) -> Result<(), CliError> {
    let (client, _) = util::connect(global)?;
    let feed = RecentActivity::load(client.as_ref()).await?;
    if feed.is_empty() && matches!(global.output, crate::cli::OutputFormat::Table) {
        output::warn(global, "No recent activities");
        return Ok(());
    }
    let out = output::render_list(
        &global.output,
        &feed.items,
        |a| ActivityRow::from(a),
        |a| a.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
