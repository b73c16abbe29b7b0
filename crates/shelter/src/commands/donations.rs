//! Donation handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::{Donation, DonationSummary, PeopleFilter};

use crate::cli::{DonationsArgs, DonationsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DonationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Donor")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Payment")]
    payment_status: String,
    #[tabled(rename = "Date")]
    created: String,
}

impl From<&Arc<Donation>> for DonationRow {
    fn from(d: &Arc<Donation>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            email: d.email.clone(),
            amount: rupees(d.amount),
            payment_status: d.payment_status.clone(),
            created: util::day(d.created_at),
        }
    }
}

fn rupees(amount: f64) -> String {
    format!("₹{amount:.2}")
}

fn summary_detail(s: &DonationSummary) -> String {
    output::detail(&[
        ("Total", rupees(s.total_amount)),
        ("Donations", s.count.to_string()),
        ("Completed", s.completed.to_string()),
        ("Pending", s.pending.to_string()),
    ])
}

pub async fn handle(args: DonationsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let list = util::mount_table::<Donation>(global).await?;

    match args.command {
        DonationsCommand::List(search) => {
            let filter = PeopleFilter {
                search: search.search,
            };
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|d| filter.matches(d.as_ref()))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| DonationRow::from(r),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                let summary = DonationSummary::from_donations(rows.iter().map(|d| &**d));
                eprintln!(
                    "{} donation(s), {} total",
                    summary.count,
                    rupees(summary.total_amount)
                );
            }
            Ok(())
        }

        DonationsCommand::Summary => {
            let summary = list.summary();
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                format!("{:.2}", s.total_amount)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
