//! Lost-pet report review handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::{LostFoundSubmission, RecordId, SubmissionStatus};

use crate::cli::{GlobalOpts, LostFoundArgs, LostFoundCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Pet")]
    pet_name: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
    #[tabled(rename = "Lost On")]
    date_lost: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Arc<LostFoundSubmission>> for ReportRow {
    fn from(r: &Arc<LostFoundSubmission>) -> Self {
        Self {
            id: r.id.to_string(),
            pet_name: r.pet_name.clone(),
            species: r.species.clone(),
            last_seen: util::truncate(&r.last_seen_location, 30),
            date_lost: util::date(r.date_lost),
            contact: r.contact_number.clone(),
            status: r.status.as_str().to_owned(),
        }
    }
}

pub async fn handle(args: LostFoundArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let list = util::mount_table::<LostFoundSubmission>(global).await?;

    match args.command {
        LostFoundCommand::List { pending } => {
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|r| !pending || r.status == SubmissionStatus::Pending)
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| ReportRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LostFoundCommand::Approve { id } => {
            let id = RecordId::from(id.as_str());
            let report = list.row(&id)?;
            list.approve(&id).await?;
            output::success(
                global,
                &format!("Approved report for {}; now listed as found", report.pet_name),
            );
            Ok(())
        }

        LostFoundCommand::Reject { id } => {
            let id = RecordId::from(id.as_str());
            let report = list.row(&id)?;
            list.reject(&id).await?;
            output::success(global, &format!("Rejected report for {}", report.pet_name));
            Ok(())
        }
    }
}
