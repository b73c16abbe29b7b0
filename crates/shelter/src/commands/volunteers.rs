//! Volunteer application handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::{PeopleFilter, RecordId, Volunteer};

use crate::cli::{GlobalOpts, VolunteersArgs, VolunteersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct VolunteerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Experience")]
    experience: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Arc<Volunteer>> for VolunteerRow {
    fn from(v: &Arc<Volunteer>) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.name.clone(),
            email: v.email.clone(),
            phone: v.phone.clone(),
            age: util::date(v.age),
            experience: util::yes_no(v.experience_with_animals),
            status: v.status.to_string(),
        }
    }
}

pub async fn handle(args: VolunteersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let list = util::mount_table::<Volunteer>(global).await?;

    match args.command {
        VolunteersCommand::List(search) => {
            let filter = PeopleFilter {
                search: search.search,
            };
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|v| filter.matches(v.as_ref()))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| VolunteerRow::from(r),
                |v| v.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VolunteersCommand::Approve { id } => {
            let id = RecordId::from(id.as_str());
            list.approve(&id).await?;
            output::success(global, &format!("Approved volunteer {id}"));
            Ok(())
        }

        VolunteersCommand::Reject { id } => {
            let id = RecordId::from(id.as_str());
            list.reject(&id).await?;
            output::success(global, &format!("Rejected volunteer {id}"));
            Ok(())
        }

        VolunteersCommand::Delete { id } => {
            let id = RecordId::from(id.as_str());
            let volunteer = list.row(&id)?;
            if !util::confirm(
                &format!("Delete {}'s volunteer application?", volunteer.name),
                global.yes,
            )? {
                return Ok(());
            }
            list.delete_row(&id).await?;
            output::success(global, &format!("Deleted volunteer {id}"));
            Ok(())
        }
    }
}
