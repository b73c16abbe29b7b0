//! Adoption application handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::{AdoptionRequest, PeopleFilter, RecordId};

use crate::cli::{AdoptionsArgs, AdoptionsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AdoptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Has Pet")]
    already_pet: String,
    #[tabled(rename = "Animal")]
    pet: String,
    #[tabled(rename = "Applied")]
    created: String,
}

impl From<&Arc<AdoptionRequest>> for AdoptionRow {
    fn from(a: &Arc<AdoptionRequest>) -> Self {
        Self {
            id: a.id.to_string(),
            name: a.name.clone(),
            email: a.email.clone(),
            phone: a.contact_no.clone(),
            already_pet: a.already_pet.map_or_else(|| "-".into(), util::yes_no),
            pet: util::date(a.pet_id.as_ref()),
            created: util::day(a.created_at),
        }
    }
}

pub async fn handle(args: AdoptionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AdoptionsCommand::List(search) => {
            let list = util::mount_table::<AdoptionRequest>(global).await?;
            let filter = PeopleFilter {
                search: search.search,
            };
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|a| filter.matches(a.as_ref()))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| AdoptionRow::from(r),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdoptionsCommand::Approve { id } => {
            let id = RecordId::from(id.as_str());
            let list = util::mount_table::<AdoptionRequest>(global).await?;
            let request = list.row(&id)?;
            list.approve(&id).await?;
            output::success(
                global,
                &format!("Approved {}'s application; animal marked Adopted", request.name),
            );
            Ok(())
        }

        AdoptionsCommand::Delete { id } => {
            let id = RecordId::from(id.as_str());
            let list = util::mount_table::<AdoptionRequest>(global).await?;
            let request = list.row(&id)?;
            if !util::confirm(
                &format!("Delete the application from {}?", request.name),
                global.yes,
            )? {
                return Ok(());
            }
            list.delete_row(&id).await?;
            output::success(global, &format!("Deleted application {id}"));
            Ok(())
        }
    }
}
