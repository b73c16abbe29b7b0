//! Contact message handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::{ContactMessageRow, PeopleFilter, RecordId};

use crate::cli::{GlobalOpts, MessagesArgs, MessagesCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "")]
    unread: String,
    #[tabled(rename = "From")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Message")]
    preview: String,
    #[tabled(rename = "Received")]
    created: String,
}

impl From<&Arc<ContactMessageRow>> for MessageRow {
    fn from(m: &Arc<ContactMessageRow>) -> Self {
        Self {
            id: m.id.to_string(),
            unread: if m.read_status { "" } else { "●" }.into(),
            name: m.name.clone(),
            email: m.email.clone(),
            preview: util::truncate(&m.message, 40),
            created: util::day(m.created_at),
        }
    }
}

pub async fn handle(args: MessagesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let list = util::mount_table::<ContactMessageRow>(global).await?;

    match args.command {
        MessagesCommand::List { search, unread } => {
            let filter = PeopleFilter {
                search: search.search,
            };
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|m| !(unread && m.read_status))
                .filter(|m| filter.matches(m.as_ref()))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| MessageRow::from(r),
                |m| m.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                eprintln!("{} unread", list.unread_count());
            }
            Ok(())
        }

        MessagesCommand::Read { id } => {
            let id = RecordId::from(id.as_str());
            let message = list.row(&id)?;
            list.mark_read(&id).await?;
            let out = output::render_single(
                &global.output,
                &message,
                |m| {
                    output::detail(&[
                        ("From", m.name.clone()),
                        ("Email", m.email.clone()),
                        ("Phone", m.phone.clone()),
                        ("Received", util::day(m.created_at)),
                        ("Message", m.message.clone()),
                    ])
                },
                |m| m.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MessagesCommand::Delete { id } => {
            let id = RecordId::from(id.as_str());
            let message = list.row(&id)?;
            if !util::confirm(
                &format!("Delete the message from {}?", message.name),
                global.yes,
            )? {
                return Ok(());
            }
            list.delete_row(&id).await?;
            output::success(global, &format!("Deleted message {id}"));
            Ok(())
        }
    }
}
