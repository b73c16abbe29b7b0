//! Government rules knowledge-base handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::model::parse_tags;
use shelter_core::{GovRule, RecordId, RuleDraft, RuleFilter};

use crate::cli::{GlobalOpts, RuleSaveArgs, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Jurisdiction")]
    jurisdiction: String,
    #[tabled(rename = "Effective")]
    effective: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Published")]
    published: String,
}

impl From<&Arc<GovRule>> for RuleRow {
    fn from(r: &Arc<GovRule>) -> Self {
        Self {
            id: r.id.to_string(),
            title: util::truncate(&r.title, 40),
            jurisdiction: util::opt(r.jurisdiction.as_deref()),
            effective: util::date(r.effective_date),
            tags: r.tags().join(", "),
            published: util::yes_no(r.published),
        }
    }
}

fn draft(args: &RuleSaveArgs) -> Result<RuleDraft, CliError> {
    Ok(RuleDraft {
        title: args.title.clone(),
        summary: args.summary.clone(),
        content: args.content.clone(),
        pdf_url: args.pdf_url.clone(),
        effective_date: util::parse_date("effective_date", args.effective_date.as_deref())?,
        jurisdiction: args.jurisdiction.clone(),
        tags: parse_tags(&args.tags),
        published: args.published,
        source_url: args.source_url.clone(),
    })
}

pub async fn handle(args: RulesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RulesCommand::List {
            search,
            jurisdiction,
            published,
        } => {
            let list = util::mount_table::<GovRule>(global).await?;
            let filter = RuleFilter {
                search,
                jurisdiction,
                published_only: published,
            };
            let rows: Vec<_> = list
                .items()
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| RuleRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Save(save) => {
            let draft = draft(&save)?;
            let list = util::mount_table::<GovRule>(global).await?;
            let id = save.id.as_deref().map(RecordId::from);
            list.save_rule(id.as_ref(), draft).await?;
            let verb = if id.is_some() { "Updated" } else { "Created" };
            output::success(global, &format!("{verb} rule '{}'", save.title.trim()));
            Ok(())
        }

        RulesCommand::Publish { id } => {
            let id = RecordId::from(id.as_str());
            let list = util::mount_table::<GovRule>(global).await?;
            let was_published = list.row(&id)?.published;
            list.toggle_publish(&id).await?;
            let state = if was_published { "Unpublished" } else { "Published" };
            output::success(global, &format!("{state} rule {id}"));
            Ok(())
        }

        RulesCommand::Delete { id } => {
            let id = RecordId::from(id.as_str());
            let list = util::mount_table::<GovRule>(global).await?;
            let rule = list.row(&id)?;
            if !util::confirm(&format!("Delete rule '{}'?", rule.title), global.yes)? {
                return Ok(());
            }
            list.delete_row(&id).await?;
            output::success(global, &format!("Deleted rule {id}"));
            Ok(())
        }
    }
}
