//! Animal command handlers.

use std::sync::Arc;

use tabled::Tabled;

use shelter_core::forms::{AnimalField, AnimalForm, FormState};
use shelter_core::{
    AgeBracket, Animal, AnimalFilter, AnimalPatch, AnimalStatus, AnimalsController, AnimalsView,
    ListController, Placement,
};

use crate::cli::{
    AgeGroup, AnimalAddArgs, AnimalEditArgs, AnimalListArgs, AnimalsArgs, AnimalsCommand,
    GlobalOpts, PlacementArg,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AnimalRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Breed")]
    breed: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Listed on")]
    listings: String,
}

impl From<&Arc<Animal>> for AnimalRow {
    fn from(a: &Arc<Animal>) -> Self {
        Self {
            name: a.name.clone(),
            species: a.species.clone(),
            breed: util::opt(a.breed.as_deref()),
            age: util::date(a.age),
            status: a.current_status.to_string(),
            listings: listings(a),
        }
    }
}

fn listings(a: &Animal) -> String {
    match (a.provenance.adopt_id(), a.provenance.rescued_id()) {
        (Some(_), Some(_)) => "adopt, rescued",
        (Some(_), None) => "adopt",
        _ => "rescued",
    }
    .into()
}

fn detail(a: &Arc<Animal>) -> String {
    output::detail(&[
        ("Name", a.name.clone()),
        ("Species", a.species.clone()),
        ("Breed", util::opt(a.breed.as_deref())),
        ("Age", util::date(a.age)),
        ("Gender", util::opt(a.gender.as_deref())),
        ("Status", a.current_status.to_string()),
        ("Health", util::opt(a.health_status.as_deref())),
        ("Rescued on", util::date(a.rescue_date)),
        ("Story", util::opt(a.story.as_deref())),
        ("Image", util::opt(a.image_url.as_deref())),
        ("Listed on", listings(a)),
    ])
}

// ── Argument conversion ─────────────────────────────────────────────

fn age_bracket(age: AgeGroup) -> AgeBracket {
    match age {
        AgeGroup::All => AgeBracket::All,
        AgeGroup::Young => AgeBracket::Young,
        AgeGroup::Adult => AgeBracket::Adult,
        AgeGroup::Senior => AgeBracket::Senior,
    }
}

fn placement(arg: PlacementArg) -> Placement {
    match arg {
        PlacementArg::Adopt => Placement::Adopt,
        PlacementArg::Rescued => Placement::Rescued,
        PlacementArg::Both => Placement::Both,
    }
}

fn filter(args: &AnimalListArgs) -> Result<AnimalFilter, CliError> {
    let status = args
        .status
        .as_deref()
        .map(|s| {
            s.parse::<AnimalStatus>().map_err(|_| CliError::Validation {
                field: "status".into(),
                reason: format!("'{s}' is not one of Available, Adopted, Under Care"),
            })
        })
        .transpose()?;
    Ok(AnimalFilter {
        search: args.search.clone(),
        species: args.species.clone(),
        age: age_bracket(args.age),
        status,
    })
}

fn add_form(args: AnimalAddArgs) -> FormState<AnimalForm> {
    let mut state = FormState::new(AnimalForm::default());
    for (field, value) in [
        (AnimalField::Name, args.name),
        (AnimalField::Species, args.species),
        (AnimalField::Breed, args.breed),
        (AnimalField::Age, args.age),
        (AnimalField::Gender, args.gender),
        (AnimalField::HealthStatus, args.health),
        (AnimalField::Story, args.story),
        (AnimalField::ImageUrl, args.image_url),
        (AnimalField::RescueDate, args.rescue_date),
        (AnimalField::Status, args.status),
        (AnimalField::Placement, placement(args.placement).to_string()),
    ] {
        state.set(field, &value);
    }
    state
}

fn patch(args: AnimalEditArgs) -> AnimalPatch {
    AnimalPatch {
        name: args.rename,
        species: args.species,
        breed: args.breed,
        age: args.age,
        gender: args.gender,
        story: args.story,
        health_status: args.health,
        image_url: args.image_url,
        ..AnimalPatch::default()
    }
}

fn render(list: &[Arc<Animal>], global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        list,
        |a| AnimalRow::from(a),
        |a| a.name.clone(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AnimalsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AnimalsCommand::List(list_args) => {
            let filter = filter(&list_args)?;
            let list = util::mount(global, AnimalsView).await?;
            let matching: Vec<_> = list
                .items()
                .iter()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect();
            render(&matching, global);
            for diagnostic in list.diagnostics().iter() {
                output::warn(global, &diagnostic.to_string());
            }
            Ok(())
        }

        AnimalsCommand::Show { name } => {
            let list = util::mount(global, AnimalsView).await?;
            let animal = list.find(&name)?;
            let out = output::render_single(&global.output, &animal, detail, |a| a.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AnimalsCommand::Add(add_args) => {
            // Validate before touching the backend.
            let mut form = add_form(add_args);
            let (animal, placement) = form.submission()?.to_new_animal()?;
            let name = animal.name.clone();

            let list = util::mount(global, AnimalsView).await?;
            list.add_animal(animal, placement).await?;
            output::success(global, &format!("Added {name} to {placement}"));
            Ok(())
        }

        AnimalsCommand::Edit(edit_args) => {
            let name = edit_args.name.clone();
            let patch = patch(edit_args);
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "edit".into(),
                    reason: "nothing to change; pass at least one field flag".into(),
                });
            }
            let list = util::mount(global, AnimalsView).await?;
            list.update_animal(&name, patch).await?;
            output::success(global, &format!("Updated {name}"));
            Ok(())
        }

        AnimalsCommand::Status { name, status } => {
            let list = util::mount(global, AnimalsView).await?;
            list.set_status(&name, &status).await?;
            output::success(global, &format!("{name} is now {status}"));
            Ok(())
        }

        AnimalsCommand::Delete { name } => {
            let list = util::mount(global, AnimalsView).await?;
            let animal = list.find(&name)?;
            let prompt = format!(
                "Delete {} from {}? This cannot be undone.",
                animal.name,
                listings(&animal)
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            list.delete_animal(&name).await?;
            output::success(global, &format!("Deleted {}", animal.name));
            Ok(())
        }

        AnimalsCommand::Watch(list_args) => watch(&list_args, global).await,
    }
}

/// Mount with the change feed and reprint after every coalesced reload
/// until interrupted.
async fn watch(args: &AnimalListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let filter = filter(args)?;
    let (client, options) = util::connect(global)?;
    let list: AnimalsController = ListController::new(client, AnimalsView, options);
    list.mount().await?;
    let live = list.is_live();
    if !live {
        output::warn(global, "change feed unavailable; showing one snapshot");
    }

    let mut stream = list.stream();
    let print = |snapshot: &[Arc<Animal>]| {
        let matching: Vec<_> = snapshot.iter().filter(|a| filter.matches(a)).cloned().collect();
        render(&matching, global);
    };
    print(stream.current().as_slice());

    if live {
        loop {
            tokio::select! {
                changed = stream.changed() => match changed {
                    Some(snapshot) => print(snapshot.as_slice()),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    list.unmount().await;
    Ok(())
}
