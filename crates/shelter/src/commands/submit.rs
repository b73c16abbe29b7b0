//! Public form submissions: contact, adoption, volunteer, donation and
//! lost-pet reports.
//!
//! Each form is validated locally before any backend is resolved, so a bad
//! field fails fast even without a configured profile.

use serde_json::Value;

use shelter_core::forms::{
    AdoptionApplication, AdoptionField, ContactField, ContactMessage, DonationField,
    DonationForm, LostPetField, LostPetReport, VolunteerApplication, VolunteerField,
};
use shelter_core::{FormState, PublicForm, RecordId};

use crate::cli::{GlobalOpts, OutputFormat, SubmitArgs, SubmitCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn filled<F: PublicForm>(form: F, values: Vec<(F::Field, String)>) -> FormState<F> {
    let mut state = FormState::new(form);
    for (field, value) in values {
        state.set(field, &value);
    }
    state
}

async fn send<F: PublicForm>(
    global: &GlobalOpts,
    mut state: FormState<F>,
    done: &str,
) -> Result<(), CliError> {
    state.submission()?;

    let (client, _) = util::connect(global)?;
    let stored = shelter_core::submit(client.as_ref(), &mut state).await?;

    match global.output {
        OutputFormat::Table => output::success(global, done),
        _ => {
            let out = output::render_single(&global.output, &stored, |_| String::new(), stored_id);
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

fn stored_id(row: &Value) -> String {
    match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub async fn handle(args: SubmitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SubmitCommand::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let state = filled(
                ContactMessage::default(),
                vec![
                    (ContactField::Name, name),
                    (ContactField::Email, email),
                    (ContactField::Phone, phone),
                    (ContactField::Subject, subject),
                    (ContactField::Message, message),
                ],
            );
            send(global, state, "Message sent. The shelter will get back to you soon.").await
        }

        SubmitCommand::Adopt {
            name,
            contact_no,
            national_id,
            email,
            already_pet,
            reason,
            pet_id,
        } => {
            let form = AdoptionApplication {
                pet_id: pet_id.as_deref().map(RecordId::from),
                ..AdoptionApplication::default()
            };
            let state = filled(
                form,
                vec![
                    (AdoptionField::Name, name),
                    (AdoptionField::ContactNo, contact_no),
                    (AdoptionField::NationalId, national_id),
                    (AdoptionField::Email, email),
                    (AdoptionField::AlreadyPet, already_pet),
                    (AdoptionField::Reason, reason),
                ],
            );
            send(global, state, "Adoption application submitted").await
        }

        SubmitCommand::Volunteer {
            first_name,
            last_name,
            email,
            phone,
            age,
            address,
            experience,
            motivation,
        } => {
            let form = VolunteerApplication {
                experience,
                ..VolunteerApplication::default()
            };
            let state = filled(
                form,
                vec![
                    (VolunteerField::FirstName, first_name),
                    (VolunteerField::LastName, last_name),
                    (VolunteerField::Email, email),
                    (VolunteerField::Phone, phone),
                    (VolunteerField::Age, age),
                    (VolunteerField::Address, address),
                    (VolunteerField::Motivation, motivation),
                ],
            );
            send(global, state, "Volunteer application submitted").await
        }

        SubmitCommand::Donate {
            first_name,
            last_name,
            email,
            phone,
            amount,
        } => {
            let state = filled(
                DonationForm::default(),
                vec![
                    (DonationField::FirstName, first_name),
                    (DonationField::LastName, last_name),
                    (DonationField::Email, email),
                    (DonationField::Phone, phone),
                    (DonationField::Amount, amount),
                ],
            );
            send(global, state, "Thank you! Donation recorded").await
        }

        SubmitCommand::LostPet {
            pet_name,
            species,
            date_lost,
            last_seen,
            description,
            owner_name,
            owner_phone,
            photo_url,
        } => {
            let state = filled(
                LostPetReport::default(),
                vec![
                    (LostPetField::PetName, pet_name),
                    (LostPetField::Species, species),
                    (LostPetField::DateLost, date_lost),
                    (LostPetField::LastSeenLocation, last_seen),
                    (LostPetField::Description, description),
                    (LostPetField::OwnerName, owner_name),
                    (LostPetField::OwnerPhone, owner_phone),
                    (LostPetField::PhotoUrl, photo_url),
                ],
            );
            send(global, state, "Report submitted for review").await
        }
    }
}
