// ── Form records ──
//
// One fixed record per form, each with its own field enum and a static
// table of checks per field. `FormState` tracks the last-known errors
// and refuses to hand out a submission while any remain.

use std::fmt;

use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::info;

use crate::client::ResourceClient;
use crate::error::CoreError;
use crate::model::{AnimalStatus, Collection, NewAnimal, Placement, RecordId};
use crate::validate::{Check, FieldErrors, validate_form};

/// A form with a fixed set of fields.
pub trait Form {
    type Field: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Every field with its checks, in display order.
    const FIELDS: &'static [(Self::Field, &'static [Check])];

    /// Raw input of one field.
    fn value(&self, field: Self::Field) -> &str;

    /// Replace one field's raw input.
    fn set(&mut self, field: Self::Field, value: &str);

    fn validate(&self) -> FieldErrors<Self::Field> {
        validate_form(
            Self::FIELDS
                .iter()
                .map(|(field, checks)| (*field, self.value(*field), *checks)),
        )
    }
}

/// A form that is stored as one row of one collection.
pub trait PublicForm: Form {
    const COLLECTION: Collection;

    /// Row to insert. Only called on a form that validated cleanly.
    fn to_row(&self) -> Value;
}

// ── FormState ────────────────────────────────────────────────────────

/// A form plus its last-known validation errors.
#[derive(Debug, Clone, Default)]
pub struct FormState<F: Form> {
    form: F,
    errors: FieldErrors<F::Field>,
}

impl<F: Form> FormState<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            errors: FieldErrors::new(),
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors<F::Field> {
        &self.errors
    }

    /// Change a field; its previous error no longer applies.
    pub fn set(&mut self, field: F::Field, value: &str) {
        self.form.set(field, value);
        self.errors.clear(field);
    }

    /// Run every check and remember the failures. `true` when clean.
    pub fn validate(&mut self) -> bool {
        self.errors = self.form.validate();
        self.errors.is_empty()
    }

    /// The form, if it validates.
    pub fn submission(&mut self) -> Result<&F, CoreError> {
        self.errors = self.form.validate();
        self.errors.clone().into_result()?;
        Ok(&self.form)
    }
}

/// Validate and store a public form. Backend constraint failures still
/// come back as errors even when local validation passed.
pub async fn submit<F: PublicForm>(
    client: &dyn ResourceClient,
    state: &mut FormState<F>,
) -> Result<Value, CoreError> {
    let row = state.submission()?.to_row();
    let stored = client.insert(F::COLLECTION, row).await?;
    info!(collection = %F::COLLECTION, "form submitted");
    Ok(stored)
}

fn optional_text(value: &str) -> Value {
    let value = value.trim();
    if value.is_empty() { Value::Null } else { Value::from(value) }
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "",
    }
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

/// Generates the field enum plus `value`/`set` for a form whose fields
/// are all `String`s.
macro_rules! text_form {
    (
        $form:ident, $field:ident {
            $( $variant:ident => $member:ident : $label:literal ),+ $(,)?
        }
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $field {
            $( $variant ),+
        }

        impl fmt::Display for $field {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $label ),+
                })
            }
        }

        impl $form {
            fn text_value(&self, field: $field) -> &str {
                match field {
                    $( $field::$variant => &self.$member ),+
                }
            }

            fn set_text(&mut self, field: $field, value: &str) {
                match field {
                    $( $field::$variant => self.$member = value.to_owned() ),+
                }
            }
        }
    };
}

// ── Contact ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

text_form!(ContactMessage, ContactField {
    Name => name: "name",
    Email => email: "email",
    Phone => phone: "phone",
    Subject => subject: "subject",
    Message => message: "message",
});

impl Form for ContactMessage {
    type Field = ContactField;

    const FIELDS: &'static [(ContactField, &'static [Check])] = &[
        (ContactField::Name, &[Check::Required]),
        (ContactField::Email, &[Check::Required, Check::Email]),
        (ContactField::Phone, &[Check::Phone]),
        (ContactField::Subject, &[]),
        (ContactField::Message, &[Check::Required]),
    ];

    fn value(&self, field: ContactField) -> &str {
        self.text_value(field)
    }

    fn set(&mut self, field: ContactField, value: &str) {
        self.set_text(field, value);
    }
}

impl PublicForm for ContactMessage {
    const COLLECTION: Collection = Collection::Contacts;

    fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "email": self.email.trim().to_lowercase(),
            "phone": self.phone.trim(),
            "message": format!("Subject: {}\n\n{}", self.subject.trim(), self.message.trim()),
            "read_status": false,
        })
    }
}

// ── Adoption application ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdoptionApplication {
    pub name: String,
    pub contact_no: String,
    pub national_id: String,
    pub email: String,
    pub already_pet: Option<bool>,
    pub reason: String,
    /// Animal the application is for.
    pub pet_id: Option<RecordId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AdoptionField {
    Name,
    ContactNo,
    NationalId,
    Email,
    AlreadyPet,
    Reason,
}

impl Form for AdoptionApplication {
    type Field = AdoptionField;

    const FIELDS: &'static [(AdoptionField, &'static [Check])] = &[
        (AdoptionField::Name, &[Check::Required]),
        (AdoptionField::ContactNo, &[Check::Required, Check::Phone]),
        (AdoptionField::NationalId, &[Check::Required, Check::NationalId]),
        (AdoptionField::Email, &[Check::Required, Check::Email]),
        (AdoptionField::AlreadyPet, &[Check::Required]),
        (AdoptionField::Reason, &[Check::Required]),
    ];

    fn value(&self, field: AdoptionField) -> &str {
        match field {
            AdoptionField::Name => &self.name,
            AdoptionField::ContactNo => &self.contact_no,
            AdoptionField::NationalId => &self.national_id,
            AdoptionField::Email => &self.email,
            AdoptionField::AlreadyPet => yes_no(self.already_pet),
            AdoptionField::Reason => &self.reason,
        }
    }

    fn set(&mut self, field: AdoptionField, value: &str) {
        match field {
            AdoptionField::Name => self.name = value.to_owned(),
            AdoptionField::ContactNo => self.contact_no = value.to_owned(),
            AdoptionField::NationalId => self.national_id = value.to_owned(),
            AdoptionField::Email => self.email = value.to_owned(),
            AdoptionField::AlreadyPet => self.already_pet = parse_yes_no(value),
            AdoptionField::Reason => self.reason = value.to_owned(),
        }
    }
}

impl PublicForm for AdoptionApplication {
    const COLLECTION: Collection = Collection::Adoptions;

    fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "email": self.email.trim().to_lowercase(),
            "contact_no": self.contact_no.trim(),
            "aadhaar_no": self.national_id.trim(),
            "already_pet": self.already_pet.unwrap_or(false),
            "reason": self.reason.trim(),
            "pet_id": self.pet_id,
        })
    }
}

// ── Volunteer application ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolunteerApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub address: String,
    pub experience: bool,
    pub motivation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum VolunteerField {
    FirstName,
    LastName,
    Email,
    Phone,
    Age,
    Address,
    Experience,
    Motivation,
}

impl Form for VolunteerApplication {
    type Field = VolunteerField;

    const FIELDS: &'static [(VolunteerField, &'static [Check])] = &[
        (VolunteerField::FirstName, &[Check::Required]),
        (VolunteerField::LastName, &[Check::Required]),
        (VolunteerField::Email, &[Check::Required, Check::Email]),
        (VolunteerField::Phone, &[Check::Required, Check::Phone]),
        (VolunteerField::Age, &[Check::Required, Check::Age]),
        (VolunteerField::Address, &[Check::Required]),
        (VolunteerField::Experience, &[]),
        (VolunteerField::Motivation, &[Check::Required, Check::MinLength(10)]),
    ];

    fn value(&self, field: VolunteerField) -> &str {
        match field {
            VolunteerField::FirstName => &self.first_name,
            VolunteerField::LastName => &self.last_name,
            VolunteerField::Email => &self.email,
            VolunteerField::Phone => &self.phone,
            VolunteerField::Age => &self.age,
            VolunteerField::Address => &self.address,
            VolunteerField::Experience => yes_no(Some(self.experience)),
            VolunteerField::Motivation => &self.motivation,
        }
    }

    fn set(&mut self, field: VolunteerField, value: &str) {
        match field {
            VolunteerField::FirstName => self.first_name = value.to_owned(),
            VolunteerField::LastName => self.last_name = value.to_owned(),
            VolunteerField::Email => self.email = value.to_owned(),
            VolunteerField::Phone => self.phone = value.to_owned(),
            VolunteerField::Age => self.age = value.to_owned(),
            VolunteerField::Address => self.address = value.to_owned(),
            VolunteerField::Experience => self.experience = parse_yes_no(value).unwrap_or(false),
            VolunteerField::Motivation => self.motivation = value.to_owned(),
        }
    }
}

impl PublicForm for VolunteerApplication {
    const COLLECTION: Collection = Collection::Volunteers;

    fn to_row(&self) -> Value {
        json!({
            "name": format!("{} {}", self.first_name.trim(), self.last_name.trim()),
            "email": self.email.trim().to_lowercase(),
            "phone": self.phone.trim(),
            "age": self.age.trim().parse::<u32>().ok(),
            "address": self.address.trim(),
            "experience_with_animals": self.experience,
            "why_volunteer": self.motivation.trim(),
            "status": "pending",
        })
    }
}

// ── Donation ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub amount: String,
}

text_form!(DonationForm, DonationField {
    FirstName => first_name: "first_name",
    LastName => last_name: "last_name",
    Email => email: "email",
    Phone => phone: "phone",
    Amount => amount: "amount",
});

impl Form for DonationForm {
    type Field = DonationField;

    const FIELDS: &'static [(DonationField, &'static [Check])] = &[
        (DonationField::FirstName, &[Check::Required]),
        (DonationField::LastName, &[Check::Required]),
        (DonationField::Email, &[Check::Required, Check::Email]),
        (DonationField::Phone, &[Check::Phone]),
        (DonationField::Amount, &[Check::Required, Check::PositiveAmount]),
    ];

    fn value(&self, field: DonationField) -> &str {
        self.text_value(field)
    }

    fn set(&mut self, field: DonationField, value: &str) {
        self.set_text(field, value);
    }
}

impl PublicForm for DonationForm {
    const COLLECTION: Collection = Collection::Donations;

    fn to_row(&self) -> Value {
        json!({
            "name": format!("{} {}", self.first_name.trim(), self.last_name.trim()),
            "email": self.email.trim().to_lowercase(),
            "phone": self.phone.trim(),
            "amount": self.amount.trim().parse::<f64>().unwrap_or_default(),
            // No payment gateway; recorded as settled.
            "payment_status": "success",
        })
    }
}

// ── Lost pet report ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LostPetReport {
    pub pet_name: String,
    pub species: String,
    pub date_lost: String,
    pub last_seen_location: String,
    pub description: String,
    pub owner_name: String,
    pub owner_phone: String,
    pub photo_url: String,
}

text_form!(LostPetReport, LostPetField {
    PetName => pet_name: "pet_name",
    Species => species: "species",
    DateLost => date_lost: "date_lost",
    LastSeenLocation => last_seen_location: "last_seen_location",
    Description => description: "description",
    OwnerName => owner_name: "owner_name",
    OwnerPhone => owner_phone: "owner_phone",
    PhotoUrl => photo_url: "photo_url",
});

impl Form for LostPetReport {
    type Field = LostPetField;

    const FIELDS: &'static [(LostPetField, &'static [Check])] = &[
        (LostPetField::PetName, &[Check::Required]),
        (LostPetField::Species, &[Check::Required]),
        (LostPetField::DateLost, &[Check::Required, Check::Date]),
        (LostPetField::LastSeenLocation, &[Check::Required]),
        (LostPetField::Description, &[Check::Required, Check::MaxLength(1000)]),
        (LostPetField::OwnerName, &[Check::Required]),
        (LostPetField::OwnerPhone, &[Check::Required, Check::Phone]),
        (LostPetField::PhotoUrl, &[]),
    ];

    fn value(&self, field: LostPetField) -> &str {
        self.text_value(field)
    }

    fn set(&mut self, field: LostPetField, value: &str) {
        self.set_text(field, value);
    }
}

impl PublicForm for LostPetReport {
    const COLLECTION: Collection = Collection::LostFoundSubmissions;

    fn to_row(&self) -> Value {
        json!({
            "pet_name": self.pet_name.trim(),
            "species": self.species.trim(),
            "date_lost": self.date_lost.trim(),
            "last_seen_location": self.last_seen_location.trim(),
            "description": self.description.trim(),
            "owner_name": self.owner_name.trim(),
            "contact_number": self.owner_phone.trim(),
            "photo_url": optional_text(&self.photo_url),
            "status": "Pending",
        })
    }
}

// ── Admin animal form ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimalForm {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub gender: String,
    pub health_status: String,
    pub story: String,
    pub image_url: String,
    pub rescue_date: String,
    pub status: String,
    pub placement: String,
}

impl Default for AnimalForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            species: String::new(),
            breed: String::new(),
            age: String::new(),
            gender: String::new(),
            health_status: String::new(),
            story: String::new(),
            image_url: String::new(),
            rescue_date: String::new(),
            status: AnimalStatus::Available.as_str().to_owned(),
            placement: Placement::default().to_string(),
        }
    }
}

text_form!(AnimalForm, AnimalField {
    Name => name: "name",
    Species => species: "species",
    Breed => breed: "breed",
    Age => age: "age",
    Gender => gender: "gender",
    HealthStatus => health_status: "health_status",
    Story => story: "story",
    ImageUrl => image_url: "image_url",
    RescueDate => rescue_date: "rescue_date",
    Status => status: "status",
    Placement => placement: "placement",
});

impl Form for AnimalForm {
    type Field = AnimalField;

    const FIELDS: &'static [(AnimalField, &'static [Check])] = &[
        (AnimalField::Name, &[Check::Required]),
        (AnimalField::Species, &[Check::Required]),
        (AnimalField::Breed, &[]),
        (AnimalField::Age, &[Check::Age]),
        (AnimalField::Gender, &[]),
        (AnimalField::HealthStatus, &[]),
        (AnimalField::Story, &[]),
        (AnimalField::ImageUrl, &[]),
        (AnimalField::RescueDate, &[Check::Date]),
        (AnimalField::Status, &[Check::Required, Check::Status]),
        (AnimalField::Placement, &[Check::Required]),
    ];

    fn value(&self, field: AnimalField) -> &str {
        self.text_value(field)
    }

    fn set(&mut self, field: AnimalField, value: &str) {
        self.set_text(field, value);
    }

    fn validate(&self) -> FieldErrors<AnimalField> {
        let mut errors = validate_form(
            Self::FIELDS
                .iter()
                .map(|(field, checks)| (*field, self.value(*field), *checks)),
        );
        if self.placement.parse::<Placement>().is_err() {
            errors.insert(AnimalField::Placement, "Placement must be adopt, rescued or both");
        }
        errors
    }
}

impl AnimalForm {
    /// The validated payload and where to put it.
    pub fn to_new_animal(&self) -> Result<(NewAnimal, Placement), CoreError> {
        self.validate().into_result()?;

        let parsed = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        };
        let status = self
            .status
            .trim()
            .parse::<AnimalStatus>()
            .map_err(|_| CoreError::InvalidStatus {
                value: self.status.clone(),
            })?;
        let placement = self
            .placement
            .parse::<Placement>()
            .map_err(|_| CoreError::Validation {
                fields: vec![("placement".into(), "Placement must be adopt, rescued or both".into())],
            })?;

        Ok((
            NewAnimal {
                name: self.name.trim().to_owned(),
                species: self.species.trim().to_owned(),
                breed: parsed(&self.breed),
                age: self.age.trim().parse().ok(),
                gender: parsed(&self.gender),
                rescue_date: NaiveDate::parse_from_str(self.rescue_date.trim(), "%Y-%m-%d").ok(),
                story: parsed(&self.story),
                health_status: parsed(&self.health_status),
                current_status: status,
                image_url: parsed(&self.image_url),
            },
            placement,
        ))
    }
}
