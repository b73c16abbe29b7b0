//! Admin data layer between `shelter-api` and the shelter tools.
//!
//! - **Reconciliation** ([`EntityReconciler`]): joins the adopt and rescued
//!   animal tables into one [`Animal`] list keyed by case-insensitive name,
//!   with a diagnostic for every row it had to skip.
//!
//! - **List controllers** ([`ListController`]): one per admin section. Each
//!   owns a reactive [`ViewStream`] snapshot, a [`ListState`] lifecycle and
//!   a single-flight mutation gate. Writes to dual-sourced animals report
//!   per-collection outcomes instead of a single success flag.
//!
//! - **Change feeds** ([`ChangeFeedCoordinator`]): coalesces realtime change
//!   notifications from several collections into one reload.
//!
//! - **Backends** ([`ResourceClient`]): the remote REST/realtime client, a
//!   policy-mapping decorator, and an in-memory client for offline use.
//!
//! - **Dashboard** ([`DashboardStats`], [`RecentActivity`]): headline
//!   counts and the newest rows across sections.
//!
//! - **Forms and validation** ([`forms`], [`validate`]): the public intake
//!   forms with per-field errors.

pub mod activity;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod forms;
pub mod model;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod stream;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activity::{Activity, ActivityKind, RecentActivity};
pub use client::{
    ChangeEvent, MemoryClient, PolicyClient, RemoteClient, ResourceClient, Subscription, connect,
};
pub use config::{BackendConfig, RetryPolicy, TlsVerification};
pub use controller::{
    AdoptionsController, AnimalsController, AnimalsView, ControllerOptions, DonationsController,
    ListController, ListState, ListView, LostFoundController, MessagesController,
    RulesController, TableView, VolunteersController,
};
pub use error::{CoreError, WriteFailure};
pub use feed::ChangeFeedCoordinator;
pub use forms::{Form, FormState, PublicForm, submit};
pub use reconcile::{Diagnostic, DiagnosticKind, EntityReconciler, Reconciliation};
pub use stats::DashboardStats;
pub use store::Snapshot;
pub use stream::{AgeBracket, AnimalFilter, PeopleFilter, RuleFilter, Searchable, ViewStream};

pub use model::{
    AdoptionRequest, Animal, AnimalPatch, AnimalStatus, Collection, ContactMessageRow, Donation,
    DonationSummary, GovRule, LostFoundSubmission, NewAnimal, Placement, Provenance, RecordId,
    RuleDraft, SourceRecord, SourceTable, SubmissionStatus, Volunteer, VolunteerStatus,
};
