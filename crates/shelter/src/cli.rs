//! Clap derive structures for the `shelter` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shelter -- admin console for the animal shelter backend
#[derive(Debug, Parser)]
#[command(
    name = "shelter",
    version,
    about = "Run the animal shelter from the command line",
    long_about = "Admin tool for the animal shelter backend.\n\n\
        Lists and edits animals across the adoption and rescue listings,\n\
        reviews adoption, volunteer and lost-pet submissions, and files\n\
        the public intake forms.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SHELTER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "SHELTER_URL", global = true)]
    pub url: Option<String>,

    /// Backend API key
    #[arg(long, env = "SHELTER_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SHELTER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SHELTER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Use an empty in-memory backend instead of the configured one
    #[arg(long, global = true)]
    pub offline: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage animals across the adoption and rescue listings
    #[command(alias = "a")]
    Animals(AnimalsArgs),

    /// Review adoption applications
    Adoptions(AdoptionsArgs),

    /// View donations
    Donations(DonationsArgs),

    /// Review volunteer applications
    Volunteers(VolunteersArgs),

    /// Read contact messages
    #[command(alias = "msg")]
    Messages(MessagesArgs),

    /// Review lost-pet reports
    LostFound(LostFoundArgs),

    /// Manage government rules and notices
    Rules(RulesArgs),

    /// Dashboard counts
    Stats,

    /// Latest updates across the admin sections
    Activity,

    /// File a public form
    Submit(SubmitArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Search text shared by the people lists.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive match on name, email or phone
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ANIMALS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AnimalsArgs {
    #[command(subcommand)]
    pub command: AnimalsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnimalsCommand {
    /// List animals from both listings, merged by name
    #[command(alias = "ls")]
    List(AnimalListArgs),

    /// Show one animal
    Show {
        /// Animal name (case-insensitive)
        name: String,
    },

    /// Add an animal to one or both listings
    Add(AnimalAddArgs),

    /// Edit an animal on every listing it appears in
    Edit(AnimalEditArgs),

    /// Set an animal's status
    Status {
        /// Animal name (case-insensitive)
        name: String,

        /// Available, Adopted or "Under Care" (exact spelling)
        status: String,
    },

    /// Delete an animal from every listing
    #[command(alias = "rm")]
    Delete {
        /// Animal name (case-insensitive)
        name: String,
    },

    /// Keep the list on screen, refreshing on every backend change
    Watch(AnimalListArgs),
}

#[derive(Debug, Args)]
pub struct AnimalListArgs {
    /// Match name or breed
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Exact species, e.g. Dog
    #[arg(long)]
    pub species: Option<String>,

    /// Age group
    #[arg(long, default_value = "all")]
    pub age: AgeGroup,

    /// Exact status
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AgeGroup {
    All,
    /// Two years or younger
    Young,
    /// Three to six years
    Adult,
    /// Older than six
    Senior,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlacementArg {
    Adopt,
    Rescued,
    Both,
}

#[derive(Debug, Args)]
pub struct AnimalAddArgs {
    pub name: String,

    #[arg(long, default_value_t)]
    pub species: String,

    #[arg(long, default_value_t)]
    pub breed: String,

    #[arg(long, default_value_t)]
    pub age: String,

    #[arg(long, default_value_t)]
    pub gender: String,

    /// Health notes
    #[arg(long, default_value_t)]
    pub health: String,

    /// Rescue story, shown on both listings
    #[arg(long, default_value_t)]
    pub story: String,

    #[arg(long, default_value_t)]
    pub image_url: String,

    /// YYYY-MM-DD; defaults to today
    #[arg(long, default_value_t)]
    pub rescue_date: String,

    #[arg(long, default_value = "Available")]
    pub status: String,

    /// Which listing(s) to add the animal to
    #[arg(long, default_value = "rescued")]
    pub placement: PlacementArg,
}

#[derive(Debug, Args)]
pub struct AnimalEditArgs {
    /// Current animal name (case-insensitive)
    pub name: String,

    /// New name
    #[arg(long)]
    pub rename: Option<String>,

    #[arg(long)]
    pub species: Option<String>,

    #[arg(long)]
    pub breed: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub health: Option<String>,

    #[arg(long)]
    pub story: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PEOPLE SECTIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AdoptionsArgs {
    #[command(subcommand)]
    pub command: AdoptionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdoptionsCommand {
    /// List adoption applications
    #[command(alias = "ls")]
    List(SearchArgs),

    /// Approve an application and mark its animal Adopted
    Approve {
        /// Application ID
        id: String,
    },

    /// Delete an application
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct DonationsArgs {
    #[command(subcommand)]
    pub command: DonationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DonationsCommand {
    /// List donations
    #[command(alias = "ls")]
    List(SearchArgs),

    /// Totals by payment status
    Summary,
}

#[derive(Debug, Args)]
pub struct VolunteersArgs {
    #[command(subcommand)]
    pub command: VolunteersCommand,
}

#[derive(Debug, Subcommand)]
pub enum VolunteersCommand {
    /// List volunteer applications
    #[command(alias = "ls")]
    List(SearchArgs),

    /// Approve a pending application
    Approve { id: String },

    /// Reject a pending application
    Reject { id: String },

    /// Delete an application
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub command: MessagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// List contact messages
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        search: SearchArgs,

        /// Only unread messages
        #[arg(long)]
        unread: bool,
    },

    /// Mark a message as read
    Read { id: String },

    /// Delete a message
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct LostFoundArgs {
    #[command(subcommand)]
    pub command: LostFoundCommand,
}

#[derive(Debug, Subcommand)]
pub enum LostFoundCommand {
    /// List lost-pet reports
    #[command(alias = "ls")]
    List {
        /// Only reports awaiting review
        #[arg(long)]
        pending: bool,
    },

    /// Approve a report and publish it as a found animal
    Approve { id: String },

    /// Reject a report
    Reject { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List rules
    #[command(alias = "ls")]
    List {
        /// Match title, summary, jurisdiction or tags
        #[arg(long, short = 's')]
        search: Option<String>,

        #[arg(long)]
        jurisdiction: Option<String>,

        /// Only published rules
        #[arg(long)]
        published: bool,
    },

    /// Create a rule, or update one with --id
    Save(RuleSaveArgs),

    /// Publish or unpublish a rule
    Publish { id: String },

    /// Delete a rule
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct RuleSaveArgs {
    /// Existing rule to update
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value_t)]
    pub title: String,

    #[arg(long)]
    pub summary: Option<String>,

    #[arg(long)]
    pub content: Option<String>,

    #[arg(long)]
    pub pdf_url: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub effective_date: Option<String>,

    #[arg(long)]
    pub jurisdiction: Option<String>,

    /// Comma-separated
    #[arg(long, default_value_t)]
    pub tags: String,

    #[arg(long)]
    pub published: bool,

    #[arg(long)]
    pub source_url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PUBLIC FORMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[command(subcommand)]
    pub command: SubmitCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Send a message to the shelter
    Contact {
        #[arg(long, default_value_t)]
        name: String,
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        phone: String,
        #[arg(long, default_value_t)]
        subject: String,
        #[arg(long, default_value_t)]
        message: String,
    },

    /// Apply to adopt an animal
    Adopt {
        #[arg(long, default_value_t)]
        name: String,
        #[arg(long, default_value_t)]
        contact_no: String,
        /// 12-digit Aadhaar number
        #[arg(long, default_value_t)]
        national_id: String,
        #[arg(long, default_value_t)]
        email: String,
        /// yes or no
        #[arg(long, default_value_t)]
        already_pet: String,
        #[arg(long, default_value_t)]
        reason: String,
        /// Animal the application is for
        #[arg(long)]
        pet_id: Option<String>,
    },

    /// Apply to volunteer
    Volunteer {
        #[arg(long, default_value_t)]
        first_name: String,
        #[arg(long, default_value_t)]
        last_name: String,
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        phone: String,
        #[arg(long, default_value_t)]
        age: String,
        #[arg(long, default_value_t)]
        address: String,
        /// Has worked with animals before
        #[arg(long)]
        experience: bool,
        #[arg(long, default_value_t)]
        motivation: String,
    },

    /// Record a donation
    Donate {
        #[arg(long, default_value_t)]
        first_name: String,
        #[arg(long, default_value_t)]
        last_name: String,
        #[arg(long, default_value_t)]
        email: String,
        #[arg(long, default_value_t)]
        phone: String,
        #[arg(long, default_value_t)]
        amount: String,
    },

    /// Report a lost pet
    LostPet {
        #[arg(long, default_value_t)]
        pet_name: String,
        #[arg(long, default_value_t)]
        species: String,
        /// YYYY-MM-DD
        #[arg(long, default_value_t)]
        date_lost: String,
        #[arg(long, default_value_t)]
        last_seen: String,
        #[arg(long, default_value_t)]
        description: String,
        #[arg(long, default_value_t)]
        owner_name: String,
        #[arg(long, default_value_t)]
        owner_phone: String,
        #[arg(long, default_value_t)]
        photo_url: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a profile value
    Set {
        /// url, api_key_env, access_token_env, ca_cert, insecure, timeout or realtime
        key: String,

        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's API key in the system keyring
    SetKey,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
