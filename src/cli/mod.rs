use clap::{Args, Parser, Subcommand};
use rail_concession::workflows::{ApplicationStatus, PassDuration, Role, TravelClass};

pub mod commands;

#[derive(Parser)]
#[command(name = "concession")]
#[command(about = "Student railway concession applications")]
#[command(long_about = "Submit railway concession applications as a student and move them through \
                       college and railway review as an administrator. Start with \
                       'concession login' to pick who you are acting as.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a session as a student or administrator
    Login {
        /// Role to act as
        #[arg(long, help = "student, college_admin or railway_admin")]
        role: Role,
        /// User id for the session
        #[arg(long)]
        id: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// End the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Submit a new concession application (students)
    Submit {
        #[command(flatten)]
        journey: JourneyArgs,
    },
    /// Work on an application before submitting it
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Approve an application at your review stage
    Approve {
        /// Application id
        id: String,
        /// Remarks stored with the approval
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Reject an application
    Reject {
        /// Application id
        id: String,
        /// Reason shown to the student
        #[arg(long)]
        reason: Option<String>,
    },
    /// Move an application to an explicit status
    Transition {
        /// Application id
        id: String,
        /// Target status: college_approved, railway_approved or rejected
        status: ApplicationStatus,
        /// Rejection reason or approval remarks
        #[arg(long)]
        reason: Option<String>,
    },
    /// Applications waiting on your review
    Queue,
    /// Your applications, most recent first (all applications for administrators)
    History,
    /// Show one application
    Show {
        /// Application id
        id: String,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dashboard counts and the active pass
    Status,
    /// List or search the station catalog
    Stations {
        /// Code, name or city to search for
        query: Option<String>,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum DraftAction {
    /// Save fields into your draft; unset fields keep their saved value
    Save {
        #[command(flatten)]
        journey: DraftArgs,
    },
    /// Show your saved draft
    Show,
    /// Throw away your saved draft
    Discard,
    /// Submit your saved draft as an application
    Submit,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Student name
    #[arg(long)]
    pub name: Option<String>,
    /// College name; for college admins this is the college they review
    #[arg(long)]
    pub college: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    /// Permanent registration number
    #[arg(long)]
    pub prn: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct JourneyArgs {
    /// Source station code
    #[arg(long = "from")]
    pub source: String,
    /// Destination station code
    #[arg(long = "to")]
    pub destination: String,
    #[arg(long = "class", default_value = "second", help = "first or second")]
    pub travel_class: TravelClass,
    #[arg(long, default_value = "monthly", help = "monthly or quarterly")]
    pub duration: PassDuration,
    /// Reason for travel
    #[arg(long)]
    pub reason: Option<String>,
    /// Reference to the uploaded college id card
    #[arg(long)]
    pub college_id_uri: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    #[arg(long = "from")]
    pub source: Option<String>,
    #[arg(long = "to")]
    pub destination: Option<String>,
    #[arg(long = "class")]
    pub travel_class: Option<TravelClass>,
    #[arg(long)]
    pub duration: Option<PassDuration>,
    #[arg(long)]
    pub reason: Option<String>,
    #[arg(long)]
    pub college_id_uri: Option<String>,
}
