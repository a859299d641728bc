use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::dashboard::{
    ApplicationSortField, CandidateSortField, JobSortField, ScoreBand, UserSortField,
};
use crate::models::job::{JobStatus, JobType};

#[derive(Parser)]
#[command(name = "hirewave", version, about = "HireWave job board from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a one-time code mailed to you
    Login {
        email: String,
        /// Referral code to credit on first sign-in
        #[arg(long)]
        referral: Option<String>,
    },

    /// Create a job seeker account
    Signup(SignupArgs),

    /// Create a recruiter account
    RecruiterSignup(SignupArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Print the dashboard route for the signed-in user
    Dashboard,

    /// Browse the public job list
    Jobs {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = crate::table::remote::DEFAULT_JOBS_PAGE_SIZE)]
        limit: usize,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type", value_parser = parse_job_type)]
        job_type: Option<JobType>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Show one job
    Job { id: i64 },

    /// Delete a job (admin)
    JobDelete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Change a job's status (admin)
    JobStatus {
        id: i64,
        #[arg(value_parser = parse_job_status)]
        status: JobStatus,
    },

    /// Admin jobs table over the live job list
    ManageJobs {
        #[arg(long)]
        search: Option<String>,
        /// Sort column; repeat to toggle direction like a header click
        #[arg(long, value_enum)]
        sort: Vec<JobSortField>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Delete this job first (asks for confirmation)
        #[arg(long)]
        delete: Option<i64>,
    },

    /// Render a dashboard table from a JSON file of rows
    Table(TableArgs),

    /// List your saved jobs
    Saved,

    /// Add a job to your saved list, or remove it if already saved
    Save { id: i64 },

    /// Toggle the bookmark on a job
    Bookmark { id: i64 },

    /// Read and comment on the blog
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },

    /// Check whether the current session may open a screen
    Open { path: String },
}

#[derive(Args)]
pub struct SignupArgs {
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub dob: Option<NaiveDate>,
    #[arg(long)]
    pub college: Option<String>,
    #[arg(long)]
    pub year_of_passing: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Referral code; "NEW" is sent when omitted
    #[arg(long)]
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    Users,
    Candidates,
    Applications,
}

#[derive(Args)]
pub struct TableArgs {
    #[arg(value_enum)]
    pub kind: TableKind,
    /// JSON array of rows
    #[arg(long)]
    pub file: PathBuf,
    #[arg(long)]
    pub search: Option<String>,
    /// Sort column for the chosen table; repeat to toggle direction
    #[arg(long)]
    pub sort: Vec<String>,
    /// Exact status match (candidates, applications)
    #[arg(long)]
    pub status: Option<String>,
    /// Job id (applications)
    #[arg(long)]
    pub job: Option<i64>,
    /// Match-score band (applications)
    #[arg(long, value_enum)]
    pub score: Option<ScoreBand>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Subcommand)]
pub enum BlogAction {
    /// List published posts
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a post and its comments
    Show { slug: String },
    /// Comment on a post
    Comment { post_id: i64, text: String },
    /// List blog categories
    Categories,
}

/// Resolves a `--sort` value against the chosen table's columns.
pub fn parse_sort_fields<F: ValueEnum>(raw: &[String]) -> Result<Vec<F>, String> {
    raw.iter().map(|s| F::from_str(s, true)).collect()
}

/// Keeps the column enums reachable from one place for help output.
pub fn sort_field_names(kind: TableKind) -> Vec<String> {
    fn names<F: ValueEnum>() -> Vec<String> {
        F::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect()
    }
    match kind {
        TableKind::Users => names::<UserSortField>(),
        TableKind::Candidates => names::<CandidateSortField>(),
        TableKind::Applications => names::<ApplicationSortField>(),
    }
}

fn parse_job_status(raw: &str) -> Result<JobStatus, String> {
    raw.parse()
}

fn parse_job_type(raw: &str) -> Result<JobType, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .ok()
        .filter(|t| *t != JobType::Other)
        .ok_or_else(|| {
            format!("unknown job type '{raw}' (expected full-time, part-time, contract, internship or remote)")
        })
}
