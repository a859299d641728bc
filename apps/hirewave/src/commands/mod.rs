//! Command handlers behind the CLI subcommands.

pub mod auth;
pub mod blog;
pub mod jobs;
pub mod render;
pub mod tables;

use std::io::Write;

use anyhow::{bail, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::api_client::HireWaveClient;
use crate::cli::Commands;
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::user::User;
use crate::routing::{guard, AppRoute, GuardOutcome};
use crate::session::Session;

/// Everything a command needs, built once in `main`.
pub struct Context {
    pub config: Config,
    pub session: Session,
    pub client: HireWaveClient,
}

impl Context {
    /// The signed-in user, or `NotAuthenticated` when the session is missing
    /// or expired.
    pub fn require_user(&self) -> Result<User, ClientError> {
        if !self.session.is_logged_in(Utc::now()) {
            return Err(ClientError::NotAuthenticated);
        }
        self.session
            .current_user()
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Runs the screen guard for `route` and turns anything but `Allow`
    /// into an error the user can act on.
    pub fn require_access(&self, route: AppRoute) -> Result<()> {
        match guard(route, &self.session, &self.config.features, Utc::now()) {
            GuardOutcome::Allow => Ok(()),
            GuardOutcome::RedirectToLogin { .. } => Err(ClientError::NotAuthenticated.into()),
            GuardOutcome::Redirect(_) => {
                Err(ClientError::from_response(reqwest::StatusCode::FORBIDDEN, "").into())
            }
            GuardOutcome::ComingSoon(feature) => {
                bail!("{} is coming soon", feature.name())
            }
        }
    }
}

pub async fn dispatch(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login { email, referral } => auth::login(ctx, &email, referral).await,
        Commands::Signup(args) => auth::signup(ctx, args, false).await,
        Commands::RecruiterSignup(args) => auth::signup(ctx, args, true).await,
        Commands::Logout => auth::logout(ctx).await,
        Commands::Whoami => auth::whoami(ctx).await,
        Commands::Dashboard => auth::dashboard(ctx),
        Commands::Open { path } => auth::open(ctx, &path),
        Commands::Jobs {
            page,
            limit,
            search,
            job_type,
            location,
        } => jobs::list(ctx, page, limit, search, job_type, location).await,
        Commands::Job { id } => jobs::show(ctx, id).await,
        Commands::JobDelete { id, yes } => jobs::delete(ctx, id, yes).await,
        Commands::JobStatus { id, status } => jobs::set_status(ctx, id, status).await,
        Commands::ManageJobs {
            search,
            sort,
            page,
            delete,
        } => jobs::manage(ctx, search, sort, page, delete).await,
        Commands::Table(args) => tables::run_table(args).await,
        Commands::Saved => jobs::saved(ctx).await,
        Commands::Save { id } => jobs::toggle_saved(ctx, id).await,
        Commands::Bookmark { id } => jobs::bookmark(ctx, id).await,
        Commands::Blog { action } => blog::run(ctx, action).await,
    }
}

/// Line-oriented stdin for the interactive steps.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints `question` and waits for one line. `None` once stdin is closed.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        ))
    }
}
