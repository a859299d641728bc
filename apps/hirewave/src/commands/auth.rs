use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{debug, warn};

use crate::auth::{EmailOutcome, FlowState, OtpFlow};
use crate::cli::SignupArgs;
use crate::commands::{Context, Prompt};
use crate::errors::ClientError;
use crate::features::Feature;
use crate::models::user::{RegisterRequest, Role};
use crate::routing::{guard, landing_route, AppRoute, GuardOutcome};

pub async fn login(ctx: &Context, email: &str, referral: Option<String>) -> Result<()> {
    if ctx.config.social_login {
        println!("Social sign-in (Google, GitHub) is also available in the web app.");
    }

    let mut flow = OtpFlow::new(Arc::new(ctx.client.clone()), ctx.session.clone())
        .with_referral_code(referral);

    match flow.submit_email(email).await? {
        EmailOutcome::CodeSent => {}
        EmailOutcome::NoAccount { message } => {
            println!("{message}");
            println!("Create an account with `hirewave signup {email}`.");
            return Ok(());
        }
    }

    enter_code(&mut flow, &mut Prompt::stdin()).await
}

pub async fn signup(ctx: &Context, args: SignupArgs, recruiter: bool) -> Result<()> {
    if args.first_name.trim().is_empty() || args.last_name.trim().is_empty() {
        return Err(ClientError::Validation("First and last name are required".to_string()).into());
    }

    let referral = args.referral.clone();
    let request = RegisterRequest {
        email: args.email.trim().to_string(),
        first_name: args.first_name,
        last_name: args.last_name,
        confirm_password: args.password.clone(),
        password: args.password,
        dob: args.dob,
        college: args.college,
        year_of_passing: args.year_of_passing,
        status: args.status,
        referral_code: referral.clone().unwrap_or_default(),
        user_type: if recruiter {
            Role::Recruiter
        } else {
            Role::Jobseeker
        },
    };
    let email = request.email.clone();

    let ack = ctx.client.register(request).await?;
    debug!("Registered {email}, continuing with code entry");

    let mut flow = OtpFlow::new(Arc::new(ctx.client.clone()), ctx.session.clone())
        .with_referral_code(referral);
    flow.code_already_sent(&email, ack.message);
    enter_code(&mut flow, &mut Prompt::stdin()).await
}

/// Reads codes until the flow authenticates or the user quits.
/// `r` resends, `b` goes back to the email step, `q` quits.
async fn enter_code(flow: &mut OtpFlow, prompt: &mut Prompt) -> Result<()> {
    loop {
        if let Some(notice) = flow.notice() {
            println!("{notice}");
        }

        match flow.state() {
            FlowState::EnteringEmail => {
                let Some(email) = prompt.ask("Email: ").await? else {
                    bail!("input closed before sign-in finished");
                };
                match flow.submit_email(&email).await {
                    Ok(EmailOutcome::CodeSent) => {}
                    Ok(EmailOutcome::NoAccount { message }) => println!("{message}"),
                    Err(_) => print_flow_error(flow),
                }
                continue;
            }
            FlowState::Authenticated => return Ok(()),
            FlowState::CodeSent | FlowState::Verifying => {}
        }

        let question = format!(
            "Enter the 6-digit code sent to {} (r: resend, b: back, q: quit): ",
            flow.email()
        );
        let Some(line) = prompt.ask(&question).await? else {
            bail!("input closed before sign-in finished");
        };

        match line.as_str() {
            "q" => return Ok(()),
            "b" => flow.back(),
            "r" => {
                if flow.resend().await.is_err() {
                    print_flow_error(flow);
                }
            }
            code => {
                flow.input_mut().clear();
                if !flow.input_mut().paste(code) {
                    println!("The code is made of digits only.");
                    continue;
                }
                match flow.submit_code().await {
                    Ok(route) => {
                        println!("Verification successful! Your dashboard: {route}");
                        return Ok(());
                    }
                    Err(_) => print_flow_error(flow),
                }
            }
        }
    }
}

fn print_flow_error(flow: &OtpFlow) {
    if let Some(error) = flow.error() {
        eprintln!("{error}");
    }
}

pub async fn logout(ctx: &Context) -> Result<()> {
    ctx.client.logout().await?;
    println!("Signed out.");
    Ok(())
}

/// Shows the stored user, refreshing it from the profile endpoint. An
/// expired access token gets one refresh attempt.
pub async fn whoami(ctx: &Context) -> Result<()> {
    ctx.client.refresh_if_expired(Utc::now()).await?;
    if ctx.require_user().is_err() {
        println!("Not signed in.");
        return Ok(());
    }

    let user = match ctx.client.profile().await {
        Ok(user) => user,
        Err(e) if e.status() == Some(401) => {
            if !ctx.client.refresh_token().await? {
                return Err(e.into());
            }
            ctx.client.profile().await?
        }
        Err(e) => {
            warn!("Profile fetch failed, showing stored user: {e}");
            ctx.require_user()?
        }
    };

    println!("{} <{}>", user.full_name(), user.email);
    println!("Role: {}", user.user_type.as_str());
    if user.is_superuser {
        println!("Superuser: yes");
    }
    if let Some(code) = user.referral_code() {
        println!("Referral code: {code}");
    }
    Ok(())
}

pub fn dashboard(ctx: &Context) -> Result<()> {
    let user = ctx.require_user()?;
    let route = landing_route(user.user_type);
    println!("Dashboard: {route}");

    let relevant: &[Feature] = match user.user_type {
        Role::Admin => &[
            Feature::AdminDashboard,
            Feature::FinancialDashboard,
            Feature::JobsAdminDashboard,
            Feature::UsersManagement,
            Feature::BlogAdmin,
        ],
        Role::Recruiter => &[
            Feature::RecruiterDashboard,
            Feature::RecruiterJobs,
            Feature::RecruiterCandidates,
            Feature::RecruiterInterviews,
            Feature::RecruiterApplications,
            Feature::DynamicJobForm,
            Feature::MultiStepJobCreation,
            Feature::ApplicationFormBuilder,
        ],
        Role::Jobseeker => &[Feature::JobseekerBlog, Feature::ReferAndWin],
        Role::Unspecified => &[],
    };
    for feature in relevant {
        let state = if ctx.config.features.is_enabled(*feature) {
            "on"
        } else {
            "coming soon"
        };
        println!("  {:<24} {state}", feature.name());
    }
    Ok(())
}

pub fn open(ctx: &Context, path: &str) -> Result<()> {
    let Some(route) = AppRoute::parse(path) else {
        bail!("No screen at {path}");
    };

    let outcome = guard(route, &ctx.session, &ctx.config.features, Utc::now());
    match &outcome {
        GuardOutcome::Allow => println!("{route}: allowed"),
        GuardOutcome::ComingSoon(feature) => println!("{route}: {} is coming soon", feature.name()),
        GuardOutcome::RedirectToLogin { .. } | GuardOutcome::Redirect(_) => {
            if let Some(target) = outcome.redirect_path() {
                println!("{route}: redirect to {target}");
            }
        }
    }
    Ok(())
}
