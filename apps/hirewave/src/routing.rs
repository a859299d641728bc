//! Screen routes, the role → landing-route table and the access guard.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::features::{Feature, FeatureFlags};
use crate::models::user::Role;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    Login,
    Signup,
    RecruiterSignup,
    ReferAndWin,
    JobDetail(i64),
    Settings,
    AdminDashboard,
    FinancialDashboard,
    AdminJobs,
    AdminJobDetail(i64),
    UsersManagement,
    BlogAdmin,
    RecruiterDashboard,
    RecruiterJobs,
    RecruiterJobCreate,
    RecruiterJobForm,
    RecruiterCandidates,
    RecruiterInterviews,
    RecruiterApplications,
    JobseekerDashboard,
    SavedJobs,
    JobseekerBlog,
}

/// Who may open a route. An empty `roles` list admits any signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub requires_login: bool,
    pub roles: &'static [Role],
    pub feature: Option<Feature>,
}

impl Access {
    const PUBLIC: Access = Access {
        requires_login: false,
        roles: &[],
        feature: None,
    };

    const fn signed_in(roles: &'static [Role], feature: Option<Feature>) -> Access {
        Access {
            requires_login: true,
            roles,
            feature,
        }
    }
}

const ADMIN: &[Role] = &[Role::Admin];
const RECRUITER: &[Role] = &[Role::Recruiter];
const JOBSEEKER: &[Role] = &[Role::Jobseeker];

impl AppRoute {
    pub fn path(&self) -> String {
        match self {
            AppRoute::Home => "/".to_string(),
            AppRoute::Login => "/login".to_string(),
            AppRoute::Signup => "/signup".to_string(),
            AppRoute::RecruiterSignup => "/recruiter-signup".to_string(),
            AppRoute::ReferAndWin => "/refer-and-win".to_string(),
            AppRoute::JobDetail(id) => format!("/job/{id}"),
            AppRoute::Settings => "/dashboard/settings".to_string(),
            AppRoute::AdminDashboard => "/dashboard/admin".to_string(),
            AppRoute::FinancialDashboard => "/dashboard/admin/financial".to_string(),
            AppRoute::AdminJobs => "/dashboard/admin/jobs".to_string(),
            AppRoute::AdminJobDetail(id) => format!("/dashboard/admin/jobs/{id}"),
            AppRoute::UsersManagement => "/dashboard/users".to_string(),
            AppRoute::BlogAdmin => "/dashboard/admin/blog".to_string(),
            AppRoute::RecruiterDashboard => "/dashboard/recruiter".to_string(),
            AppRoute::RecruiterJobs => "/dashboard/recruiter/jobs".to_string(),
            AppRoute::RecruiterJobCreate => "/dashboard/recruiter/jobs/create".to_string(),
            AppRoute::RecruiterJobForm => "/dashboard/recruiter/create-job-form".to_string(),
            AppRoute::RecruiterCandidates => "/dashboard/recruiter/candidates".to_string(),
            AppRoute::RecruiterInterviews => "/dashboard/recruiter/interviews".to_string(),
            AppRoute::RecruiterApplications => "/dashboard/recruiter/applications".to_string(),
            AppRoute::JobseekerDashboard => "/dashboard/jobseeker".to_string(),
            AppRoute::SavedJobs => "/dashboard/jobseeker/saved-jobs".to_string(),
            AppRoute::JobseekerBlog => "/jobseeker/blog".to_string(),
        }
    }

    /// Resolves a browser-style path. Query strings, fragments and a
    /// trailing slash are ignored.
    pub fn parse(path: &str) -> Option<AppRoute> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => AppRoute::Home,
            ["login"] => AppRoute::Login,
            ["signup"] => AppRoute::Signup,
            ["recruiter-signup"] => AppRoute::RecruiterSignup,
            ["refer-and-win"] => AppRoute::ReferAndWin,
            ["job", id] => AppRoute::JobDetail(id.parse().ok()?),
            ["jobseeker", "blog"] => AppRoute::JobseekerBlog,
            ["dashboard", rest @ ..] => match rest {
                ["settings"] => AppRoute::Settings,
                ["users"] => AppRoute::UsersManagement,
                ["admin"] => AppRoute::AdminDashboard,
                ["admin", "financial"] => AppRoute::FinancialDashboard,
                ["admin", "jobs"] => AppRoute::AdminJobs,
                ["admin", "jobs", id] => AppRoute::AdminJobDetail(id.parse().ok()?),
                ["admin", "blog"] => AppRoute::BlogAdmin,
                ["recruiter"] => AppRoute::RecruiterDashboard,
                ["recruiter", "jobs"] => AppRoute::RecruiterJobs,
                ["recruiter", "jobs", "create"] => AppRoute::RecruiterJobCreate,
                ["recruiter", "create-job-form"] => AppRoute::RecruiterJobForm,
                ["recruiter", "candidates"] => AppRoute::RecruiterCandidates,
                ["recruiter", "interviews"] => AppRoute::RecruiterInterviews,
                ["recruiter", "applications"] => AppRoute::RecruiterApplications,
                ["jobseeker"] => AppRoute::JobseekerDashboard,
                ["jobseeker", "saved-jobs"] => AppRoute::SavedJobs,
                _ => return None,
            },
            _ => return None,
        };
        Some(route)
    }

    pub fn access(&self) -> Access {
        use Feature as F;
        match self {
            AppRoute::Home
            | AppRoute::Login
            | AppRoute::Signup
            | AppRoute::RecruiterSignup
            | AppRoute::JobDetail(_) => Access::PUBLIC,
            AppRoute::ReferAndWin => Access {
                feature: Some(F::ReferAndWin),
                ..Access::PUBLIC
            },
            AppRoute::Settings => Access::signed_in(&[], None),
            AppRoute::AdminDashboard => Access::signed_in(ADMIN, Some(F::AdminDashboard)),
            AppRoute::FinancialDashboard => Access::signed_in(ADMIN, Some(F::FinancialDashboard)),
            AppRoute::AdminJobs | AppRoute::AdminJobDetail(_) => {
                Access::signed_in(ADMIN, Some(F::JobsAdminDashboard))
            }
            AppRoute::UsersManagement => Access::signed_in(ADMIN, Some(F::UsersManagement)),
            AppRoute::BlogAdmin => Access::signed_in(ADMIN, Some(F::BlogAdmin)),
            AppRoute::RecruiterDashboard => {
                Access::signed_in(RECRUITER, Some(F::RecruiterDashboard))
            }
            AppRoute::RecruiterJobs => Access::signed_in(RECRUITER, Some(F::RecruiterJobs)),
            AppRoute::RecruiterJobCreate => {
                Access::signed_in(RECRUITER, Some(F::MultiStepJobCreation))
            }
            AppRoute::RecruiterJobForm => Access::signed_in(RECRUITER, Some(F::DynamicJobForm)),
            AppRoute::RecruiterCandidates => {
                Access::signed_in(RECRUITER, Some(F::RecruiterCandidates))
            }
            AppRoute::RecruiterInterviews => {
                Access::signed_in(RECRUITER, Some(F::RecruiterInterviews))
            }
            AppRoute::RecruiterApplications => {
                Access::signed_in(RECRUITER, Some(F::RecruiterApplications))
            }
            AppRoute::JobseekerDashboard | AppRoute::SavedJobs => {
                Access::signed_in(JOBSEEKER, None)
            }
            AppRoute::JobseekerBlog => Access::signed_in(JOBSEEKER, Some(F::JobseekerBlog)),
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a user lands after signing in.
pub fn landing_route(role: Role) -> AppRoute {
    match role {
        Role::Admin => AppRoute::AdminDashboard,
        Role::Recruiter => AppRoute::RecruiterDashboard,
        Role::Jobseeker => AppRoute::JobseekerDashboard,
        Role::Unspecified => AppRoute::Home,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectToLogin { return_url: String },
    Redirect(AppRoute),
    ComingSoon(Feature),
}

impl GuardOutcome {
    /// The path the shell should navigate to, if any.
    pub fn redirect_path(&self) -> Option<String> {
        match self {
            GuardOutcome::RedirectToLogin { return_url } => {
                Some(format!("{}?returnUrl={return_url}", AppRoute::Login.path()))
            }
            GuardOutcome::Redirect(route) => Some(route.path()),
            GuardOutcome::Allow | GuardOutcome::ComingSoon(_) => None,
        }
    }
}

/// Decides whether the current session may open `route`.
///
/// Login is checked first, then role membership (superusers skip it), then
/// the feature flag behind the screen.
pub fn guard(
    route: AppRoute,
    session: &Session,
    flags: &FeatureFlags,
    now: DateTime<Utc>,
) -> GuardOutcome {
    let access = route.access();

    if access.requires_login {
        if !session.is_logged_in(now) {
            debug!("Guard: {route} requires login");
            return GuardOutcome::RedirectToLogin {
                return_url: route.path(),
            };
        }

        if let Some(user) = session.current_user() {
            if !user.is_superuser
                && !access.roles.is_empty()
                && !access.roles.contains(&user.user_type)
            {
                let landing = landing_route(user.user_type);
                debug!(
                    "Guard: role {} not allowed on {route}, sending to {landing}",
                    user.user_type.as_str()
                );
                return GuardOutcome::Redirect(landing);
            }
        }
    }

    match access.feature {
        Some(feature) if !flags.is_enabled(feature) => GuardOutcome::ComingSoon(feature),
        _ => GuardOutcome::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::AuthResponse;
    use crate::session::token::unsigned_token;
    use chrono::Duration;
    use serde_json::json;

    fn signed_in(role: &str, superuser: bool) -> Session {
        let token = unsigned_token(&json!({"exp": (Utc::now() + Duration::hours(1)).timestamp()}));
        let auth: AuthResponse = serde_json::from_value(json!({
            "access": token,
            "user": {
                "id": "7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11",
                "email": "ada@example.com",
                "user_type": role,
                "is_superuser": superuser
            }
        }))
        .unwrap();
        let session = Session::in_memory();
        session.store_auth(&auth).unwrap();
        session
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(landing_route(Role::Admin).path(), "/dashboard/admin");
        assert_eq!(landing_route(Role::Recruiter).path(), "/dashboard/recruiter");
        assert_eq!(landing_route(Role::Jobseeker).path(), "/dashboard/jobseeker");
        assert_eq!(landing_route(Role::Unspecified).path(), "/");
    }

    #[test]
    fn test_parse_round_trips_paths() {
        for route in [
            AppRoute::Home,
            AppRoute::JobDetail(42),
            AppRoute::AdminJobDetail(7),
            AppRoute::RecruiterJobCreate,
            AppRoute::SavedJobs,
            AppRoute::JobseekerBlog,
        ] {
            assert_eq!(AppRoute::parse(&route.path()), Some(route));
        }
        assert_eq!(
            AppRoute::parse("/dashboard/admin/?tab=users"),
            Some(AppRoute::AdminDashboard)
        );
        assert_eq!(AppRoute::parse("/job/abc"), None);
        assert_eq!(AppRoute::parse("/nowhere"), None);
    }

    #[test]
    fn test_anonymous_visitor_goes_to_login_with_return_url() {
        let outcome = guard(
            AppRoute::RecruiterJobs,
            &Session::in_memory(),
            &FeatureFlags::default(),
            Utc::now(),
        );
        assert_eq!(
            outcome.redirect_path().as_deref(),
            Some("/login?returnUrl=/dashboard/recruiter/jobs")
        );
    }

    #[test]
    fn test_wrong_role_is_sent_to_own_dashboard() {
        let session = signed_in("jobseeker", false);
        let outcome = guard(
            AppRoute::AdminDashboard,
            &session,
            &FeatureFlags::default(),
            Utc::now(),
        );
        assert_eq!(outcome, GuardOutcome::Redirect(AppRoute::JobseekerDashboard));
    }

    #[test]
    fn test_superuser_passes_role_checks() {
        let session = signed_in("recruiter", true);
        let outcome = guard(
            AppRoute::UsersManagement,
            &session,
            &FeatureFlags::default(),
            Utc::now(),
        );
        assert_eq!(outcome, GuardOutcome::Allow);
    }

    #[test]
    fn test_disabled_feature_is_coming_soon() {
        let session = signed_in("admin", false);
        let outcome = guard(
            AppRoute::FinancialDashboard,
            &session,
            &FeatureFlags::default(),
            Utc::now(),
        );
        assert_eq!(outcome, GuardOutcome::ComingSoon(Feature::FinancialDashboard));

        let mut flags = FeatureFlags::default();
        flags.set(Feature::FinancialDashboard, true);
        assert_eq!(
            guard(AppRoute::FinancialDashboard, &session, &flags, Utc::now()),
            GuardOutcome::Allow
        );
    }

    #[test]
    fn test_public_routes_need_no_session() {
        let outcome = guard(
            AppRoute::JobDetail(3),
            &Session::in_memory(),
            &FeatureFlags::default(),
            Utc::now(),
        );
        assert_eq!(outcome, GuardOutcome::Allow);
    }
}
