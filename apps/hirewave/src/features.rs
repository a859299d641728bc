//! Feature flags gating whole screens. Defaults match what is switched on in production.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

use crate::config::parse_bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    AdminDashboard,
    FinancialDashboard,
    JobsAdminDashboard,
    UsersManagement,
    BlogAdmin,
    RecruiterDashboard,
    RecruiterJobs,
    RecruiterCandidates,
    RecruiterInterviews,
    RecruiterApplications,
    DynamicJobForm,
    MultiStepJobCreation,
    ApplicationFormBuilder,
    JobseekerBlog,
    ReferAndWin,
}

impl Feature {
    pub const ALL: [Feature; 15] = [
        Feature::AdminDashboard,
        Feature::FinancialDashboard,
        Feature::JobsAdminDashboard,
        Feature::UsersManagement,
        Feature::BlogAdmin,
        Feature::RecruiterDashboard,
        Feature::RecruiterJobs,
        Feature::RecruiterCandidates,
        Feature::RecruiterInterviews,
        Feature::RecruiterApplications,
        Feature::DynamicJobForm,
        Feature::MultiStepJobCreation,
        Feature::ApplicationFormBuilder,
        Feature::JobseekerBlog,
        Feature::ReferAndWin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::AdminDashboard => "adminDashboard",
            Feature::FinancialDashboard => "financialDashboard",
            Feature::JobsAdminDashboard => "jobsAdminDashboard",
            Feature::UsersManagement => "usersManagement",
            Feature::BlogAdmin => "blogAdmin",
            Feature::RecruiterDashboard => "recruiterDashboard",
            Feature::RecruiterJobs => "recruiterJobs",
            Feature::RecruiterCandidates => "recruiterCandidates",
            Feature::RecruiterInterviews => "recruiterInterviews",
            Feature::RecruiterApplications => "recruiterApplications",
            Feature::DynamicJobForm => "dynamicJobForm",
            Feature::MultiStepJobCreation => "multiStepJobCreation",
            Feature::ApplicationFormBuilder => "applicationFormBuilder",
            Feature::JobseekerBlog => "jobseekerBlog",
            Feature::ReferAndWin => "referAndWin",
        }
    }

    fn enabled_by_default(self) -> bool {
        matches!(
            self,
            Feature::AdminDashboard
                | Feature::JobsAdminDashboard
                | Feature::UsersManagement
                | Feature::RecruiterDashboard
                | Feature::RecruiterJobs
                | Feature::RecruiterCandidates
                | Feature::MultiStepJobCreation
        )
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown feature '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlags {
    flags: BTreeMap<Feature, bool>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            flags: Feature::ALL
                .into_iter()
                .map(|f| (f, f.enabled_by_default()))
                .collect(),
        }
    }
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.flags.get(&feature).copied().unwrap_or(false)
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        self.flags.insert(feature, enabled);
    }

    /// Applies overrides of the form `referAndWin=on,blogAdmin=off`.
    pub fn apply_overrides(&mut self, spec: &str) -> Result<()> {
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = pair.split_once('=') else {
                bail!("expected name=value, got '{pair}'");
            };
            let feature: Feature = name.parse()?;
            self.set(feature, parse_bool(value)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_table() {
        let flags = FeatureFlags::default();
        assert!(flags.is_enabled(Feature::AdminDashboard));
        assert!(flags.is_enabled(Feature::RecruiterCandidates));
        assert!(!flags.is_enabled(Feature::FinancialDashboard));
        assert!(!flags.is_enabled(Feature::ReferAndWin));
        assert!(!flags.is_enabled(Feature::RecruiterApplications));
    }

    #[test]
    fn test_overrides_flip_individual_flags() {
        let mut flags = FeatureFlags::default();
        flags
            .apply_overrides("referAndWin=on, adminDashboard=off")
            .unwrap();
        assert!(flags.is_enabled(Feature::ReferAndWin));
        assert!(!flags.is_enabled(Feature::AdminDashboard));
    }

    #[test]
    fn test_overrides_reject_unknown_feature() {
        let mut flags = FeatureFlags::default();
        assert!(flags.apply_overrides("teleport=on").is_err());
        assert!(flags.apply_overrides("referAndWin").is_err());
    }
}
