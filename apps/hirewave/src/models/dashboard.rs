//! Row types for the admin and recruiter dashboard tables.

use clap::ValueEnum;
use serde::Deserialize;

use crate::models::job::Job;
use crate::table::{SortKey, TableRow};

// ────────────────────────────────────────────────────────────────────────────
// Jobs (admin jobs dashboard)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardJobRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub status: String,
    #[serde(default)]
    pub applicants: u32,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub interested: u32,
    #[serde(default)]
    pub date: String,
}

impl From<&Job> for DashboardJobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            company: job.company.clone(),
            status: job.status.to_string(),
            applicants: 0,
            views: 0,
            interested: 0,
            date: job.created_at.map(|d| d.to_rfc3339()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobSortField {
    Title,
    Company,
    Applicants,
    Status,
    Date,
    Views,
    Interested,
}

impl TableRow for DashboardJobRow {
    type Field = JobSortField;

    fn sort_key(&self, field: JobSortField) -> SortKey<'_> {
        match field {
            JobSortField::Title => SortKey::Text(&self.title),
            JobSortField::Company => SortKey::Text(&self.company),
            JobSortField::Applicants => SortKey::Number(f64::from(self.applicants)),
            JobSortField::Status => SortKey::Text(&self.status),
            JobSortField::Date => SortKey::date(&self.date),
            JobSortField::Views => SortKey::Number(f64::from(self.views)),
            JobSortField::Interested => SortKey::Number(f64::from(self.interested)),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.company.as_str(), self.status.as_str()]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Users (admin users dashboard)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub join_date: String,
    #[serde(default)]
    pub last_active: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserSortField {
    Name,
    Email,
    Role,
    Status,
    JoinDate,
    LastActive,
}

impl TableRow for UserRow {
    type Field = UserSortField;

    fn sort_key(&self, field: UserSortField) -> SortKey<'_> {
        match field {
            UserSortField::Name => SortKey::Text(&self.name),
            UserSortField::Email => SortKey::Text(&self.email),
            UserSortField::Role => SortKey::Text(&self.role),
            UserSortField::Status => SortKey::Text(&self.status),
            UserSortField::JoinDate => SortKey::date(&self.join_date),
            UserSortField::LastActive => SortKey::date(&self.last_active),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.role.as_str()]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates (recruiter dashboard)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CandidateSortField {
    Name,
    Role,
    Status,
    AppliedDate,
}

impl TableRow for CandidateRow {
    type Field = CandidateSortField;

    fn sort_key(&self, field: CandidateSortField) -> SortKey<'_> {
        match field {
            CandidateSortField::Name => SortKey::Text(&self.name),
            CandidateSortField::Role => SortKey::Text(&self.role),
            CandidateSortField::Status => SortKey::Text(&self.status),
            CandidateSortField::AppliedDate => SortKey::date(&self.applied_date),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.role.as_str()]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Applications (recruiter dashboard)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppliedJob {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: i64,
    pub candidate: Applicant,
    pub job: AppliedJob,
    pub status: String,
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub match_score: u32,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApplicationSortField {
    Candidate,
    Job,
    Status,
    AppliedDate,
    MatchScore,
}

impl TableRow for ApplicationRow {
    type Field = ApplicationSortField;

    fn sort_key(&self, field: ApplicationSortField) -> SortKey<'_> {
        match field {
            ApplicationSortField::Candidate => SortKey::Text(&self.candidate.name),
            ApplicationSortField::Job => SortKey::Text(&self.job.title),
            ApplicationSortField::Status => SortKey::Text(&self.status),
            ApplicationSortField::AppliedDate => SortKey::date(&self.applied_date),
            ApplicationSortField::MatchScore => SortKey::Number(f64::from(self.match_score)),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.candidate.name.as_str(),
            self.candidate.email.as_str(),
            self.job.title.as_str(),
        ]
    }
}

/// Match-score buckets used by the applications screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreBand {
    /// 80 and above
    High,
    /// 60 to 79
    Medium,
    /// below 60
    Low,
}

impl ScoreBand {
    pub fn of(score: u32) -> Self {
        if score >= 80 {
            ScoreBand::High
        } else if score >= 60 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

/// Dropdown filters on the applications screen. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    pub status: Option<String>,
    pub job_id: Option<i64>,
    pub score: Option<ScoreBand>,
}

impl ApplicationFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.job_id.is_none() && self.score.is_none()
    }

    pub fn matches(&self, row: &ApplicationRow) -> bool {
        self.status.as_ref().map_or(true, |s| row.status == *s)
            && self.job_id.map_or(true, |id| row.job.id == id)
            && self.score.map_or(true, |band| ScoreBand::of(row.match_score) == band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ListView, SortSpec};

    fn applications() -> Vec<ApplicationRow> {
        serde_json::from_str(
            r#"[
            {"id": 1, "candidate": {"name": "Ana Ruiz", "email": "ana@example.com"},
             "job": {"id": 10, "title": "Frontend Developer"}, "status": "Under Review",
             "appliedDate": "2023-06-15", "matchScore": 92, "skills": ["React"]},
            {"id": 2, "candidate": {"name": "Ben Ode", "email": "ben@example.com"},
             "job": {"id": 11, "title": "Data Analyst"}, "status": "Shortlisted",
             "appliedDate": "2023-06-10", "matchScore": 71},
            {"id": 3, "candidate": {"name": "Cy Tan", "email": "cy@example.com"},
             "job": {"id": 10, "title": "Frontend Developer"}, "status": "New",
             "appliedDate": "2023-06-18", "matchScore": 45}
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::of(80), ScoreBand::High);
        assert_eq!(ScoreBand::of(79), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(60), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(59), ScoreBand::Low);
    }

    #[test]
    fn test_application_filter_combines_dropdowns() {
        let rows = applications();
        let filter = ApplicationFilter {
            job_id: Some(10),
            score: Some(ScoreBand::High),
            ..Default::default()
        };
        let matched: Vec<i64> = rows.iter().filter(|r| filter.matches(r)).map(|r| r.id).collect();
        assert_eq!(matched, vec![1]);
        assert!(ApplicationFilter::default().matches(&rows[2]));
    }

    #[test]
    fn test_applications_search_by_job_title_sorted_by_date() {
        let mut view = ListView::new(applications(), 10);
        view.set_search_term("frontend");
        view.set_sort(ApplicationSortField::AppliedDate);
        let ids: Vec<i64> = view.visible().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_users_default_sort_is_newest_first() {
        let users: Vec<UserRow> = serde_json::from_str(
            r#"[
            {"id": 1, "name": "A", "email": "a@x.io", "role": "Recruiter", "status": "Active", "joinDate": "2023-01-01"},
            {"id": 2, "name": "B", "email": "b@x.io", "role": "Job Seeker", "status": "Active", "joinDate": "2023-03-01"}
        ]"#,
        )
        .unwrap();
        let view = ListView::new(users, 5).with_sort(SortSpec::desc(UserSortField::JoinDate));
        let ids: Vec<i64> = view.visible().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_job_row_from_api_job() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": 5, "title": "SRE", "company": "Acme", "status": "closed",
            "created_at": "2024-04-01T00:00:00Z"
        }))
        .unwrap();
        let row = DashboardJobRow::from(&job);
        assert_eq!(row.status, "closed");
        assert!(matches!(row.sort_key(JobSortField::Date), SortKey::Date(Some(_))));
        assert_eq!(row.search_fields(), vec!["SRE", "Acme", "closed"]);
    }
}
