use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

use crate::cli::{parse_sort_fields, sort_field_names, TableArgs, TableKind};
use crate::commands::render::format_page;
use crate::models::dashboard::{
    ApplicationFilter, ApplicationRow, ApplicationSortField, CandidateRow, CandidateSortField,
    UserRow, UserSortField,
};
use crate::table::{ListView, SortSpec, TableRow};

pub const USERS_PAGE_SIZE: usize = 5;
pub const CANDIDATES_PAGE_SIZE: usize = 10;
pub const APPLICATIONS_PAGE_SIZE: usize = 10;

pub async fn run_table(args: TableArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    print!("{}", render_table(&args, &raw)?);
    Ok(())
}

/// Loads the rows, applies search, filters, sort clicks and the page, and
/// renders the result.
pub fn render_table(args: &TableArgs, raw: &str) -> Result<String> {
    match args.kind {
        TableKind::Users => {
            let rows: Vec<UserRow> = load_rows(raw, args)?;
            let mut view = ListView::new(rows, USERS_PAGE_SIZE)
                .with_sort(SortSpec::desc(UserSortField::JoinDate));
            prepare(&mut view, args)?;
            Ok(format_page(
                &view.page(),
                &["Name", "Email", "Role", "Status", "Joined", "Last active"],
                |u| {
                    vec![
                        u.name.clone(),
                        u.email.clone(),
                        u.role.clone(),
                        u.status.clone(),
                        u.join_date.clone(),
                        u.last_active.clone(),
                    ]
                },
            ))
        }
        TableKind::Candidates => {
            let rows: Vec<CandidateRow> = load_rows(raw, args)?;
            let mut view = ListView::new(rows, CANDIDATES_PAGE_SIZE);
            if let Some(status) = args.status.clone() {
                view.set_filter(move |c: &CandidateRow| c.status.eq_ignore_ascii_case(&status));
            }
            prepare::<CandidateRow, CandidateSortField>(&mut view, args)?;
            Ok(format_page(
                &view.page(),
                &["Name", "Email", "Role", "Status", "Applied", "Experience"],
                |c| {
                    vec![
                        c.name.clone(),
                        c.email.clone(),
                        c.role.clone(),
                        c.status.clone(),
                        c.applied_date.clone(),
                        c.experience.clone(),
                    ]
                },
            ))
        }
        TableKind::Applications => {
            let rows: Vec<ApplicationRow> = load_rows(raw, args)?;
            let mut view = ListView::new(rows, APPLICATIONS_PAGE_SIZE);
            let filter = ApplicationFilter {
                status: args.status.clone(),
                job_id: args.job,
                score: args.score,
            };
            if !filter.is_empty() {
                view.set_filter(move |r| filter.matches(r));
            }
            prepare::<ApplicationRow, ApplicationSortField>(&mut view, args)?;
            Ok(format_page(
                &view.page(),
                &["Candidate", "Job", "Status", "Applied", "Match"],
                |a| {
                    vec![
                        a.candidate.name.clone(),
                        a.job.title.clone(),
                        a.status.clone(),
                        a.applied_date.clone(),
                        format!("{}%", a.match_score),
                    ]
                },
            ))
        }
    }
}

fn load_rows<R: DeserializeOwned>(raw: &str, args: &TableArgs) -> Result<Vec<R>> {
    serde_json::from_str(raw)
        .with_context(|| format!("{} is not a JSON array of rows", args.file.display()))
}

/// Search resets to page 1, then each `--sort` acts as one header click.
fn prepare<R, F>(view: &mut ListView<R>, args: &TableArgs) -> Result<()>
where
    R: TableRow<Field = F>,
    F: clap::ValueEnum + Copy + PartialEq,
{
    if let Some(term) = &args.search {
        view.set_search_term(term.as_str());
    }

    let fields: Vec<F> = parse_sort_fields(&args.sort).map_err(|e| {
        anyhow!(
            "{e}; valid sort columns: {}",
            sort_field_names(args.kind).join(", ")
        )
    })?;
    for field in fields {
        view.set_sort(field);
    }

    view.go_to_page(args.page);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::ScoreBand;
    use std::path::PathBuf;

    fn args(kind: TableKind) -> TableArgs {
        TableArgs {
            kind,
            file: PathBuf::from("rows.json"),
            search: None,
            sort: Vec::new(),
            status: None,
            job: None,
            score: None,
            page: 1,
        }
    }

    const USERS: &str = r#"[
        {"id": 1, "name": "Ana", "email": "ana@x.io", "role": "Recruiter", "status": "Active", "joinDate": "2023-01-10", "lastActive": "today"},
        {"id": 2, "name": "Bo", "email": "bo@x.io", "role": "Job Seeker", "status": "Active", "joinDate": "2023-03-01", "lastActive": "today"},
        {"id": 3, "name": "Cy", "email": "cy@x.io", "role": "Admin", "status": "Inactive", "joinDate": "not a date", "lastActive": "never"}
    ]"#;

    const APPLICATIONS: &str = r#"[
        {"id": 1, "candidate": {"name": "Ana Ruiz", "email": "ana@example.com"},
         "job": {"id": 10, "title": "Frontend Developer"}, "status": "New",
         "appliedDate": "2023-06-15", "matchScore": 92},
        {"id": 2, "candidate": {"name": "Ben Ode", "email": "ben@example.com"},
         "job": {"id": 11, "title": "Data Analyst"}, "status": "New",
         "appliedDate": "2023-06-10", "matchScore": 65}
    ]"#;

    fn data_lines(out: &str) -> Vec<&str> {
        out.lines().skip(2).filter(|l| !l.starts_with("Showing")).collect()
    }

    #[test]
    fn test_users_start_newest_first_with_bad_dates_last() {
        let out = render_table(&args(TableKind::Users), USERS).unwrap();
        let names: Vec<&str> = data_lines(&out)
            .iter()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(names, vec!["Bo", "Ana", "Cy"]);
    }

    #[test]
    fn test_sort_click_on_active_column_flips_it() {
        let mut a = args(TableKind::Users);
        a.sort = vec!["join-date".to_string()];
        let out = render_table(&a, USERS).unwrap();
        let first = data_lines(&out)[0];
        assert!(first.starts_with("Cy"));
    }

    #[test]
    fn test_application_score_band_filter() {
        let mut a = args(TableKind::Applications);
        a.score = Some(ScoreBand::Medium);
        let out = render_table(&a, APPLICATIONS).unwrap();
        assert!(out.contains("Ben Ode"));
        assert!(!out.contains("Ana Ruiz"));
        assert!(out.contains("Showing 1–1 of 1"));
    }

    #[test]
    fn test_unknown_sort_column_lists_valid_ones() {
        let mut a = args(TableKind::Applications);
        a.sort = vec!["salary".to_string()];
        let err = render_table(&a, APPLICATIONS).unwrap_err();
        assert!(err.to_string().contains("match-score"));
    }

    #[test]
    fn test_search_without_hits_renders_empty_state() {
        let mut a = args(TableKind::Candidates);
        a.search = Some("zzz".to_string());
        let out = render_table(&a, "[]").unwrap();
        assert_eq!(out, "No records found\n");
    }
}
