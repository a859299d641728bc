use anyhow::Result;
use tracing::{info, warn};

use crate::commands::render::{format_page, showing, truncate};
use crate::commands::{Context, Prompt};
use crate::errors::ClientError;
use crate::models::dashboard::{DashboardJobRow, JobSortField};
use crate::models::job::{BookmarkStatus, Job, JobQuery, JobStatus, JobType, JobUpdate};
use crate::routing::AppRoute;
use crate::table::remote::RemoteJobPager;
use crate::table::{ListView, PageWindow, SortSpec};

pub const MANAGE_JOBS_PAGE_SIZE: usize = 5;
const FETCH_ALL_LIMIT: usize = 100;

pub async fn list(
    ctx: &Context,
    page: usize,
    limit: usize,
    search: Option<String>,
    job_type: Option<JobType>,
    location: Option<String>,
) -> Result<()> {
    let mut pager = RemoteJobPager::new(limit);
    pager.set_query(JobQuery {
        search,
        job_type,
        location,
    });

    pager.go_to_page(&ctx.client, page).await?;
    let jobs = pager.jobs();
    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    for job in jobs {
        println!("{}", job_line(job));
    }
    println!();
    let start = (pager.current_page() - 1) * limit;
    let window = PageWindow {
        start: start + 1,
        end: start + jobs.len(),
        total: pager.total_count().unwrap_or(jobs.len()),
    };
    println!(
        "{}  (page {} of {})",
        showing(window),
        pager.current_page(),
        pager.total_pages().unwrap_or(1)
    );
    Ok(())
}

fn job_line(job: &Job) -> String {
    let mut line = format!("#{:<5} {} - {}", job.id, job.title, job.company);
    if !job.location.is_empty() {
        line.push_str(&format!(" ({})", job.location));
    }
    if !job.salary.is_empty() {
        line.push_str(&format!(" · {}", job.salary));
    }
    line
}

pub async fn show(ctx: &Context, id: i64) -> Result<()> {
    let job = ctx.client.get_job(id).await?;
    println!("{}", job.title);
    println!("{} · {} · {}", job.company, job.location, job.status);
    if !job.salary.is_empty() {
        println!("Salary: {}", job.salary);
    }
    if let Some(link) = &job.external_link {
        println!("Apply: {link}");
    }
    if !job.description.is_empty() {
        println!();
        println!("{}", job.description);
    }
    if !job.requirements.is_empty() {
        println!();
        println!("Requirements:");
        println!("{}", job.requirements);
    }

    if ctx.require_user().is_ok() {
        match ctx.client.is_job_saved(id).await {
            Ok(true) => println!("\n★ Saved"),
            Ok(false) => {}
            Err(e) => warn!("Could not check saved state for job {id}: {e}"),
        }
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: i64, yes: bool) -> Result<()> {
    ctx.require_access(AppRoute::AdminJobs)?;
    if !yes && !Prompt::stdin().confirm(&format!("Delete job #{id}?")).await? {
        println!("Cancelled.");
        return Ok(());
    }
    ctx.client.delete_job(id).await?;
    info!("Deleted job {id}");
    println!("Job #{id} deleted.");
    Ok(())
}

pub async fn set_status(ctx: &Context, id: i64, status: JobStatus) -> Result<()> {
    ctx.require_access(AppRoute::AdminJobs)?;
    let update = JobUpdate {
        status: Some(status),
        ..Default::default()
    };
    let job = ctx.client.update_job(id, &update).await?;
    println!("Job #{} is now {}.", job.id, job.status);
    Ok(())
}

/// Admin jobs table: every job is fetched, then searched, sorted and paged
/// locally. The table opens sorted by date, newest first.
pub async fn manage(
    ctx: &Context,
    search: Option<String>,
    sort: Vec<JobSortField>,
    page: usize,
    delete: Option<i64>,
) -> Result<()> {
    ctx.require_access(AppRoute::AdminJobs)?;

    let mut view = ListView::new(Vec::new(), MANAGE_JOBS_PAGE_SIZE)
        .with_sort(SortSpec::desc(JobSortField::Date));
    let jobs = fetch_all_jobs(ctx).await?;
    view.replace_records(jobs.iter().map(DashboardJobRow::from).collect());

    if let Some(term) = search {
        view.set_search_term(term);
    }
    for field in sort {
        view.set_sort(field);
    }
    view.go_to_page(page);

    if let Some(id) = delete {
        if Prompt::stdin()
            .confirm(&format!("Are you sure you want to delete job #{id}?"))
            .await?
        {
            ctx.client.delete_job(id).await?;
            let removed = view.remove_where(|row| row.id == id);
            info!("Deleted job {id} ({removed} row(s) dropped from view)");
            println!("Job #{id} deleted.");
        }
    }

    let page = view.page();
    print!(
        "{}",
        format_page(
            &page,
            &["ID", "Title", "Company", "Status", "Applicants", "Views", "Posted"],
            |row| {
                vec![
                    row.id.to_string(),
                    truncate(&row.title, 40),
                    truncate(&row.company, 24),
                    row.status.clone(),
                    row.applicants.to_string(),
                    row.views.to_string(),
                    row.date.get(..10).unwrap_or(&row.date).to_string(),
                ]
            },
        )
    );
    Ok(())
}

async fn fetch_all_jobs(ctx: &Context) -> Result<Vec<Job>, ClientError> {
    let query = JobQuery::default();
    let mut jobs = Vec::new();
    let mut page = 1;
    loop {
        let batch = ctx.client.list_jobs(page, FETCH_ALL_LIMIT, &query).await?;
        let done = batch.results.is_empty()
            || (!batch.has_more && batch.next.is_none())
            || jobs.len() + batch.results.len() >= batch.count as usize;
        jobs.extend(batch.results);
        if done {
            return Ok(jobs);
        }
        page += 1;
    }
}

pub async fn saved(ctx: &Context) -> Result<()> {
    ctx.require_user()?;
    let saved = ctx.client.saved_jobs().await?;
    if saved.is_empty() {
        println!("You haven't saved any jobs yet.");
        return Ok(());
    }
    for entry in &saved {
        match &entry.job_details {
            Some(job) => println!("{}", job_line(job)),
            None => println!("#{:<5} (details unavailable)", entry.job),
        }
    }
    println!();
    println!("{} saved job(s)", saved.len());
    Ok(())
}

pub async fn toggle_saved(ctx: &Context, id: i64) -> Result<()> {
    ctx.require_user()?;
    if ctx.client.toggle_saved_job(id).await? {
        println!("Job #{id} saved.");
    } else {
        println!("Job #{id} removed from saved jobs.");
    }
    Ok(())
}

pub async fn bookmark(ctx: &Context, id: i64) -> Result<()> {
    ctx.require_user()?;
    let response = ctx.client.bookmark_job(id).await?;
    let fallback = match response.status {
        BookmarkStatus::Added => "Job bookmarked.",
        BookmarkStatus::Removed => "Bookmark removed.",
    };
    if response.message.is_empty() {
        println!("{fallback}");
    } else {
        println!("{}", response.message);
    }
    Ok(())
}
