use anyhow::Result;
use tracing::warn;

use crate::cli::BlogAction;
use crate::commands::render::truncate;
use crate::commands::Context;
use crate::models::blog::NewComment;

pub async fn run(ctx: &Context, action: BlogAction) -> Result<()> {
    match action {
        BlogAction::List { category } => list(ctx, category.as_deref()).await,
        BlogAction::Show { slug } => show(ctx, &slug).await,
        BlogAction::Comment { post_id, text } => comment(ctx, post_id, text).await,
        BlogAction::Categories => categories(ctx).await,
    }
}

async fn list(ctx: &Context, category: Option<&str>) -> Result<()> {
    let posts = ctx.client.list_posts(category).await?;
    if posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }
    for post in posts {
        let author = post.author_name().unwrap_or_else(|| "HireWave".to_string());
        println!("{}{}  by {author}", if post.featured { "★ " } else { "" }, post.title);
        let summary = post.excerpt.as_deref().unwrap_or(&post.content);
        if !summary.is_empty() {
            println!("    {}", truncate(summary, 100));
        }
        println!("    hirewave blog show {}", post.slug);
    }
    Ok(())
}

async fn show(ctx: &Context, slug: &str) -> Result<()> {
    let post = ctx.client.get_post(slug).await?;
    if let Err(e) = ctx.client.increment_post_view(slug).await {
        warn!("Failed to record view for {slug}: {e}");
    }

    println!("{}", post.title);
    let mut meta = Vec::new();
    if let Some(author) = post.author_name() {
        meta.push(author);
    }
    if let Some(category) = post.category_name() {
        meta.push(category);
    }
    if let Some(created) = post.created_at {
        meta.push(created.format("%B %-d, %Y").to_string());
    }
    meta.push(format!("{} views", post.views));
    println!("{}", meta.join(" · "));
    println!();
    println!("{}", post.content);

    let comments = ctx.client.list_comments(post.id).await?;
    let approved: Vec<_> = comments.iter().filter(|c| c.is_approved).collect();
    println!();
    println!("Comments ({})", approved.len());
    for comment in approved {
        let author = comment.author_name().unwrap_or_else(|| "Anonymous".to_string());
        println!("  {author}: {}", comment.content);
    }
    Ok(())
}

async fn comment(ctx: &Context, post_id: i64, text: String) -> Result<()> {
    ctx.require_user()?;
    let created = ctx
        .client
        .create_comment(&NewComment {
            post: post_id,
            content: text,
        })
        .await?;
    if created.is_approved {
        println!("Comment posted.");
    } else {
        println!("Comment submitted and pending approval.");
    }
    Ok(())
}

async fn categories(ctx: &Context) -> Result<()> {
    for category in ctx.client.list_categories().await? {
        println!("{:<24} {}", category.name, category.slug);
    }
    Ok(())
}
