//! Comment commands: `dealboard comments` and `dealboard comment add|delete`.

use anyhow::{Context, Result, bail};

use dealboard::board::{AssumeYes, CommentThread, Confirm, DeleteOutcome, PostOutcome};
use dealboard::config::DealboardConfig;
use dealboard::models::Comment;

use super::Session;

/// Terminal confirmation prompt. Defaults to "no".
pub struct DialoguerConfirm;

impl Confirm for DialoguerConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

async fn load_thread(session: &Session, config: &DealboardConfig, deal_id: i64) -> Result<CommentThread> {
    CommentThread::load(
        deal_id,
        config.commenter(),
        session.service.clone(),
        session.notices.clone(),
    )
    .await
    .with_context(|| format!("Failed to load comments for deal {}", deal_id))
}

fn print_comment(comment: &Comment) {
    let author = match &comment.commenter_role {
        Some(role) => format!("{} ({})", comment.commenter_name, role),
        None => comment.commenter_name.clone(),
    };
    println!(
        "{} {} {}",
        console::style(format!("#{}", comment.id)).dim(),
        console::style(author).bold(),
        console::style(&comment.created_at).dim()
    );
    println!("    {}", comment.comment_text);
}

pub async fn cmd_comments(config: &DealboardConfig, deal_id: i64) -> Result<()> {
    let session = Session::connect(config)?;
    let thread = load_thread(&session, config, deal_id).await?;

    if thread.comments().is_empty() {
        println!("No comments on deal {}", deal_id);
        return Ok(());
    }
    for comment in thread.comments() {
        print_comment(comment);
    }
    Ok(())
}

pub async fn cmd_comment_add(config: &DealboardConfig, deal_id: i64, text: &str) -> Result<()> {
    let mut session = Session::connect(config)?;
    let mut thread = load_thread(&session, config, deal_id).await?;

    let outcome = thread.post_comment(text).await;
    session.flush_notices();
    match outcome {
        PostOutcome::Posted(comment) => {
            print_comment(&comment);
            Ok(())
        }
        PostOutcome::Ignored => bail!("Comment text is empty"),
        PostOutcome::Failed(_) => bail!("Comment was not saved"),
    }
}

pub async fn cmd_comment_delete(config: &DealboardConfig, deal_id: i64, comment_id: i64) -> Result<()> {
    let mut session = Session::connect(config)?;
    let mut thread = load_thread(&session, config, deal_id).await?;

    let confirm: &dyn Confirm = if config.yes { &AssumeYes } else { &DialoguerConfirm };
    let outcome = thread.delete_comment(comment_id, confirm).await;
    session.flush_notices();
    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::Declined => {
            println!("Delete cancelled");
            Ok(())
        }
        DeleteOutcome::NotFound => bail!("Deal {} has no comment {}", deal_id, comment_id),
        DeleteOutcome::Failed(_) => bail!("Comment was not deleted"),
    }
}
