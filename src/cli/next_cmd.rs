//! `sketchtab next` / `sketchtab refresh` — acquire and display a sketch.

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::store::keys;
use crate::types::{AcquireError, ConnectivityState, FailureResolution, SketchRecord};

/// Run the acquisition path. `force` skips the cadence check (manual
/// refresh); both paths share failure classification and rendering.
pub async fn run(ctx: &Context, force: bool) -> Result<()> {
    let outcome = if force {
        ctx.policy.refresh().await
    } else {
        ctx.policy.next_sketch().await
    };

    match outcome {
        Ok(record) => show(ctx, &record).await,
        Err(AcquireError::RefreshInFlight) => bail!("a refresh is already in flight"),
        Err(err) => {
            tracing::debug!(%err, "acquisition failed; classifying");
            match ctx
                .policy
                .classify_failure()
                .await
                .context("classify fetch failure")?
            {
                FailureResolution::Recovered(record) => show(ctx, &record).await,
                FailureResolution::Classified(state) => {
                    render_failure(ctx, state, &err).await?;
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn show(ctx: &Context, record: &SketchRecord) -> Result<()> {
    ctx.policy
        .record_shown(&record.uid)
        .await
        .context("record shown sketch")?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("{}", record.title);
    println!("  {}", record.page_url);
    if let Some(image) = &record.image_url {
        println!("  image:  {image}");
    }
    if let Some(prints) = &record.prints_url {
        println!("  prints: {prints}");
    }
    if !record.description.is_empty() {
        println!();
        println!("  {}", record.description);
    }
    Ok(())
}

async fn render_failure(ctx: &Context, state: ConnectivityState, err: &AcquireError) -> Result<()> {
    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "error": err.to_string(),
                "classification": state,
            })
        );
        return Ok(());
    }

    match state {
        ConnectivityState::Offline => {
            eprintln!("Couldn't fetch a sketch — you appear to be offline.");
            eprintln!("Check your connection, then try 'sketchtab refresh'.");
        }
        ConnectivityState::ServiceIssue => {
            eprintln!("Your connection looks fine, but the sketch service is having trouble.");
            eprintln!("  ({err})");
            let cached: Option<SketchRecord> = ctx.store.get(keys::LAST_SKETCH).await?;
            if cached.is_some() {
                eprintln!("The most recent sketch is still available: 'sketchtab last'.");
            }
        }
    }
    Ok(())
}
