//! `sketchtab status` — show acquisition state.

use anyhow::Result;
use chrono::{Local, TimeZone};

use super::Context;
use crate::policy::RecencyWindow;
use crate::store::keys;
use crate::types::{CachedClassification, FetchFrequency, SketchRecord, Theme};

pub async fn run(ctx: &Context) -> Result<()> {
    let frequency: FetchFrequency = ctx.store.get(keys::FREQUENCY).await?.unwrap_or_default();
    let theme: Theme = ctx.store.get(keys::THEME).await?.unwrap_or_default();
    let last_fetch: Option<i64> = ctx.store.get(keys::LAST_FETCH_TIME).await?;
    let last_sketch: Option<SketchRecord> = ctx.store.get(keys::LAST_SKETCH).await?;
    let recent: RecencyWindow = ctx.store.get(keys::RECENT).await?.unwrap_or_default();
    let classification: Option<CachedClassification> =
        ctx.store.get(keys::CONNECTIVITY_CACHE).await?;

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "frequency": frequency,
                "theme": theme,
                "lastFetchTime": last_fetch,
                "lastSketch": last_sketch.as_ref().map(|s| &s.uid),
                "recentCount": recent.len(),
                "connectivityCache": classification,
            })
        );
        return Ok(());
    }

    println!("frequency:     {frequency}");
    println!("theme:         {theme}");
    println!("last fetch:    {}", format_fetch_time(last_fetch));
    match &last_sketch {
        Some(sketch) => println!("last sketch:   {} ({})", sketch.title, sketch.uid),
        None => println!("last sketch:   none"),
    }
    println!("recent uids:   {}", recent.len());
    match classification {
        Some(cached) => println!("connectivity:  {:?} cached at {}", cached.state, format_fetch_time(Some(cached.at))),
        None => println!("connectivity:  no cached classification"),
    }
    Ok(())
}

fn format_fetch_time(ms: Option<i64>) -> String {
    ms.and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}
