//! `sketchtab last` — show the most recently fetched sketch, no network.

use anyhow::Result;

use super::Context;
use crate::store::keys;
use crate::types::SketchRecord;

pub async fn run(ctx: &Context) -> Result<()> {
    let cached: Option<SketchRecord> = ctx.store.get(keys::LAST_SKETCH).await?;

    let Some(record) = cached else {
        if ctx.json {
            println!("null");
        } else {
            eprintln!("No sketch has been fetched yet. Try 'sketchtab next'.");
        }
        return Ok(());
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{}", record.title);
    println!("  {}", record.page_url);
    if let Some(image) = &record.image_url {
        println!("  image:  {image}");
    }
    Ok(())
}
