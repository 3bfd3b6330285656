//! `sketchtab config` — show or change persisted settings.

use anyhow::Result;
use clap::Subcommand;

use super::Context;
use crate::store::keys;
use crate::types::{FetchFrequency, Theme};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print all settings
    Show,
    /// Set how often a new sketch is fetched
    Frequency {
        #[arg(value_enum)]
        value: FetchFrequency,
    },
    /// Set the presentation theme
    Theme {
        #[arg(value_enum)]
        value: Theme,
    },
    /// Force offline classification without probing (testing aid)
    TestOffline {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

pub async fn run(ctx: &Context, action: Option<ConfigAction>) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(ctx).await,
        ConfigAction::Frequency { value } => {
            ctx.store.set(keys::FREQUENCY, &value).await?;
            println!("frequency = {value}");
            Ok(())
        }
        ConfigAction::Theme { value } => {
            ctx.store.set(keys::THEME, &value).await?;
            println!("theme = {value}");
            Ok(())
        }
        ConfigAction::TestOffline { value } => {
            if value {
                ctx.store.set(keys::TEST_OFFLINE_MODE, &true).await?;
            } else {
                ctx.store.remove(keys::TEST_OFFLINE_MODE).await?;
            }
            println!("test-offline = {value}");
            Ok(())
        }
    }
}

async fn show(ctx: &Context) -> Result<()> {
    let frequency: FetchFrequency = ctx.store.get(keys::FREQUENCY).await?.unwrap_or_default();
    let theme: Theme = ctx.store.get(keys::THEME).await?.unwrap_or_default();
    let test_offline: bool = ctx.store.get(keys::TEST_OFFLINE_MODE).await?.unwrap_or(false);

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "frequency": frequency,
                "theme": theme,
                "testOfflineMode": test_offline,
            })
        );
        return Ok(());
    }

    println!("frequency    = {frequency}");
    println!("theme        = {theme}");
    println!("test-offline = {test_offline}");
    Ok(())
}
