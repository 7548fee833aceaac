use anyhow::{Context, Result};
use crate::catalog::{CannedPayload, ContentCatalog};
use crate::config::Config;
use crate::dispatcher::{ResponseDispatcher, Submission};
use crate::error::SpendcastError;
use crate::message::{MediaRef, Message};
use tracing::info;

pub async fn run_chat(config: &Config) -> Result<()> {
    let dispatcher = ResponseDispatcher::from_config(config)
        .context("Failed to prepare the response dispatcher")?;

    crate::ui::run(dispatcher, config.ui.clone())
        .await
        .context("Chat view failed")?;

    println!("👋 Bis bald!");
    Ok(())
}

/// Submit one message, wait out the delay and print the reply
pub async fn ask(config: &Config, text: &str, json: bool) -> Result<()> {
    let mut dispatcher = ResponseDispatcher::from_config(config)
        .context("Failed to prepare the response dispatcher")?;

    match dispatcher.submit(text) {
        Submission::Accepted { delay, .. } => {
            info!(delay_ms = delay.as_millis() as u64, "waiting for reply");
        }
        Submission::Ignored(reason) => {
            anyhow::bail!("Message was not sent: {:?}", reason);
        }
    }

    let reply = dispatcher
        .next_reply()
        .await
        .context("Dispatcher stopped before replying")?;

    if json {
        let output = serde_json::to_string_pretty(&reply).context("Failed to serialize reply")?;
        println!("{}", output);
    } else {
        println!("{}", format_reply(&reply));
    }

    Ok(())
}

pub async fn show_catalog(config: &Config) -> Result<()> {
    let catalog = ContentCatalog::for_profile(config.profile);
    println!("{}", format_catalog(catalog));
    Ok(())
}

/// Friendly hint for errors raised by SpendCast itself, including config loading
pub fn user_message(err: &anyhow::Error) -> Option<String> {
    err.downcast_ref::<SpendcastError>()
        .map(SpendcastError::user_message)
}

/// Plain-text rendering of an assistant reply
pub fn format_reply(message: &Message) -> String {
    let mut output = format!(
        "{} {}: {}",
        message.origin.icon(),
        message.origin.display_name(),
        message.text
    );

    match &message.media {
        Some(MediaRef::Video { url, title }) => {
            output.push_str(&format!("\n   ▶ {}\n   📍 {}", title, url));
        }
        Some(MediaRef::Podcast {
            url,
            title,
            duration,
        }) => {
            output.push_str(&format!("\n   🎧 {} ({})\n   📍 {}", title, duration, url));
        }
        None => {}
    }

    output
}

pub fn format_catalog(catalog: &ContentCatalog) -> String {
    let mut lines = vec![
        format!("📚 Katalog: {} ({})", catalog.profile, catalog.profile.description()),
        "=".repeat(50),
        format!("👋 {}", catalog.greeting),
        String::new(),
        format!("💬 Textantworten ({}):", catalog.text_replies.len()),
    ];

    for (index, reply) in catalog.text_replies.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, reply));
    }

    for payload in [&catalog.video, &catalog.podcast].into_iter().flatten() {
        lines.push(String::new());
        lines.push(format_payload(payload));
    }

    lines.join("\n")
}

fn format_payload(payload: &CannedPayload) -> String {
    let media = payload.media_ref();
    let mut line = format!("{} {}", media.content_type().display_name(), media.title());
    if let Some(duration) = media.duration() {
        line.push_str(&format!(" ({})", duration));
    }
    format!("{}\n   📍 {}\n   {}", line, media.url(), payload.text)
}
