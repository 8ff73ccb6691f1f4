//! Direct message commands - gift-wrap and unwrap messages offline.

use haven::event::Event;
use haven::clock::format_rfc3339;
use haven::messaging::{self, GiftWrap, TimestampFuzz};
use haven::{Clock, Config, Identity, PublicKey, SystemClock};
use tokio::io::AsyncReadExt;

use crate::cli::{Format, UnwrapArgs, WrapArgs};
use crate::output::print_record;

/// Run the wrap command, printing the kind-1059 event JSON
pub async fn wrap(args: &WrapArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let sender = Identity::from_text(&args.key)?;
    let recipient = PublicKey::from_text(&args.to)?;
    let fuzz = TimestampFuzz::from_config(SystemClock.now_secs(), &config.messaging);
    let message = args.message.clone();

    let gift = tokio::task::spawn_blocking(move || {
        messaging::wrap(&message, &recipient, &sender, &fuzz)
    })
    .await??;
    println!("{}", gift.event().to_json()?);
    Ok(())
}

/// Run the unwrap command
pub async fn unwrap(args: &UnwrapArgs, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let recipient = Identity::from_text(&args.key)?;
    let json = if args.input.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        text
    } else {
        tokio::fs::read_to_string(&args.input).await?
    };
    let gift = GiftWrap::from_event(Event::from_json(json.trim())?)?;
    let message = messaging::unwrap(&gift, &recipient)?;

    print_record(
        format,
        &[
            ("from", message.sender.to_npub()),
            ("to", message.recipient.to_npub()),
            ("created_at", format_rfc3339(message.created_at.saturating_mul(1000))),
            ("body", message.body),
        ],
    )
}
