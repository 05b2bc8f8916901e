use anyhow::Result;
use clap::Parser;
use sprout_advisor::AdvisorChat;
use sprout_client::{ApiConfig, HttpAdvisorApi};
use sprout_core::advisor::{DeliveryState, TranscriptEntry};
use sprout_core::child::ChildProfile;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "Sprout parent advisor chat", long_about = None)]
struct Cli {
    /// Backend base URL (overrides SPROUT_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
    /// Bearer token for the backend (overrides SPROUT_API_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

const HELP: &str = "\
commands:
  /children       list your children
  /child <n>      switch the conversation to child n
  /sessions       list the selected child's past sessions
  /focus <n>      focus the conversation on session n
  /focus off      return to general discussion
  /history        list saved conversations
  /load <n>       continue saved conversation n
  /new            start a fresh conversation
  /help           show this help
  /quit           exit
anything else is sent to the advisor";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match cli.base_url {
        Some(base_url) => ApiConfig::new(base_url),
        None => ApiConfig::try_from_env()?,
    };
    if let Some(token) = cli.token {
        config = config.with_auth_token(token);
    }

    let api = Arc::new(HttpAdvisorApi::new(config));
    let roster = api.list_children().await?;
    if roster.is_empty() {
        println!("No children found. Create a child profile in the portal first.");
        return Ok(());
    }

    let mut widget = AdvisorChat::new(api);
    widget.open(&roster).await;
    println!("{}", HELP);
    render(&widget);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }
        if !handle_input(&mut widget, &roster, input).await {
            continue;
        }
        render(&widget);
    }

    Ok(())
}

/// Handles one line of input. Returns false when the transcript does not
/// need re-rendering (pure list commands).
async fn handle_input(
    widget: &mut AdvisorChat<HttpAdvisorApi>,
    roster: &[ChildProfile],
    input: &str,
) -> bool {
    match input.split_once(' ').unwrap_or((input, "")) {
        ("/help", _) => {
            println!("{}", HELP);
            false
        }
        ("/children", _) => {
            for (index, child) in roster.iter().enumerate() {
                println!("  {}: {} (age {})", index, child.name, child.age_level);
            }
            false
        }
        ("/child", arg) => match pick(roster, arg) {
            Some(child) => {
                widget.select_child(child.id).await;
                true
            }
            None => {
                println!("usage: /child <n> (see /children)");
                false
            }
        },
        ("/sessions", _) => {
            let sessions = widget.sessions().items();
            if sessions.is_empty() {
                println!("  no sessions yet");
            }
            for (index, session) in sessions.iter().enumerate() {
                println!("  {}: {}", index, session.label());
            }
            false
        }
        ("/focus", "off") => {
            widget.select_focus_session(None).await;
            true
        }
        ("/focus", arg) => {
            let session_id = pick(widget.sessions().items(), arg).map(|s| s.session_id);
            match session_id {
                Some(session_id) => {
                    widget.select_focus_session(Some(session_id)).await;
                    true
                }
                None => {
                    println!("usage: /focus <n> or /focus off (see /sessions)");
                    false
                }
            }
        }
        ("/history", _) => {
            let conversations = widget.conversations().items();
            if conversations.is_empty() {
                println!("  no saved conversations");
            }
            for (index, conversation) in conversations.iter().enumerate() {
                println!(
                    "  {}: {} with {} ({} messages)",
                    index,
                    conversation.created_at.format("%Y-%m-%d %H:%M"),
                    conversation.child_name,
                    conversation.message_count
                );
            }
            false
        }
        ("/load", arg) => {
            let conversation_id = pick(widget.conversations().items(), arg).map(|c| c.id);
            match conversation_id {
                Some(conversation_id) => {
                    widget.select_conversation(conversation_id).await;
                    true
                }
                None => {
                    println!("usage: /load <n> (see /history)");
                    false
                }
            }
        }
        ("/new", _) => {
            widget.start_new_conversation().await;
            true
        }
        _ => {
            widget.send(input).await;
            true
        }
    }
}

fn pick<'a, T>(items: &'a [T], arg: &str) -> Option<&'a T> {
    arg.trim().parse::<usize>().ok().and_then(|n| items.get(n))
}

fn render(widget: &AdvisorChat<HttpAdvisorApi>) {
    println!("----");
    for entry in widget.transcript() {
        match entry {
            TranscriptEntry::Remote(message) if entry.is_from_parent() => {
                println!("you> {}", message.content);
            }
            TranscriptEntry::Remote(message) => {
                println!("advisor> {}", message.content);
            }
            TranscriptEntry::Outbound { content, delivery } => {
                let marker = match delivery {
                    DeliveryState::Pending => " (sending)",
                    DeliveryState::Confirmed => "",
                    DeliveryState::Failed => " (failed)",
                };
                println!("you> {}{}", content, marker);
            }
            TranscriptEntry::Notice { content, .. } => {
                println!("* {}", content);
            }
        }
    }
    if let Some(toast) = widget.active_toast() {
        println!("[{}]", toast.text());
    }
}
