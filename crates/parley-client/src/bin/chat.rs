use anyhow::Result;
use parley_client::{BudgetLevel, ChatSession, ConnectionStatus, EntryKind, HttpTransport, InputBudget};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let base_url = std::env::var("PARLEY_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let transport = HttpTransport::new(&base_url)?;
    let mut session = ChatSession::new();

    match session.refresh_status(&transport).await {
        ConnectionStatus::Online => println!("● Online ({})", base_url),
        _ => println!("○ Offline ({}): messages will probably fail", base_url),
    }
    println!("Type a message and press Enter. /quit to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input == "/quit" {
            break;
        }
        if !session.can_send(input) {
            continue;
        }

        let budget = InputBudget::measure(input);
        if budget.level != BudgetLevel::Normal {
            println!("({} characters)", budget);
        }

        println!("…");
        let entry = session.send(&transport, input).await?;
        match entry.kind {
            EntryKind::Error => {
                println!("Error: {}\nPlease try again or check your connection.\n", entry.text)
            }
            _ => println!("[{}] {}\n", entry.time_label(), entry.text),
        }
    }

    Ok(())
}
