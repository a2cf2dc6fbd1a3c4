//! `pitcrew agent`: interactive or single-message chat mode.
//!
//! The conversation lives only for this process; nothing is persisted.

use pitcrew_core::message::Message;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let agent = super::build_agent(&config);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = agent.handle(&[Message::user(msg)]).await?;
        eprint!("\r              \r");
        println!("{}", reply.response);
        return Ok(());
    }

    println!();
    println!("  Pitcrew Support Assistant - Interactive Mode");
    println!();
    println!("  Model:     {}", agent.dispatcher().model());
    println!("  Knowledge: {}", config.knowledge.root.display());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut conversation: Vec<Message> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }
        if !line.is_empty() {
            conversation.push(Message::user(line));
            eprint!("  ...");

            match agent.handle(&conversation).await {
                Ok(reply) => {
                    eprint!("\r     \r");
                    println!();
                    for text in reply.response.lines() {
                        println!("  Assistant > {text}");
                    }
                    println!();
                    conversation.push(Message::assistant(reply.response));
                }
                Err(e) => {
                    eprint!("\r     \r");
                    eprintln!("  [Error] {e}");
                    conversation.pop();
                }
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye! 🏁");
    println!();

    Ok(())
}
