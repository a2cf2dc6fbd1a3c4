//! `pitcrew inspect`: dry-run the pipeline up to the model call.

use pitcrew_core::message::Message;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let agent = super::build_agent(&config);

    let turn = agent.prepare(&[Message::user(message)]).await?;

    println!("🔎 Pitcrew Inspect");
    println!("==================");
    println!("  Intents:  {}", turn.intents.names().join(", "));
    match &turn.order {
        Some(order) => println!("  Order:    {} ({})", order.order_id, order.status),
        None => println!("  Order:    none"),
    }

    let rendered = turn.context.render();
    if turn.context.is_empty() {
        println!("  Sections: none");
    } else {
        println!("  Sections:");
        for title in turn.context.titles() {
            println!("    - {title}");
        }
    }
    println!("  Context:  {} chars", rendered.chars().count());

    if !rendered.is_empty() {
        println!("\n{rendered}");
    }

    Ok(())
}
