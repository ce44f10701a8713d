//! `grounded ask` — one question, one grounded answer.

use crate::TurnArgs;
use grounded_rag::TurnOptions;

pub async fn run(question: &str, args: &TurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let mut session = super::build_session(&config)?;

    let options = TurnOptions {
        mode: args.mode,
        top_k: args.top_k,
        temperature: args.temperature,
    };

    eprint!("  Thinking...");
    let outcome = session.run_turn(question, options).await;
    eprint!("\r              \r");

    let outcome = outcome?;

    if let Some(err) = &outcome.search_error {
        eprintln!("  [Retrieval failed — answering without sources] {err}");
    }

    if args.show_sources && !outcome.context.is_empty() {
        println!("--- Sources ---");
        println!("{}", outcome.context.render());
        println!("--- Answer ---");
    }

    println!("{}", outcome.answer);
    Ok(())
}
