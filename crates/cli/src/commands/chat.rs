//! `grounded chat` — interactive grounded chat session.
//!
//! Reads lines from stdin; each line is one turn. `/reset` clears the
//! conversation, `exit`/`quit`/Ctrl+D leave. Retrieval failures are shown
//! inline and the turn continues with empty sources; completion failures
//! leave the history untouched so resubmitting the question retries it.

use crate::TurnArgs;
use grounded_rag::TurnOptions;
use std::io::Write as _;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(args: &TurnArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let mut session = super::build_session(&config)?;

    let mode = args
        .mode
        .map(|m| m.to_string())
        .unwrap_or_else(|| config.search.mode.clone());
    let top_k = args.top_k.unwrap_or(config.search.top_k);

    println!();
    println!("  grounded — interactive chat");
    println!();
    println!("  Model:   {}", config.chat.model.as_deref().unwrap_or("-"));
    println!("  Index:   {}", config.search.index.as_deref().unwrap_or("-"));
    println!("  Mode:    {mode} (top {top_k})");
    println!();
    println!("  Type your question and press Enter.");
    println!("  '/reset' clears the conversation, 'exit' or Ctrl+D quits.");
    println!();

    let options = TurnOptions {
        mode: args.mode,
        top_k: args.top_k,
        temperature: args.temperature,
    };

    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    loop {
        let line = match lines.next_line().await? {
            Some(line) => line.trim().to_string(),
            None => break, // EOF (Ctrl+D)
        };

        if line.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        if line == "/reset" {
            session.reset();
            println!("  [Conversation cleared]");
            println!();
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        eprint!("  ...");

        match session.run_turn(&line, options.clone()).await {
            Ok(outcome) => {
                eprint!("\r     \r");

                if let Some(err) = &outcome.search_error {
                    eprintln!("  [Retrieval failed — answering without sources] {err}");
                }

                if args.show_sources && !outcome.context.is_empty() {
                    println!();
                    for source_line in outcome.context.render().lines() {
                        println!("  | {source_line}");
                    }
                }

                println!();
                for answer_line in outcome.answer.lines() {
                    println!("  Assistant > {answer_line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
