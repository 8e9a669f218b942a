//! Interactive question loop over one loaded document.

use anyhow::Result;
use colored::*;
use std::io::{self, BufRead, Write};

use crate::session::{Assistant, Document, Interaction};

/// Print an answer and its follow-up questions.
pub fn print_interaction(interaction: &Interaction) {
    println!("\n{}", "Answer".green().bold());
    println!("{}\n", interaction.answer.trim());

    println!("{}", "Follow-up questions".green().bold());
    match &interaction.followups {
        Ok(questions) => {
            for (i, question) in questions.iter().enumerate() {
                println!("  {}. {}", i + 1, question);
            }
        }
        Err(e) => println!("  {} {}", "Could not generate follow-up questions:".yellow(), e),
    }
    println!();
}

/// Read questions from stdin until EOF or `exit`.
pub async fn run(assistant: &Assistant, document: &Document) -> Result<()> {
    println!(
        "{} Ask questions about the document. Type {} or press Ctrl-D to quit.\n",
        ">".green().bold(),
        "exit".cyan()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", "?".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let question = line?;
        let question = question.trim();

        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit" | ":q") {
            break;
        }

        // A failed question is reported and the loop continues
        match assistant.ask(document, question).await {
            Ok(interaction) => print_interaction(&interaction),
            Err(e) => println!("{} {}\n", "Failed to get answer:".red().bold(), e),
        }
    }

    Ok(())
}
