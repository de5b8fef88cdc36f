//! Interactive stdin REPL front-end.

use std::sync::Arc;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::agent::agent_loop::Agent;
use crate::agent::context::{ConversationHistory, Role, MAX_CONTEXT_CHARS};

/// Run the REPL until EOF or an exit command.
///
/// A trimmed conversation history carries recent turns into each new
/// message so short follow-ups ("and then?") keep their context.
pub async fn run(agent: Arc<Agent>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut history = ConversationHistory::new();

    println!("BareClaw REPL — type 'exit' or Ctrl-D to quit.");
    loop {
        match editor.readline("bareclaw> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);

                let message = if history.is_empty() {
                    line.to_string()
                } else {
                    format!(
                        "[Recent conversation]\n{}\n\n[Current message]\n{}",
                        history.render(),
                        line
                    )
                };

                match agent.run_once(&message).await {
                    Ok(reply) => {
                        println!("{}", reply);
                        history.push(Role::User, line);
                        history.push(Role::Assistant, reply);
                        history.trim(MAX_CONTEXT_CHARS);
                    }
                    Err(e) => eprintln!("agent error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("readline interrupted");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    println!("bye.");
    Ok(())
}
