//! Interactive REPL.

use crate::commands;
use crate::Commands;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use rjam_client::{Client, Config};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

/// One REPL line, parsed with the same subcommands as the command line.
#[derive(Parser, Debug)]
#[command(name = "rjam", no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Commands,
}

pub async fn run(
    client: Client,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "rjam CLI".bold().cyan());
    println!(
        "Connecting to {}:{}...",
        config.server.host, config.server.port
    );

    client.connect().await?;
    println!("{}", "Connected!".green());

    let rl_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".rjam_history"))
        .unwrap_or_else(|_| ".rjam_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", "rjam>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&client, line, json).await {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }

                if !client.is_connected() {
                    println!("{}", "Server closed the connection.".red());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);

    let _ = client.close().await;
    println!("{}", "Disconnected.".dimmed());

    Ok(())
}

/// What a REPL line asks for.
#[derive(Debug)]
enum Action {
    Help,
    Quit,
    Run(Commands),
    /// Usage or parse error text to show the user.
    Message(String),
}

fn parse_line(line: &str) -> Action {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.first().map(|w| w.to_lowercase()).as_deref() {
        None => Action::Message(String::new()),
        Some("help") | Some("?") => Action::Help,
        Some("quit") | Some("exit") | Some("q") => Action::Quit,
        Some("repl") => Action::Message("Already in the REPL".yellow().to_string()),
        Some(_) => match ReplLine::try_parse_from(words) {
            Ok(parsed) => Action::Run(parsed.command),
            Err(e) => Action::Message(e.to_string()),
        },
    }
}

async fn execute_repl_command(
    client: &Client,
    line: &str,
    json: bool,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match parse_line(line) {
        Action::Help => Ok(Some(ReplLine::command().render_help().to_string())),
        Action::Quit => Ok(None),
        Action::Message(text) => Ok(Some(text)),
        Action::Run(cmd) => commands::execute(client, cmd, json).await.map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtins() {
        assert!(matches!(parse_line("help"), Action::Help));
        assert!(matches!(parse_line("EXIT"), Action::Quit));
        assert!(matches!(parse_line("repl"), Action::Message(_)));
    }

    #[test]
    fn test_parse_subcommands() {
        match parse_line("get-block 1 -2 3 --data") {
            Action::Run(Commands::GetBlock { pos, data, nbt }) => {
                assert_eq!(pos.y, -2.0);
                assert!(data);
                assert!(!nbt);
            }
            other => panic!("unexpected action: {:?}", other),
        }

        match parse_line("chat hello there world") {
            Action::Run(Commands::Chat { message }) => {
                assert_eq!(message.join(" "), "hello there world");
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_message() {
        assert!(matches!(parse_line("teleport 1 2"), Action::Message(_)));
        assert!(matches!(parse_line("fly away"), Action::Message(_)));
    }
}
