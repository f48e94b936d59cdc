//! Interactive session
//!
//! Each line is split with shell quoting rules and parsed with the same
//! command tree as the one-shot CLI. Errors are printed and the session
//! continues; `menu`/`esc` returns to the main menu and `exit` ends the
//! session.

use anyhow::{bail, Context as _, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use mastercalc_calc::{CalculatorId, Screen};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use crate::context::{AppContext, APP_NAME};
use crate::Commands;

/// One shell line: a command without the binary name or global flags
#[derive(Debug, Parser)]
#[command(name = "mastercalc", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

const SHELL_WORDS: [&str; 4] = ["help", "exit", "quit", "q"];

// ============================================================================
// Tab Completion Helper
// ============================================================================

/// Completes command names, calculator ids and screen ids
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        let mut commands: Vec<String> = ShellLine::command()
            .get_subcommands()
            .flat_map(|cmd| {
                std::iter::once(cmd.get_name().to_string())
                    .chain(cmd.get_all_aliases().map(str::to_string))
            })
            .chain(SHELL_WORDS.iter().map(|w| (*w).to_string()))
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    /// Candidates for the word being typed after `words`
    fn candidates(&self, words: &[&str]) -> Vec<String> {
        match words {
            [] => self.commands.clone(),
            ["favorites", "add" | "toggle"] => CalculatorId::ALL
                .iter()
                .map(|c| c.id().to_string())
                .collect(),
            ["open"] => Screen::ALL.iter().map(|s| s.id().to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        let mut words: Vec<&str> = line.split_whitespace().collect();
        let prefix = if line.ends_with(char::is_whitespace) {
            ""
        } else {
            words.pop().unwrap_or("")
        };
        let start = pos - prefix.len();

        let matches = self
            .candidates(&words)
            .into_iter()
            .filter(|candidate| candidate.starts_with(prefix))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, matches))
    }
}

// ============================================================================
// REPL
// ============================================================================

pub async fn run(ctx: &mut AppContext) -> Result<()> {
    let config = rustyline::Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();
    let mut rl: Editor<ShellHelper, DefaultHistory> =
        Editor::with_config(config).context("Failed to initialize readline")?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("{}", APP_NAME.bright_cyan().bold());
    println!(
        "Type '{}' for commands, {} for completion, '{}' to leave\n",
        "help".bright_yellow(),
        "Tab".bright_cyan(),
        "exit".bright_yellow()
    );

    loop {
        let prompt = format!("mastercalc:{}> ", ctx.state.current().id());
        let line = tokio::task::block_in_place(|| rl.readline(&prompt));
        match line {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add to history (ignore errors)
                let _ = rl.add_history_entry(line);

                match execute_line(ctx, line).await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => {
                        ctx.output.error(&e);
                    },
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C behaves like Escape
                println!("^C");
                ctx.state.escape();
                continue;
            },
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "Readline error:".red(), e);
                break;
            },
        }
    }

    println!("Bye!");
    Ok(())
}

/// Execute one line; `Ok(false)` ends the session
async fn execute_line(ctx: &mut AppContext, line: &str) -> Result<bool> {
    match line {
        "exit" | "quit" | "q" => return Ok(false),
        "help" | "?" => {
            ShellLine::command().print_help()?;
            println!();
            return Ok(true);
        },
        _ => {},
    }

    let Some(words) = shlex::split(line) else {
        bail!("Незакрытая кавычка в строке: {}", line);
    };

    let parsed = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(e) => {
            // clap renders usage and --help itself
            e.print()?;
            return Ok(true);
        },
    };

    match parsed.command {
        Commands::Shell => ctx.output.warn("Интерактивный режим уже запущен"),
        command => crate::dispatch(ctx, command).await?,
    }
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::output::Output;
    use common::{AppConfig, StorageBackend};

    async fn context() -> AppContext {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        AppContext::open(config, Output::new(true)).await.unwrap()
    }

    #[test]
    fn test_shell_line_parses_without_binary_name() {
        let parsed = ShellLine::try_parse_from("power -u 220 -i 5".split_whitespace()).unwrap();
        assert!(matches!(parsed.command, Commands::Calc(_)));
    }

    #[test]
    fn test_completion_candidates() {
        let helper = ShellHelper::new();
        assert!(helper.commands.iter().any(|c| c == "voltage-drop"));
        assert!(helper.commands.iter().any(|c| c == "esc"));
        assert!(helper.commands.iter().any(|c| c == "exit"));

        let calculators = helper.candidates(&["favorites", "toggle"]);
        assert_eq!(calculators.len(), CalculatorId::ALL.len());
        assert!(helper.candidates(&["open"]).contains(&"kip".to_string()));
        assert!(helper.candidates(&["stats"]).is_empty());
    }

    #[tokio::test]
    async fn test_execute_line_keeps_session_alive() {
        let mut ctx = context().await;

        assert!(execute_line(&mut ctx, "divider --vin 12 --r1 10000 --r2 10000")
            .await
            .unwrap());
        assert_eq!(ctx.state.current(), Screen::Elec);
        assert_eq!(ctx.store.history().await.unwrap().len(), 1);

        // Parse errors are printed, not returned
        assert!(execute_line(&mut ctx, "teleport now").await.unwrap());
        // Calculation errors propagate to the loop, which prints them
        assert!(execute_line(&mut ctx, "power -u abc -i 1").await.is_err());

        assert!(execute_line(&mut ctx, "esc").await.unwrap());
        assert_eq!(ctx.state.current(), Screen::Menu);

        assert!(execute_line(&mut ctx, "shell").await.unwrap());
        assert!(!execute_line(&mut ctx, "exit").await.unwrap());
    }

    #[tokio::test]
    async fn test_quoted_arguments_keep_spaces() {
        let mut ctx = context().await;

        assert!(execute_line(
            &mut ctx,
            "templates save \"Щит 1\" --data '3×16 А' --description \"Ввод от ТП\"",
        )
        .await
        .unwrap());
        let templates = ctx.store.templates().await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Щит 1");
        assert_eq!(templates[0].data, "3×16 А");
        assert_eq!(templates[0].description, "Ввод от ТП");

        assert!(execute_line(&mut ctx, "draft save \"замер  щита\"")
            .await
            .unwrap());
        assert_eq!(ctx.store.draft().await.unwrap(), "замер  щита");
    }

    #[tokio::test]
    async fn test_unbalanced_quote_is_reported() {
        let mut ctx = context().await;

        let err = execute_line(&mut ctx, "templates save \"Щит 1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Незакрытая кавычка"));
        assert!(ctx.store.templates().await.unwrap().is_empty());
        assert!(!execute_line(&mut ctx, "exit").await.unwrap());
    }
}
