//! Interactive REPL over a single execution session.
//!
//! A thin terminal driver for the core: each submitted fragment goes through
//! fragment preparation, then into [`Interpreter::run`]. Multi-line
//! fragments are terminated by a blank line. Session commands start with a
//! colon (`:history`, `:reset`, `:quit`).

use crate::core::{fragment, Config, Error};
use crate::runtime::{Interpreter, OnshapeWorkspace, PythonSandbox};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Drive a Polybrain execution session from the terminal
#[derive(Parser, Debug)]
#[command(name = "polybrain", author, version, about, long_about = None)]
pub struct Cli {
    /// Onshape document to attach the session to
    #[arg(env = "POLYBRAIN_DOCUMENT_ID")]
    pub document_id: String,

    /// Python interpreter used to replay the session
    #[arg(long, env = "POLYBRAIN_PYTHON", default_value = "python3")]
    pub python: String,

    /// Hard deadline for a single replay, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print each outcome as JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Suppress live interpreter output; print only captured results
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run the REPL until EOF or `:quit`
    pub async fn execute(self) -> anyhow::Result<()> {
        let mut builder = Config::builder()
            .python_bin(self.python.clone())
            .echo_output(!self.quiet && !self.json);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout_secs(secs);
        }
        let config = builder.build()?;

        let sandbox = Arc::new(PythonSandbox::new(config)?);
        let workspace = Arc::new(OnshapeWorkspace::connect(
            self.document_id.clone(),
            sandbox.clone(),
        )?);
        let mut session = Interpreter::new(workspace, sandbox);

        println!(
            "polybrain {} attached to document {}",
            crate::VERSION,
            self.document_id.bold()
        );
        println!("blank line submits; :history :reset :quit\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b">>> ").await?;
            stdout.flush().await?;

            let Some(first) = lines.next_line().await? else {
                break;
            };
            let first = first.trim_end().to_string();

            match first.trim() {
                "" => continue,
                ":quit" | ":exit" => break,
                ":history" => {
                    println!("{}", session.history());
                    continue;
                }
                ":reset" => {
                    session.reset().await?;
                    println!("{}", "session reset".yellow());
                    continue;
                }
                _ => {}
            }

            // Gather continuation lines until a blank one
            let mut raw = first;
            loop {
                stdout.write_all(b"... ").await?;
                stdout.flush().await?;
                match lines.next_line().await? {
                    Some(line) if !line.trim().is_empty() => {
                        raw.push('\n');
                        raw.push_str(line.trim_end());
                    }
                    _ => break,
                }
            }

            let fragment = match fragment::prepare_fragment(&raw) {
                Ok(fragment) => fragment,
                Err(err) => {
                    eprintln!("{}", err.to_string().red());
                    continue;
                }
            };

            match session.run(&fragment).await {
                Ok(outcome) => {
                    if self.json {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        if self.quiet && !outcome.stdout.is_empty() {
                            print!("{}", outcome.stdout);
                        }
                        match &outcome.error {
                            Some(trace) => {
                                eprintln!("{}", trace.red());
                                println!("{}", "fragment discarded".red().bold());
                            }
                            None => println!("{}", "ok".green()),
                        }
                    }
                }
                Err(Error::PoisonedSession) => {
                    eprintln!(
                        "{}",
                        "session is poisoned; run :reset to recover".red().bold()
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}
