use colored::*;
use player_registry::{BoardFilter, BoardSummary};
use ranking_store::{StoreError, SyncStatus};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::app::AppState;
use crate::commands::{Command, HELP};
use crate::error::AppError;
use crate::render;

/// What the loop should do after a command
#[derive(Debug)]
pub enum Reply {
    Text(String),

    /// A list edit; the text is the updated list
    Saved { text: String, status: SyncStatus },

    /// Start automatic refreshing for this many cycles
    Auto(u32),

    Quit,
}

/// Interactive session: reads commands, prints everything the user sees
pub struct Session {
    app: AppState,
}

impl Session {
    pub fn new(app: AppState) -> Self {
        Self { app }
    }

    /// Read commands until `quit` or end of input
    pub async fn run(&mut self, startup_warnings: Vec<StoreError>) -> Result<(), AppError> {
        self.show_welcome();
        for warning in startup_warnings {
            print_warning(&warning);
        }
        self.refresh_and_show().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.show_prompt();
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    debug!("stdin closed: {}", e);
                    break;
                }
            };

            match self.handle_line(&line).await {
                Ok(None) => {}
                Ok(Some(Reply::Text(text))) => println!("{}", text),
                Ok(Some(Reply::Saved { text, status })) => {
                    println!("{}", text);
                    if let Some(err) = status.into_warning() {
                        print_warning(&err);
                    }
                }
                Ok(Some(Reply::Auto(cycles))) => self.auto_refresh(Some(cycles)).await,
                Ok(Some(Reply::Quit)) => break,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => println!("❌ {}", e),
            }
        }

        println!("👋 Good luck in the draft!");
        Ok(())
    }

    /// Refresh on a timer until interrupted; used by `--watch`
    pub async fn watch(&mut self, startup_warnings: Vec<StoreError>) {
        for warning in startup_warnings {
            print_warning(&warning);
        }
        self.refresh_and_show().await;
        self.auto_refresh(None).await;
    }

    /// Parse and handle one input line; blank lines produce no reply
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<Reply>, AppError> {
        let Some(command) = Command::parse(line)? else {
            return Ok(None);
        };
        self.respond(command).await.map(Some)
    }

    /// Handle one parsed command
    pub async fn respond(&mut self, command: Command) -> Result<Reply, AppError> {
        let reply = match command {
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Users => {
                Reply::Text(render::users(&self.app.config().users, self.app.active_user()))
            }
            Command::User(key) => {
                self.app.switch_user(&key)?;
                Reply::Text(format!("👤 Now ranking as {}", self.app.active_label().cyan().bold()))
            }
            Command::Refresh => {
                let report = self.app.refresh().await?;
                let text = render::refresh_report(report);
                Reply::Text(format!("{}\n{}", text, self.board_text(&BoardFilter::default())))
            }
            Command::Status => Reply::Text(render::status(
                self.app.active_label(),
                &self.app.storage_name(),
                &self.app.config().sleeper.draft_id,
                self.app.last_refresh(),
            )),
            Command::Mine => Reply::Text(self.my_list_text()),
            Command::Edit(edit) => {
                let mut rng = rand::thread_rng();
                let status = self.app.edit_rankings(edit, &mut rng).await?;
                Reply::Saved { text: self.my_list_text(), status }
            }
            Command::Consensus => {
                let rows = self.app.consensus();
                Reply::Text(render::consensus(&rows, &self.app.config().users))
            }
            Command::Auto(cycles) => {
                Reply::Auto(cycles.unwrap_or(self.app.config().auto_refresh_cycles))
            }
            Command::Quit => Reply::Quit,
            command @ (Command::Board { .. } | Command::Search(_)) => {
                let filter = command.board_filter().unwrap_or_default();
                Reply::Text(self.board_text(&filter))
            }
        };

        Ok(reply)
    }

    fn board_text(&self, filter: &BoardFilter) -> String {
        let rows = self.app.board(filter);
        let summary = BoardSummary::from_rows(rows.iter().copied());
        format!("{}\n{}", render::summary(&summary), render::board(&rows))
    }

    fn my_list_text(&mut self) -> String {
        let label = self.app.active_label().to_string();
        render::my_rankings(&label, &self.app.my_rankings())
    }

    async fn refresh_and_show(&mut self) {
        match self.app.refresh().await {
            Ok(report) => println!("{}", render::refresh_report(report)),
            Err(e) => println!("❌ {}", e),
        }
        println!("{}", self.board_text(&BoardFilter::default()));
    }

    /// Refresh every `auto_refresh_secs`; `None` runs until Ctrl-C
    async fn auto_refresh(&mut self, cycles: Option<u32>) {
        let pause = Duration::from_secs(self.app.config().auto_refresh_secs);
        match cycles {
            Some(n) => println!(
                "⏱️  Auto-refresh every {}s for {} cycles (Ctrl-C stops)",
                pause.as_secs(),
                n
            ),
            None => println!("⏱️  Watching the draft every {}s (Ctrl-C stops)", pause.as_secs()),
        }

        self.refresh_cycles(cycles, pause).await;
    }

    /// Sleep then refresh, `cycles` times or until Ctrl-C; returns refreshes run
    async fn refresh_cycles(&mut self, cycles: Option<u32>, pause: Duration) -> u32 {
        let mut done = 0u32;
        while cycles.map_or(true, |n| done < n) {
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Auto-refresh interrupted after {} cycles", done);
                    println!("{}", "⏹️  Auto-refresh stopped".yellow());
                    return done;
                }
            }

            done += 1;
            self.refresh_and_show().await;
        }
        info!("Auto-refresh finished {} cycles", done);
        done
    }

    fn show_welcome(&self) {
        println!();
        println!("{}", "╔══════════════════════════════════════════════════════════════╗".cyan());
        println!("{}", "║                   🏈 DYNASTY DRAFT ASSISTANT                 ║".cyan());
        println!("{}", "╚══════════════════════════════════════════════════════════════╝".cyan());
        println!(
            "{} players on the board | ranking as {} | type 'help' for commands",
            self.app.registry().len(),
            self.app.active_label().cyan().bold()
        );
        println!();
    }

    fn show_prompt(&self) {
        print!("{}> ", self.app.active_label().cyan().bold());
        let _ = std::io::stdout().flush();
    }
}

fn print_warning(err: &StoreError) {
    println!("{} {}", "⚠️  Rankings storage:".yellow().bold(), err);
}
