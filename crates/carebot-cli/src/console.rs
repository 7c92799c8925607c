//! Console command loop.
//!
//! Reads one command per line from stdin or a script, runs each as its own
//! task and waits briefly for it. Slow commands keep running in the
//! background and print when they finish. All output goes through one
//! printer task so concurrent commands never interleave mid-line.

use std::io;
use std::time::Duration;

use carebot_engine::{AppContext, Bot};
use carebot_logic::command::{parse_line, Command, HELP_LINES};
use carebot_logic::report::status_line;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle for writing output lines.
#[derive(Debug, Clone)]
pub struct Output {
    tx: mpsc::UnboundedSender<String>,
}

impl Output {
    pub fn line(&self, line: impl Into<String>) {
        // The printer only goes away at exit; late lines are dropped
        let _ = self.tx.send(line.into());
    }
}

/// Start the printer task. It exits once every [`Output`] clone is dropped.
pub fn spawn_printer<W>(mut writer: W) -> (Output, JoinHandle<io::Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    });
    (Output { tx }, handle)
}

pub struct Console {
    ctx: AppContext,
    out: Output,
}

impl Console {
    pub fn new(ctx: AppContext, out: Output) -> Self {
        Self { ctx, out }
    }

    fn poll_timeout(&self) -> Duration {
        self.ctx.config().timing.poll_timeout()
    }

    /// Process commands until `exit` or end of input.
    ///
    /// `exit` shuts the bot down at once, interrupting slow commands.
    /// End of input lets slow commands finish first.
    pub async fn run<R>(&self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        print_help(&self.out);

        let mut lines = input.lines();
        let mut pending: Vec<JoinHandle<()>> = Vec::new();

        while let Some(line) = lines.next_line().await? {
            let Some(command) = parse_line(&line) else {
                continue;
            };
            if command == Command::Exit {
                log::debug!("Exit requested");
                self.ctx.shutdown();
                break;
            }

            let mut task = tokio::spawn(run_command(
                self.ctx.bot().clone(),
                self.out.clone(),
                command,
            ));
            match tokio::time::timeout(self.poll_timeout(), &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.out.line(format!("Error executing command: {}", e)),
                // Took too long; let the operator run other commands
                Err(_) => pending.push(task),
            }
            pending.retain(|task| !task.is_finished());
        }

        for task in pending {
            if let Err(e) = task.await {
                self.out.line(format!("Error executing command: {}", e));
            }
        }
        Ok(())
    }
}

fn print_help(out: &Output) {
    for line in HELP_LINES {
        out.line(line);
    }
}

async fn run_command(bot: Bot, out: Output, command: Command) {
    match command {
        Command::Exit => {}
        Command::Help => print_help(&out),
        Command::Medicate => {
            let result = bot.request_medicate();
            out.line("Attempting to administer medication...");
            match result.await {
                Ok(message) => out.line(message),
                Err(e) => out.line(format!("Error while administering medication: {}", e)),
            }
        }
        Command::Feed => {
            let result = bot.request_feed();
            out.line("Attempting to feed...");
            match result.await {
                Ok(message) => out.line(message),
                Err(e) => out.line(format!("Error while feeding: {}", e)),
            }
        }
        Command::Status => {
            let status = bot.request_status();
            out.line("Retrieving status...");
            match status.await {
                Ok(report) => out.line(status_line(&report)),
                Err(e) => out.line(format!("Error while retrieving status: {}", e)),
            }
        }
        Command::Unknown(word) => out.line(format!("Unknown command: {}", word)),
    }
}
