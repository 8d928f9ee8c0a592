//! Console stand-in for the robot: speech is written to a terminal and
//! utterances are typed, one per line. Used for dry runs without hardware.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use dilemma_core::{
    Orchestrator, SessionReport, manipulation::UniformSource, observer::SessionObserver,
    services::{AttentionService, ListenService, VoiceService},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::{Mutex, Notify};
use tracing::info;

pub struct ConsoleVoice<W> {
    out: Mutex<W>,
}

impl<W> ConsoleVoice<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl ConsoleVoice<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> VoiceService for ConsoleVoice<W> {
    async fn set_voice(&self) -> Result<()> {
        Ok(())
    }

    async fn speak(&self, text: &str, _first_turn: bool) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(format!("robot> {text}\n").as_bytes())
            .await
            .context("Failed to write speech to console")?;
        out.flush().await?;
        Ok(())
    }
}

/// Attention is meaningless on a terminal.
pub struct ConsoleAttention;

#[async_trait]
impl AttentionService for ConsoleAttention {
    async fn attend_nearest(&self) -> Result<()> {
        Ok(())
    }
}

pub struct ConsoleListen<R> {
    lines: Mutex<Lines<R>>,
    closed: Notify,
}

impl<R: AsyncBufRead + Unpin> ConsoleListen<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: Mutex::new(input.lines()),
            closed: Notify::new(),
        }
    }
}

impl<R> ConsoleListen<R> {
    /// Resolves once a read has hit end of input.
    pub async fn closed(&self) {
        self.closed.notified().await
    }
}

impl ConsoleListen<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ListenService for ConsoleListen<R> {
    async fn listen(&self) -> Result<String> {
        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .context("Failed to read from console")?;
        match line.map(|l| l.trim().to_string()) {
            Some(utterance) if !utterance.is_empty() => Ok(utterance),
            Some(_) => bail!("No speech captured"),
            None => {
                self.closed.notify_one();
                bail!("Console input closed")
            }
        }
    }
}

/// Runs a session that listens through `listen`, ending it early once the
/// console input is exhausted. Returns `None` when the input closed first.
///
/// A closed console keeps failing every listen, which the session would
/// otherwise answer by re-prompting forever.
pub async fn run_until_closed<S, O, R>(
    orchestrator: Orchestrator<S, O>,
    listen: &ConsoleListen<R>,
) -> Result<Option<SessionReport>>
where
    S: UniformSource,
    O: SessionObserver,
{
    tokio::select! {
        biased;
        _ = listen.closed() => {
            info!("Console input closed. Ending session.");
            Ok(None)
        }
        report = orchestrator.run() => Ok(Some(report?)),
    }
}
