//! UCI engine wrapper (async I/O over the engine's stdin/stdout)

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::AnalyzerError;
use crate::score::Score;

/// How long a stopped search gets to report its `bestmove`
const STOP_GRACE: Duration = Duration::from_secs(1);

/// How long `quit` waits for the process before killing it
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// How long the engine may think about one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Depth(u32),
    MoveTime(u64),
}

impl SearchLimit {
    fn go_command(self) -> String {
        match self {
            SearchLimit::Depth(depth) => format!("go depth {depth}"),
            SearchLimit::MoveTime(ms) => format!("go movetime {ms}"),
        }
    }
}

/// Options applied once, right after the UCI handshake
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
    /// Upper bound on the handshake and on each search
    pub timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 128,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A single PV line from multi-PV analysis
#[derive(Debug, Clone, PartialEq)]
pub struct PvLine {
    /// 1-based MultiPV index
    pub multipv: u32,
    /// Depth the line was reported at
    pub depth: Option<u32>,
    /// Score from the side to move's perspective
    pub score: Option<Score>,
    /// Principal variation moves in UCI notation
    pub pv: Vec<String>,
}

/// Engine subprocess speaking UCI
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
    timeout: Duration,
    /// Set once the engine stops answering; later calls fail fast
    dead: bool,
}

impl StockfishEngine {
    /// Spawn the engine process and initialize UCI
    pub async fn new(path: &str, options: &EngineOptions) -> Result<Self, AnalyzerError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AnalyzerError::EngineNotFound(path.to_string()),
                _ => AnalyzerError::Engine(format!("Failed to spawn engine at {path}: {e}")),
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AnalyzerError::Engine("engine stdin is not piped".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| AnalyzerError::Engine("engine stdout is not piped".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
            name: None,
            timeout: options.timeout,
            dead: false,
        };

        let timeout = engine.timeout;
        let handshake = tokio::time::timeout(timeout, engine.handshake(options)).await;
        match handshake {
            Ok(result) => result?,
            Err(_) => return Err(AnalyzerError::EngineTimeout(timeout.as_secs())),
        }

        info!(path, name = engine.name().unwrap_or("unknown"), "Engine ready");
        Ok(engine)
    }

    /// Name reported by the engine in `id name`
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn handshake(&mut self, options: &EngineOptions) -> Result<(), AnalyzerError> {
        self.send("uci").await?;
        loop {
            let line = self.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = Some(name.trim().to_string());
            } else if line == "uciok" {
                break;
            }
        }

        // Configure for analysis
        self.send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to the engine
    async fn send(&mut self, cmd: &str) -> Result<(), AnalyzerError> {
        debug!(cmd, "engine <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AnalyzerError::Engine(format!("Failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AnalyzerError::Engine(format!("Failed to flush engine stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line. End of stream means the engine died.
    async fn read_line(&mut self) -> Result<String, AnalyzerError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| AnalyzerError::Engine(format!("Failed to read from engine: {e}")))?;
        if read == 0 {
            return Err(AnalyzerError::Engine("engine exited unexpectedly".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "engine >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AnalyzerError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Search a position and return up to `multipv` lines, best first.
    ///
    /// On timeout the search is stopped and its output drained, so the
    /// engine can be reused. An engine that ignores `stop` is killed.
    pub async fn analyse(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        multipv: u32,
    ) -> Result<Vec<PvLine>, AnalyzerError> {
        if self.dead {
            return Err(AnalyzerError::Engine("engine is no longer responding".into()));
        }

        let timeout = self.timeout;
        let outcome = tokio::time::timeout(timeout, self.search(fen, limit, multipv)).await;
        match outcome {
            Ok(Ok(lines)) => Ok(lines),
            Ok(Err(e)) => {
                self.dead = true;
                Err(e)
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Search timed out, stopping engine");
                self.stop_search().await;
                Err(AnalyzerError::EngineTimeout(timeout.as_secs()))
            }
        }
    }

    /// Stop the running search and skip its output up to `bestmove`.
    async fn stop_search(&mut self) {
        let drained = async {
            self.send("stop").await?;
            self.skip_to_bestmove().await
        };
        let outcome = tokio::time::timeout(STOP_GRACE, drained).await;
        if !matches!(outcome, Ok(Ok(()))) {
            warn!("Engine ignored stop, killing it");
            self.dead = true;
            let _ = self.process.start_kill();
        }
    }

    async fn skip_to_bestmove(&mut self) -> Result<(), AnalyzerError> {
        loop {
            if self.read_line().await?.starts_with("bestmove") {
                return Ok(());
            }
        }
    }

    async fn search(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        multipv: u32,
    ) -> Result<Vec<PvLine>, AnalyzerError> {
        self.send(&format!("setoption name MultiPV value {multipv}"))
            .await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&limit.go_command()).await?;

        let mut lines: Vec<Option<PvLine>> = vec![None; multipv as usize];

        loop {
            let line = self.read_line().await?;

            if line.starts_with("info") && line.contains(" pv ") {
                let Some(parsed) = parse_info_line(&line) else {
                    continue;
                };
                let idx = parsed.multipv as usize;
                if idx == 0 || idx > lines.len() {
                    continue;
                }
                // Bound-only lines fill a slot but never replace an exact score
                let slot = &mut lines[idx - 1];
                if !is_bound(&line) || slot.is_none() {
                    *slot = Some(parsed);
                }
            } else if line.starts_with("bestmove") {
                break;
            }
        }

        Ok(lines.into_iter().flatten().collect())
    }

    /// Send quit and wait briefly for the process to exit, then kill it
    pub async fn quit(&mut self) {
        if !self.dead {
            let _ = self.send("quit").await;
        }
        let exited = tokio::time::timeout(QUIT_GRACE, self.process.wait()).await;
        if exited.is_err() {
            warn!("Engine did not exit after quit, killing it");
            let _ = self.process.start_kill();
            let _ = self.process.wait().await;
        }
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Parse an `info ... pv ...` line. Lines without PV moves are ignored.
pub fn parse_info_line(line: &str) -> Option<PvLine> {
    let pv = parse_pv(line);
    if pv.is_empty() {
        return None;
    }
    Some(PvLine {
        // Single-PV engines omit the index
        multipv: parse_value(line, "multipv").unwrap_or(1),
        depth: parse_value(line, "depth"),
        score: parse_score(line),
        pv,
    })
}

/// Score from an info line, mate taking precedence over centipawns
fn parse_score(line: &str) -> Option<Score> {
    if let Some(mate) = parse_value(line, "mate") {
        return Some(Score::Mate(mate));
    }
    parse_value(line, "cp").map(Score::Cp)
}

/// Parse the token following `key`
fn parse_value<T: std::str::FromStr>(line: &str, key: &str) -> Option<T> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    // PV moves never collide with keys, but stop there anyway
    for (i, part) in parts.iter().enumerate() {
        if *part == "pv" {
            break;
        }
        if *part == key && i + 1 < parts.len() {
            return parts[i + 1].parse().ok();
        }
    }
    None
}

fn is_bound(line: &str) -> bool {
    line.split_whitespace()
        .any(|part| part == "lowerbound" || part == "upperbound")
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut in_pv = false;
    let mut moves = Vec::new();

    for part in parts {
        if part == "pv" {
            in_pv = true;
            continue;
        }
        if in_pv {
            // PV ends at next keyword or end of line
            if part.starts_with("bmc") || part == "string" {
                break;
            }
            moves.push(part.to_string());
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        let parsed = parse_info_line(line).unwrap();
        assert_eq!(parsed.score, Some(Score::Cp(35)));
        assert_eq!(parsed.depth, Some(20));
        assert_eq!(parsed.multipv, 1);
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        let parsed = parse_info_line(line).unwrap();
        assert_eq!(parsed.score, Some(Score::Mate(-3)));
        assert_eq!(parsed.multipv, 1);
    }

    #[test]
    fn test_parse_pv() {
        let line = "info depth 20 multipv 2 score cp 35 pv e2e4 e7e5 g1f3";
        let parsed = parse_info_line(line).unwrap();
        assert_eq!(parsed.pv, vec!["e2e4", "e7e5", "g1f3"]);
        assert_eq!(parsed.multipv, 2);
    }

    #[test]
    fn test_line_without_pv_ignored() {
        assert!(parse_info_line("info depth 5 currmove e2e4 currmovenumber 1").is_none());
    }

    #[test]
    fn test_bound_detection() {
        assert!(is_bound("info depth 12 score cp 40 lowerbound pv e2e4"));
        assert!(!is_bound("info depth 12 score cp 40 pv e2e4"));
    }

    #[test]
    fn test_go_command() {
        assert_eq!(SearchLimit::Depth(15).go_command(), "go depth 15");
        assert_eq!(SearchLimit::MoveTime(250).go_command(), "go movetime 250");
    }
}
