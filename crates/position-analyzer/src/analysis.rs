//! One analysis pass: position in, report out

use std::time::Instant;

use chess_core::notation;
use chess_core::position::ParsedPosition;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::report::{build_report, AnalysisReport, GameStatus};
use crate::stockfish::{PvLine, SearchLimit, StockfishEngine};

/// Anything that can produce ranked engine lines for a FEN
#[allow(async_fn_in_trait)]
pub trait CandidateSource {
    async fn candidate_lines(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        multipv: u32,
    ) -> Result<Vec<PvLine>, AnalyzerError>;
}

impl CandidateSource for StockfishEngine {
    async fn candidate_lines(
        &mut self,
        fen: &str,
        limit: SearchLimit,
        multipv: u32,
    ) -> Result<Vec<PvLine>, AnalyzerError> {
        self.analyse(fen, limit, multipv).await
    }
}

/// Analyse a parsed position. Finished games never reach the engine.
pub async fn analyze<S: CandidateSource>(
    source: &mut S,
    parsed: &ParsedPosition,
    config: &AnalyzerConfig,
) -> Result<AnalysisReport, AnalyzerError> {
    let start = Instant::now();
    let fen = notation::fen(&parsed.position);

    let status = GameStatus::of(&parsed.position);
    if status.is_finished() {
        info!(%fen, ?status, "Game is over, skipping engine");
        return Ok(build_report(parsed, &[], config.pv_plies));
    }

    let lines = source
        .candidate_lines(&fen, config.limit, config.multipv)
        .await?;
    let report = build_report(parsed, &lines, config.pv_plies);

    info!(
        %fen,
        candidates = report.candidates.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analysis complete"
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::score::Score;
    use chess_core::position::parse_position;

    /// Canned engine: returns the same lines for every position
    pub(crate) struct FixedSource {
        pub lines: Vec<PvLine>,
        pub calls: usize,
    }

    impl FixedSource {
        pub(crate) fn new(lines: Vec<PvLine>) -> Self {
            Self { lines, calls: 0 }
        }
    }

    impl CandidateSource for FixedSource {
        async fn candidate_lines(
            &mut self,
            _fen: &str,
            _limit: SearchLimit,
            multipv: u32,
        ) -> Result<Vec<PvLine>, AnalyzerError> {
            self.calls += 1;
            Ok(self
                .lines
                .iter()
                .filter(|line| line.multipv <= multipv)
                .cloned()
                .collect())
        }
    }

    fn config() -> AnalyzerConfig {
        AnalyzerConfig::from_lookup(|_| None).unwrap()
    }

    fn line(multipv: u32, cp: i32, moves: &[&str]) -> PvLine {
        PvLine {
            multipv,
            depth: Some(15),
            score: Some(Score::Cp(cp)),
            pv: moves.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_analyze_uses_source() {
        let mut source = FixedSource::new(vec![
            line(1, 30, &["e2e4", "e7e5"]),
            line(2, 25, &["d2d4"]),
        ]);
        let parsed = parse_position("start").unwrap();

        let report = analyze(&mut source, &parsed, &config()).await.unwrap();
        assert_eq!(source.calls, 1);
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.candidates[0].pv, vec!["e4", "e5"]);
    }

    #[tokio::test]
    async fn test_finished_game_skips_source() {
        let mut source = FixedSource::new(vec![line(1, 0, &["e2e4"])]);
        let parsed = parse_position("f3 e5 g4 Qh4#").unwrap();

        let report = analyze(&mut source, &parsed, &config()).await.unwrap();
        assert_eq!(source.calls, 0);
        assert_eq!(report.status, GameStatus::Checkmate);
        assert!(report.candidates.is_empty());
    }
}
