//! Built-in sample positions, analysed back to back with one engine

use chess_core::position::parse_position;
use tracing::warn;

use crate::analysis::{analyze, CandidateSource};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::report::AnalysisReport;

/// (description, input)
pub const SAMPLES: &[(&str, &str)] = &[
    ("Starting position", "start"),
    ("After 1.e4", "e4"),
    ("Sicilian Defense", "e4 c5"),
    ("Scholar's mate setup", "e4 e5 Bc4 Nc6 Qh5"),
    ("FEN - Endgame", "8/8/8/8/8/8/6k1/4K2R w K - 0 1"),
    (
        "Complex middle game",
        "e4 e5 Nf3 Nc6 Bb5 a6 Ba4 Nf6 O-O Be7 Re1 b5 Bb3 d6",
    ),
];

pub struct SampleOutcome {
    pub description: &'static str,
    pub input: &'static str,
    pub result: Result<AnalysisReport, AnalyzerError>,
}

/// Analyse every sample. A failing sample is recorded and the run goes on.
pub async fn analyze_samples<S: CandidateSource>(
    source: &mut S,
    config: &AnalyzerConfig,
) -> Vec<SampleOutcome> {
    let mut outcomes = Vec::with_capacity(SAMPLES.len());

    for &(description, input) in SAMPLES {
        let result = match parse_position(input) {
            Ok(parsed) => analyze(source, &parsed, config).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            warn!(sample = description, error = %e, "Sample failed");
        }
        outcomes.push(SampleOutcome {
            description,
            input,
            result,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::FixedSource;
    use crate::report::Side;
    use chess_core::position::InputKind;

    #[test]
    fn test_every_sample_parses() {
        for (description, input) in SAMPLES {
            assert!(parse_position(input).is_ok(), "{description}");
        }
    }

    #[tokio::test]
    async fn test_samples_run_in_order() {
        // No PV line is legal in every sample, so only the call count matters
        let mut source = FixedSource::new(Vec::new());
        let config = AnalyzerConfig::from_lookup(|_| None).unwrap();

        let outcomes = analyze_samples(&mut source, &config).await;
        assert_eq!(outcomes.len(), SAMPLES.len());
        assert_eq!(source.calls, SAMPLES.len());

        let endgame = outcomes
            .iter()
            .find(|o| o.description == "FEN - Endgame")
            .unwrap();
        let report = endgame.result.as_ref().unwrap();
        assert_eq!(report.input_kind, InputKind::Fen);
        assert_eq!(report.turn, Side::White);

        let middle_game = outcomes.last().unwrap().result.as_ref().unwrap();
        assert_eq!(middle_game.opening, None);
        assert!(middle_game.input_moves.as_deref().unwrap().starts_with("1. e4 e5 2. Nf3"));
    }
}
