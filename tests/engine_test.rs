//! Integration tests: the engine wrapper against scripted fake UCI engines.
//!
//! The fake engines are small shell scripts, so these tests only run on unix
//! and never need a real Stockfish binary.
#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use chess_core::notation::{fen, STARTING_FEN};
use chess_core::position::parse_position;
use position_analyzer::analysis::analyze;
use position_analyzer::config::AnalyzerConfig;
use position_analyzer::error::AnalyzerError;
use position_analyzer::report::render_text;
use position_analyzer::score::Score;
use position_analyzer::stockfish::{EngineOptions, SearchLimit, StockfishEngine};
use tokio::sync::Mutex;

/// Writing a script and exec'ing it while another test thread forks can fail
/// with ETXTBSY, so engine tests take turns.
static SPAWN_LOCK: Mutex<()> = Mutex::const_new(());

const MULTI_PV: &str = r#"    go*)
      echo "info depth 1 multipv 1 score cp 20 pv e2e4"
      echo "info depth 10 multipv 1 score cp 35 pv e2e4 e7e5 g1f3"
      echo "info depth 10 multipv 2 score cp 30 pv d2d4 d7d5"
      echo "info depth 10 multipv 3 score cp 25 lowerbound pv g1f3"
      echo "info depth 10 multipv 1 score cp 90 upperbound pv e2e4"
      echo "bestmove e2e4 ponder e7e5" ;;"#;

fn options(timeout_secs: u64) -> EngineOptions {
    EngineOptions {
        timeout: Duration::from_secs(timeout_secs),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_multipv_search() {
    let _guard = SPAWN_LOCK.lock().await;
    let path = common::fake_engine("multipv", MULTI_PV);

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(10))
        .await
        .unwrap();
    assert_eq!(engine.name(), Some("FakeFish"));

    let lines = engine
        .analyse(STARTING_FEN, SearchLimit::Depth(10), 3)
        .await
        .unwrap();
    engine.quit().await;

    assert_eq!(lines.len(), 3);
    // The deeper exact line wins, the later upperbound does not replace it
    assert_eq!(lines[0].score, Some(Score::Cp(35)));
    assert_eq!(lines[0].pv, vec!["e2e4", "e7e5", "g1f3"]);
    assert_eq!(lines[1].multipv, 2);
    // A bound line still fills an empty slot
    assert_eq!(lines[2].score, Some(Score::Cp(25)));
}

#[tokio::test]
async fn test_end_to_end_report() {
    let _guard = SPAWN_LOCK.lock().await;
    let path = common::fake_engine("report", MULTI_PV);

    let config = AnalyzerConfig::from_lookup(|_| None).unwrap();
    let parsed = parse_position("start").unwrap();

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(10))
        .await
        .unwrap();
    let report = analyze(&mut engine, &parsed, &config).await.unwrap();
    engine.quit().await;

    let sans: Vec<&str> = report.candidates.iter().map(|c| c.san.as_str()).collect();
    assert_eq!(sans, vec!["e4", "d4", "Nf3"]);

    let text = render_text(&report, false);
    assert!(text.contains("Top 3 Recommended Moves:"));
    assert!(text.contains("   Principal Variation: e4 e5 Nf3\n"));
    assert!(text.contains("   Evaluation: +0.35\n"));
}

#[tokio::test]
async fn test_missing_engine() {
    let missing = format!("/nonexistent/stockfish-{}", common::unique_suffix());
    let err = match StockfishEngine::new(&missing, &options(5)).await {
        Ok(_) => panic!("engine should not start"),
        Err(e) => e,
    };

    assert!(matches!(err, AnalyzerError::EngineNotFound(ref p) if *p == missing));
    assert_eq!(err.to_string(), format!("engine binary not found at {missing}"));
}

#[tokio::test]
async fn test_engine_dies_mid_search() {
    let _guard = SPAWN_LOCK.lock().await;
    let path = common::fake_engine(
        "crash",
        r#"    go*)
      echo "info depth 1 multipv 1 score cp 20 pv e2e4"
      exit 1 ;;"#,
    );

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(10))
        .await
        .unwrap();
    let err = engine
        .analyse(STARTING_FEN, SearchLimit::Depth(10), 3)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::Engine(ref msg) if msg.contains("exited unexpectedly")));
}

#[tokio::test]
async fn test_engine_reusable_after_timeout() {
    let _guard = SPAWN_LOCK.lock().await;
    // Silent on the start position until told to stop, answers after 1.e4
    let path = common::fake_engine(
        "stopped",
        r#"    position*) pos="$line" ;;
    go*)
      case "$pos" in
        *" b KQkq "*)
          echo "info depth 5 multipv 1 score cp 10 pv d7d5"
          echo "bestmove d7d5" ;;
      esac ;;
    stop)
      echo "info depth 3 multipv 1 score cp 99 pv e2e4"
      echo "bestmove e2e4" ;;"#,
    );

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(1))
        .await
        .unwrap();
    let err = engine
        .analyse(STARTING_FEN, SearchLimit::Depth(10), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::EngineTimeout(1)));

    // The stopped search's output must not leak into the next one
    let after_e4 = parse_position("e4").unwrap();
    let lines = engine
        .analyse(&fen(&after_e4.position), SearchLimit::Depth(10), 1)
        .await
        .unwrap();
    engine.quit().await;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].pv, vec!["d7d5"]);
    assert_eq!(lines[0].score, Some(Score::Cp(10)));
}

#[tokio::test]
async fn test_unresponsive_engine_fails_fast() {
    let _guard = SPAWN_LOCK.lock().await;
    let path = common::fake_engine("hung", "    go*) sleep 20 ;;");

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(1))
        .await
        .unwrap();
    let err = engine
        .analyse(STARTING_FEN, SearchLimit::MoveTime(100), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::EngineTimeout(1)));

    let start = Instant::now();
    let err = engine
        .analyse(STARTING_FEN, SearchLimit::MoveTime(100), 1)
        .await
        .unwrap_err();
    engine.quit().await;

    assert!(matches!(err, AnalyzerError::Engine(_)));
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn test_quit_is_bounded() {
    let _guard = SPAWN_LOCK.lock().await;
    let path = common::fake_engine("stubborn", "    quit) sleep 20 ;;");

    let mut engine = StockfishEngine::new(path.to_str().unwrap(), &options(5))
        .await
        .unwrap();

    let start = Instant::now();
    engine.quit().await;
    assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
}
