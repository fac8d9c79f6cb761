//! Analyzer configuration from environment variables, overridden by CLI flags

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::AnalyzerError;
use crate::stockfish::{EngineOptions, SearchLimit};

pub const DEFAULT_STOCKFISH_PATH: &str = "/usr/games/stockfish";
pub const DEFAULT_DEPTH: u32 = 15;
pub const DEFAULT_MULTIPV: u32 = 3;
pub const DEFAULT_PV_PLIES: usize = 4;
pub const MAX_MULTIPV: u32 = 10;
pub const MAX_DEPTH: u32 = 99;

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Path to the UCI engine binary
    pub stockfish_path: String,

    /// Depth or move-time limit for each search
    pub limit: SearchLimit,

    /// Number of candidate moves requested (UCI MultiPV)
    pub multipv: u32,

    /// Principal variation plies shown per candidate
    pub pv_plies: usize,

    /// Engine options sent during the handshake, plus the search timeout
    pub engine: EngineOptions,

    /// ANSI colours in text output
    pub color: bool,
}

/// Values given on the command line. `None` keeps the environment value.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub stockfish_path: Option<String>,
    pub depth: Option<u32>,
    pub movetime_ms: Option<u64>,
    pub multipv: Option<u32>,
    pub pv_plies: Option<usize>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub no_color: bool,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the process environment in `load`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stockfish_path = lookup("STOCKFISH_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STOCKFISH_PATH.to_string());

        let depth = parse_var(&lookup, "ANALYSIS_DEPTH")?.unwrap_or(DEFAULT_DEPTH);
        let movetime: Option<u64> = parse_var(&lookup, "ANALYSIS_MOVETIME_MS")?;
        let limit = match movetime {
            Some(ms) => SearchLimit::MoveTime(ms),
            None => SearchLimit::Depth(depth),
        };

        let multipv = parse_var(&lookup, "MULTIPV")?.unwrap_or(DEFAULT_MULTIPV);
        let pv_plies = parse_var(&lookup, "PV_PLIES")?.unwrap_or(DEFAULT_PV_PLIES);

        let defaults = EngineOptions::default();
        let engine = EngineOptions {
            threads: parse_var(&lookup, "ENGINE_THREADS")?.unwrap_or(defaults.threads),
            hash_mb: parse_var(&lookup, "ENGINE_HASH_MB")?.unwrap_or(defaults.hash_mb),
            timeout: parse_var(&lookup, "ENGINE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        let config = Self {
            stockfish_path,
            limit,
            multipv,
            pv_plies,
            engine,
            color: lookup("NO_COLOR").is_none(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line values on top of the environment.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), AnalyzerError> {
        if let Some(path) = overrides.stockfish_path {
            self.stockfish_path = path;
        }
        // An explicit depth on the command line beats a move time from the environment
        match (overrides.movetime_ms, overrides.depth) {
            (Some(ms), _) => self.limit = SearchLimit::MoveTime(ms),
            (None, Some(depth)) => self.limit = SearchLimit::Depth(depth),
            (None, None) => {}
        }
        if let Some(multipv) = overrides.multipv {
            self.multipv = multipv;
        }
        if let Some(plies) = overrides.pv_plies {
            self.pv_plies = plies;
        }
        if let Some(threads) = overrides.threads {
            self.engine.threads = threads;
        }
        if let Some(hash) = overrides.hash_mb {
            self.engine.hash_mb = hash;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.engine.timeout = Duration::from_secs(secs);
        }
        if overrides.no_color {
            self.color = false;
        }

        self.validate()?;
        debug!(config = ?self, "Configuration resolved");
        Ok(())
    }

    fn validate(&self) -> Result<(), AnalyzerError> {
        match self.limit {
            SearchLimit::Depth(d) if d == 0 || d > MAX_DEPTH => {
                return Err(AnalyzerError::Config(format!(
                    "depth must be between 1 and {MAX_DEPTH}, got {d}"
                )));
            }
            SearchLimit::MoveTime(0) => {
                return Err(AnalyzerError::Config("move time must be at least 1 ms".into()));
            }
            _ => {}
        }
        if self.multipv == 0 || self.multipv > MAX_MULTIPV {
            return Err(AnalyzerError::Config(format!(
                "number of lines must be between 1 and {MAX_MULTIPV}, got {}",
                self.multipv
            )));
        }
        if self.pv_plies == 0 {
            return Err(AnalyzerError::Config("PV plies must be at least 1".into()));
        }
        if self.engine.threads == 0 {
            return Err(AnalyzerError::Config("engine threads must be at least 1".into()));
        }
        if self.engine.timeout.is_zero() {
            return Err(AnalyzerError::Config("engine timeout must be at least 1s".into()));
        }
        Ok(())
    }
}

/// Parse an optional numeric variable. Empty counts as unset, garbage is an error.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AnalyzerError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AnalyzerError::Config(format!("{key} must be a number, got '{raw}'"))),
    }
}
