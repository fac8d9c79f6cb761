use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000)
}

/// Write an executable `/bin/sh` script that plays the part of a UCI engine.
///
/// `arms` are extra `case` arms matched against each input line (`$line`)
/// before the default `uci`, `isready` and `quit` handling, so they can
/// override it.
#[cfg(unix)]
pub fn fake_engine(name: &str, arms: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("chess-analyzer-{name}-{}", unique_suffix()));
    std::fs::create_dir_all(&dir).unwrap();

    let script = [
        "#!/bin/sh",
        "while read -r line; do",
        "  case \"$line\" in",
        arms,
        "    uci) echo \"id name FakeFish\"; echo uciok ;;",
        "    isready) echo readyok ;;",
        "    quit) exit 0 ;;",
        "  esac",
        "done",
        "",
    ]
    .join("\n");

    let path = dir.join("engine.sh");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
