//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `eko_core` linkage.
//! - Run a one-shot daily reset sweep against a database file.
//!
//! Usage:
//! - `eko_cli` prints ping and version.
//! - `eko_cli reset <db_path> <user_id>` reopens the user's tasks that were
//!   completed on an earlier day.

use eko_core::{open_db, SqliteProfileRepository, StaticIdentity, SystemClock, TaskBoard};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [] => {
            println!("eko_core ping={}", eko_core::ping());
            println!("eko_core version={}", eko_core::core_version());
            ExitCode::SUCCESS
        }
        [command, db_path, user_id] if command == "reset" => match reset(db_path, user_id) {
            Ok(count) => {
                println!("daily reset reopened {count} task(s)");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("daily reset failed: {err}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: eko_cli [reset <db_path> <user_id>]");
            ExitCode::from(2)
        }
    }
}

fn reset(db_path: &str, user_id: &str) -> Result<usize, String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteProfileRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let identity = StaticIdentity::signed_in(user_id);
    let mut board = TaskBoard::load(repo, &identity, SystemClock).map_err(|err| err.to_string())?;
    board.run_daily_reset().map_err(|err| err.to_string())
}
