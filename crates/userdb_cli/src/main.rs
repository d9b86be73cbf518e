//! Command-line front end for the userdb Record Store.
//!
//! # Responsibility
//! - Stand in for the mobile form UI on desktop: add, list, update, delete.
//! - Own the store connection for the lifetime of one command.
//!
//! # Invariants
//! - Arguments are passed through the same form validation as the UI.
//! - Store failures exit non-zero with the typed error message.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use userdb_core::db::DEFAULT_DB_FILE_NAME;
use userdb_core::{
    close_store, default_log_level, init_logging, open_store, ActionOutcome, FormAction,
    SqliteUserRepository, User, UserForm, UserService, WriteOutcome,
};

const APP_DIR_NAME: &str = "userdb";
const EMPTY_LIST_MESSAGE: &str = "No users found";

#[derive(Debug, Parser)]
#[command(name = "userdb", version, about = "Manage users in a local SQLite store")]
struct Cli {
    /// Store file; defaults to the platform data dir.
    #[arg(long, global = true, env = "USERDB_DB_PATH")]
    db: Option<PathBuf>,

    /// Write rolling logs into this absolute directory.
    #[arg(long, global = true, env = "USERDB_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Store(StoreCommand),
    /// Print the store file path.
    Path,
}

/// Commands that need an open store.
#[derive(Debug, Subcommand)]
enum StoreCommand {
    /// Add a user.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        age: String,
    },
    /// List all users in insertion order.
    List(ListArgs),
    /// Replace name and age of a user.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        age: String,
    },
    /// Delete a user by id.
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Print the list as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    run(cli.command, &db_path)
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<()> {
    let level = level.map_or_else(|| default_log_level().to_string(), str::to_string);
    init_logging(&level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)
}

fn run(command: Command, db_path: &Path) -> Result<()> {
    let command = match command {
        Command::Store(command) => command,
        Command::Path => {
            println!("{}", db_path.display());
            return Ok(());
        }
    };

    if let Some(parent) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let conn = open_store(db_path)?;
    let output = {
        let service = UserService::new(SqliteUserRepository::new(&conn));
        execute(&service, command)?
    };
    close_store(conn)?;

    println!("{output}");
    Ok(())
}

fn execute(
    service: &UserService<SqliteUserRepository<'_>>,
    command: StoreCommand,
) -> Result<String> {
    let (action, form) = match command {
        StoreCommand::List(args) => return render_list(&service.list_users()?, args.json),
        StoreCommand::Add { name, age } => (FormAction::Add, UserForm::new(name, age, "")),
        StoreCommand::Update { id, name, age } => {
            (FormAction::Update, UserForm::new(name, age, id))
        }
        StoreCommand::Delete { id } => (FormAction::Delete, UserForm::new("", "", id)),
    };

    let submission = service.submit(action, &form)?;
    let summary = match submission.outcome {
        ActionOutcome::Inserted(id) => format!("added user {id}"),
        ActionOutcome::Written(WriteOutcome::NoMatch) => "no matching user".to_string(),
        ActionOutcome::Written(WriteOutcome::Applied { rows_affected }) => {
            format!("{rows_affected} row(s) affected")
        }
    };
    let listing = match &submission.refresh_error {
        Some(err) => format!("failed to refresh user list: {err}"),
        None => render_list(&submission.users, false)?,
    };
    Ok(format!("{summary}\n{listing}"))
}

fn render_list(users: &[User], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(users).context("failed to encode users as JSON");
    }
    if users.is_empty() {
        return Ok(EMPTY_LIST_MESSAGE.to_string());
    }
    Ok(users
        .iter()
        .map(User::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("no local data directory on this platform")?;
    Ok(base.join(APP_DIR_NAME).join(DEFAULT_DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{execute, render_list, start_logging, Cli, Command, ListArgs, StoreCommand};
    use clap::Parser;
    use userdb_core::{
        logging_status, open_store_in_memory, LogLevel, SqliteUserRepository, User, UserService,
    };

    #[test]
    fn parses_update_with_global_db_flag() {
        let cli = Cli::try_parse_from([
            "userdb", "update", "--id", "1", "--name", "Alicia", "--age", "31", "--db",
            "/tmp/u.sqlite",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/u.sqlite")));
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::Update { ref id, .. }) if id == "1"
        ));
    }

    #[test]
    fn parses_negative_age_as_separate_value() {
        let cli = Cli::try_parse_from(["userdb", "add", "--name", "Ghost", "--age", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::Add { ref age, .. }) if age == "-1"
        ));

        let cli = Cli::try_parse_from([
            "userdb", "update", "--id", "3", "--name", "Ghost", "--age", "-2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::Update { ref age, .. }) if age == "-2"
        ));
    }

    #[test]
    fn start_logging_activates_file_logging_once() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().to_path_buf();

        start_logging(&log_dir, Some("warn")).unwrap();
        start_logging(&log_dir, Some("WARN")).unwrap();
        assert!(start_logging(&log_dir, Some("debug")).is_err());

        let (level, active_dir) = logging_status().expect("logging should be active");
        assert_eq!(level, LogLevel::Warn);
        assert_eq!(active_dir, log_dir);
    }

    #[test]
    fn execute_add_with_negative_age_persists_it() {
        let conn = open_store_in_memory().unwrap();
        let service = UserService::new(SqliteUserRepository::new(&conn));

        let added = execute(
            &service,
            StoreCommand::Add {
                name: "Ghost".to_string(),
                age: "-1".to_string(),
            },
        )
        .unwrap();
        assert_eq!(added, "added user 1\nID: 1  Name: Ghost  Age: -1");
    }

    #[test]
    fn execute_reports_failed_refresh_after_committed_add() {
        let conn = open_store_in_memory().unwrap();
        conn.execute("INSERT INTO Users (name, age) VALUES ('Broken', 'bad');", [])
            .unwrap();
        let service = UserService::new(SqliteUserRepository::new(&conn));

        let added = execute(
            &service,
            StoreCommand::Add {
                name: "Alice".to_string(),
                age: "30".to_string(),
            },
        )
        .unwrap();
        assert!(added.starts_with("added user 2\nfailed to refresh user list:"));
    }

    #[test]
    fn render_list_reports_empty_store() {
        assert_eq!(render_list(&[], false).unwrap(), "No users found");
        assert_eq!(render_list(&[], true).unwrap(), "[]");
    }

    #[test]
    fn execute_add_then_list() {
        let conn = open_store_in_memory().unwrap();
        let service = UserService::new(SqliteUserRepository::new(&conn));

        let added = execute(
            &service,
            StoreCommand::Add {
                name: "Alice".to_string(),
                age: "30".to_string(),
            },
        )
        .unwrap();
        assert_eq!(added, "added user 1\nID: 1  Name: Alice  Age: 30");

        let missing = execute(
            &service,
            StoreCommand::Delete {
                id: "9".to_string(),
            },
        )
        .unwrap();
        assert!(missing.starts_with("no matching user"));

        let users: Vec<User> = serde_json::from_str(
            &execute(&service, StoreCommand::List(ListArgs { json: true })).unwrap(),
        )
        .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Alice");
    }

    #[test]
    fn execute_rejects_bad_age() {
        let conn = open_store_in_memory().unwrap();
        let service = UserService::new(SqliteUserRepository::new(&conn));

        let err = execute(
            &service,
            StoreCommand::Add {
                name: "Alice".to_string(),
                age: "old".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("age must be an integer"));
    }
}
