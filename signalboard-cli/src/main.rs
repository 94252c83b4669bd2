use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use signalboard::Store;
use std::process;

/// Signalboard CLI — operate on a Signalboard data directory from the command line
#[derive(Parser)]
#[command(name = "signalboard", version, about)]
struct Cli {
    /// Path to the data directory
    #[arg(long, default_value = "data")]
    data_dir: String,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionArg {
    Users,
    Signals,
    Sites,
    Submissions,
}

#[derive(Subcommand)]
enum Command {
    /// List all records in a collection
    List {
        /// Collection name
        collection: CollectionArg,
    },

    /// Register a new user
    Register {
        username: String,
        password: String,
    },

    /// Mark a user verified with their registration code
    Verify {
        username: String,
        /// Five-digit verification code
        code: String,
    },

    /// Delete a user by username
    DeleteUser {
        username: String,
    },

    /// Submit a new site to the directory
    SubmitSite {
        name: String,
        url: String,
        description: String,
    },

    /// Like a site by id
    Like {
        id: u64,
    },

    /// Show record counts per collection
    Status,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(&cli.data_dir)?;
    let format = cli.format;

    match cli.command {
        Command::List { collection } => {
            let records = match collection {
                CollectionArg::Users => serde_json::to_value(store.list_users()?)?,
                CollectionArg::Signals => serde_json::to_value(store.list_signals()?)?,
                CollectionArg::Sites => serde_json::to_value(store.list_sites()?)?,
                CollectionArg::Submissions => serde_json::to_value(store.list_submissions()?)?,
            };
            print_output(&records, format);
        }

        Command::Register { username, password } => {
            let user = store.register_user(&username, &password)?;
            print_output(
                &json!({
                    "ok": true,
                    "username": user.username,
                    "verification_code": user.verification_code,
                }),
                format,
            );
        }

        Command::Verify { username, code } => {
            let verified = store.verify_user(&username, &code)?;
            print_output(&json!({ "ok": verified, "username": username }), format);
        }

        Command::DeleteUser { username } => {
            let removed = store.delete_user(&username)?;
            print_output(&json!({ "ok": removed, "deleted": username }), format);
        }

        Command::SubmitSite {
            name,
            url,
            description,
        } => {
            let site = store.submit_site(&name, &url, &description)?;
            print_output(&json!({ "ok": true, "id": site.id }), format);
        }

        Command::Like { id } => {
            let likes = store.like_site(id)?;
            print_output(&json!({ "ok": true, "id": id, "likes": likes }), format);
        }

        Command::Status => {
            let status = store.status()?;
            print_output(&status, format);
        }
    }

    Ok(())
}

fn print_output(value: &serde_json::Value, format: OutputFormat) {
    println!("{}", render_output(value, format));
}

fn render_output(value: &serde_json::Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("ERROR:{e}"))
        }
        OutputFormat::Table => render_table(value),
    }
}

/// Tab-separated table: arrays of objects get a header row from the first
/// record's keys; plain objects get key/value rows with nested values as
/// compact JSON.
fn render_table(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(rows) => {
            let columns: Vec<&String> = match rows.first().and_then(|r| r.as_object()) {
                Some(first) => first.keys().collect(),
                None => return "(empty)".to_string(),
            };

            let mut out = columns
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("\t");
            for row in rows {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| table_cell(row.get(c.as_str())))
                    .collect();
                out.push('\n');
                out.push_str(&cells.join("\t"));
            }
            out
        }
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}\t{}", table_cell(Some(v))))
            .collect::<Vec<_>>()
            .join("\n"),
        other => table_cell(Some(other)),
    }
}

fn table_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_register_and_status() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_dir = tmp.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "signalboard",
            "--data-dir",
            &data_dir,
            "register",
            "alice",
            "hunter2",
        ]);
        run(cli).unwrap();

        let store = Store::open(&data_dir).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 1);

        let cli = Cli::parse_from(["signalboard", "--data-dir", &data_dir, "status"]);
        run(cli).unwrap();
    }

    #[test]
    fn test_run_like_missing_site_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_dir = tmp.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from(["signalboard", "--data-dir", &data_dir, "like", "7"]);
        assert!(run(cli).is_err());
    }

    #[test]
    fn test_format_flag_parses_table() {
        let cli = Cli::parse_from([
            "signalboard",
            "--format",
            "table",
            "list",
            "sites",
        ]);
        assert!(matches!(cli.format, OutputFormat::Table));
    }

    #[test]
    fn test_render_table_for_list() {
        let records = serde_json::json!([
            { "id": 1, "name": "Example", "likes": 0 },
            { "id": 2, "name": "Other", "likes": 3 },
        ]);

        let table = render_table(&records);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "id\tlikes\tname");
        assert_eq!(lines[1], "1\t0\tExample");
        assert_eq!(lines[2], "2\t3\tOther");
    }

    #[test]
    fn test_render_table_for_empty_list() {
        assert_eq!(render_table(&serde_json::json!([])), "(empty)");
    }

    #[test]
    fn test_render_table_for_status_object() {
        let status = serde_json::json!({
            "collections": { "users": { "count": 1 } },
            "data_dir": "data",
        });

        let table = render_table(&status);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "collections\t{\"users\":{\"count\":1}}");
        assert_eq!(lines[1], "data_dir\tdata");
    }

    #[test]
    fn test_run_list_table_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data_dir = tmp.path().to_str().unwrap().to_string();

        let store = Store::open(&data_dir).unwrap();
        store
            .submit_site("Example", "https://example.com", "an example")
            .unwrap();

        let cli = Cli::parse_from([
            "signalboard",
            "--data-dir",
            &data_dir,
            "--format",
            "table",
            "list",
            "sites",
        ]);
        run(cli).unwrap();
    }
}
