//! Command-line interface definition.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use daylog_core::OutputFormat;
use regex::Regex;

/// daylog - your calendar and todos from the terminal
#[derive(Debug, Parser)]
#[command(name = "daylog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DAYLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    // --- Connection flags ---
    /// Server base URL
    #[arg(long, env = "DAYLOG_URL")]
    pub url: Option<String>,

    /// Bearer token for the server
    #[arg(long, env = "DAYLOG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Use a local JSON file instead of the server
    #[arg(long, env = "DAYLOG_FILE")]
    pub file: Option<PathBuf>,

    // --- Display options ---
    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the events and todos on a day (default: today)
    Day {
        /// YYYY-MM-DD, today, tomorrow or yesterday
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show one event
    Show { id: i64 },

    /// Event commands
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Todo commands
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// List todos, unfinished first
    Todos,

    /// Diary commands
    Diary {
        #[command(subcommand)]
        action: DiaryAction,
    },

    /// Category commands
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Event actions.
#[derive(Debug, Subcommand)]
pub enum EventAction {
    /// Create an event
    ///
    /// Give one day with --date, a day range with --from/--to, or explicit
    /// times with --start/--end. With no times, an all-day event today is
    /// created.
    New {
        /// All-day event on this day
        #[arg(long, value_parser = parse_date, conflicts_with_all = ["from", "start"])]
        date: Option<NaiveDate>,

        /// First day of an all-day range
        #[arg(long, value_parser = parse_date, requires = "to", conflicts_with = "start")]
        from: Option<NaiveDate>,

        /// Last day of an all-day range (inclusive)
        #[arg(long, value_parser = parse_date, requires = "from")]
        to: Option<NaiveDate>,

        /// Start time (YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_datetime, requires = "end")]
        start: Option<NaiveDateTime>,

        /// End time; an end before the start becomes start + 1h
        #[arg(long, value_parser = parse_datetime, requires = "start")]
        end: Option<NaiveDateTime>,

        #[arg(long, short, default_value = "New event")]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<i64>,

        /// Hex color (#rgb or #rrggbb)
        #[arg(long, value_parser = parse_color)]
        color: Option<String>,
    },

    /// Edit an event
    ///
    /// The all-day switch is applied first, then --start, then --end. An
    /// end before the start becomes start + 1h.
    Edit {
        id: i64,

        #[arg(long, short)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// New start time (YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_datetime)]
        start: Option<NaiveDateTime>,

        /// New end time (YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,

        /// Make the event all-day
        #[arg(long, conflicts_with = "timed")]
        all_day: bool,

        /// Make the event timed; a one-hour slot at the next full hour
        #[arg(long)]
        timed: bool,

        /// Category id
        #[arg(long)]
        category: Option<i64>,

        /// Hex color (#rgb or #rrggbb)
        #[arg(long, value_parser = parse_color)]
        color: Option<String>,
    },

    /// Delete an event
    Delete { id: i64 },
}

/// Todo actions.
#[derive(Debug, Subcommand)]
pub enum TodoAction {
    /// Create a todo
    New {
        #[arg(long, short)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,

        /// Show the todo on the calendar on its due day
        #[arg(long, requires = "due")]
        calendar: bool,

        /// Category id
        #[arg(long)]
        category: Option<i64>,

        /// Hex color (#rgb or #rrggbb)
        #[arg(long, value_parser = parse_color)]
        color: Option<String>,
    },

    /// Edit a todo; omitted fields are left unchanged
    Edit {
        id: i64,

        #[arg(long, short)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,

        /// Show the todo on the calendar
        #[arg(long, conflicts_with = "no_calendar")]
        calendar: bool,

        /// Hide the todo from the calendar
        #[arg(long)]
        no_calendar: bool,

        /// Category id
        #[arg(long)]
        category: Option<i64>,

        /// Hex color (#rgb or #rrggbb)
        #[arg(long, value_parser = parse_color)]
        color: Option<String>,
    },

    /// Set progress in percent; values are clamped to 0-100
    Progress {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Delete a todo
    Delete { id: i64 },
}

/// Diary actions.
#[derive(Debug, Subcommand)]
pub enum DiaryAction {
    /// List diary entries, newest first
    List {
        /// Only entries written for this day
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show one entry
    Show { id: i64 },

    /// Write an entry
    New {
        #[arg(long, short)]
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        /// When the entry is for (default: now)
        #[arg(long, value_parser = parse_due)]
        date: Option<NaiveDateTime>,

        /// Link an event (repeatable)
        #[arg(long = "event", value_name = "ID")]
        events: Vec<i64>,

        /// Link a todo (repeatable)
        #[arg(long = "todo", value_name = "ID")]
        todos: Vec<i64>,
    },

    /// Edit an entry
    ///
    /// Links are replaced when --event, --todo or --unlink is given and
    /// kept otherwise.
    Edit {
        id: i64,

        #[arg(long, short)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long, value_parser = parse_due)]
        date: Option<NaiveDateTime>,

        /// Link an event (repeatable)
        #[arg(long = "event", value_name = "ID")]
        events: Vec<i64>,

        /// Link a todo (repeatable)
        #[arg(long = "todo", value_name = "ID")]
        todos: Vec<i64>,

        /// Remove every link
        #[arg(long, conflicts_with_all = ["events", "todos"])]
        unlink: bool,
    },

    /// Delete an entry
    Delete { id: i64 },
}

/// Collapses an on/off flag pair into an optional setting.
pub fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Category actions.
#[derive(Debug, Subcommand)]
pub enum CategoryAction {
    /// List categories with their visibility
    List,
    /// Hide a category's events and todos from the calendar
    Hide { id: i64 },
    /// Show a hidden category again
    Show { id: i64 },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex"));

/// Returns true for `#rgb` and `#rrggbb` colors.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Parses a hex color argument.
pub fn parse_color(value: &str) -> Result<String, String> {
    if is_hex_color(value) {
        Ok(value.to_lowercase())
    } else {
        Err(format!("expected #rgb or #rrggbb, got {value:?}"))
    }
}

/// Parses a date argument relative to the local clock.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_date_from(value, Local::now().date_naive())
}

fn parse_date_from(value: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    match value.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| "date out of range".to_string()),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| "date out of range".to_string()),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|e| format!("expected YYYY-MM-DD, got {value:?}: {e}")),
    }
}

/// Parses a due date: a date-time, or a bare date read as midnight.
pub fn parse_due(value: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(value).or_else(|_| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(|d| d.and_time(NaiveTime::MIN))
            .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM, got {value:?}"))
    })
}

/// Parses a date-time argument.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn relative_dates() {
        let today = date(2024, 3, 10);
        assert_eq!(parse_date_from("today", today).unwrap(), today);
        assert_eq!(parse_date_from("Tomorrow", today).unwrap(), date(2024, 3, 11));
        assert_eq!(parse_date_from("yesterday", today).unwrap(), date(2024, 3, 9));
        assert_eq!(parse_date_from("2024-02-29", today).unwrap(), date(2024, 2, 29));
        assert!(parse_date_from("2023-02-29", today).is_err());
        assert!(parse_date_from("next week", today).is_err());
    }

    #[test]
    fn datetimes() {
        let expected = date(2024, 3, 10).and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-10T09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-10 09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-10T09:30:00").unwrap(), expected);
        assert!(parse_datetime("09:30").is_err());
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color("#3174AD").unwrap(), "#3174ad");
        assert!(parse_color("#fff").is_ok());
        assert!(parse_color("3174ad").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("red").is_err());
    }

    #[test]
    fn parse_event_new_range() {
        let cli = Cli::try_parse_from([
            "daylog", "event", "new", "--from", "2024-03-10", "--to", "2024-03-12", "-t", "Trip",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Event {
                action: EventAction::New {
                    from, to, title, ..
                },
            }) => {
                assert_eq!(from, Some(date(2024, 3, 10)));
                assert_eq!(to, Some(date(2024, 3, 12)));
                assert_eq!(title, "Trip");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn event_new_rejects_mixed_modes() {
        let result = Cli::try_parse_from([
            "daylog",
            "event",
            "new",
            "--date",
            "2024-03-10",
            "--start",
            "2024-03-10T09:00",
            "--end",
            "2024-03-10T10:00",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["daylog", "event", "new", "--from", "2024-03-10"]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_progress_is_accepted() {
        let cli = Cli::try_parse_from(["daylog", "todo", "progress", "3", "-20"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Todo {
                action: TodoAction::Progress { id: 3, value: -20 }
            })
        ));
    }

    #[test]
    fn due_accepts_bare_dates() {
        assert_eq!(
            parse_due("2024-03-11").unwrap(),
            date(2024, 3, 11).and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_due("2024-03-11T17:00").unwrap(),
            date(2024, 3, 11).and_hms_opt(17, 0, 0).unwrap()
        );
        assert!(parse_due("tomorrow").is_err());
    }

    #[test]
    fn event_edit_modes_conflict() {
        let result = Cli::try_parse_from(["daylog", "event", "edit", "2", "--all-day", "--timed"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "daylog",
            "event",
            "edit",
            "2",
            "--end",
            "2024-03-11T08:00",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Event {
                action: EventAction::Edit { id, end, all_day, timed, .. },
            }) => {
                assert_eq!(id, 2);
                assert_eq!(end, Some(date(2024, 3, 11).and_hms_opt(8, 0, 0).unwrap()));
                assert_eq!(switch(all_day, timed), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn todo_new_calendar_requires_due() {
        let result = Cli::try_parse_from(["daylog", "todo", "new", "-t", "x", "--calendar"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from([
            "daylog", "todo", "new", "-t", "x", "--due", "2024-03-11", "--calendar",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn diary_links_repeat() {
        let cli = Cli::try_parse_from([
            "daylog", "diary", "new", "-t", "Retro", "--event", "2", "--event", "3", "--todo", "10",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Diary {
                action: DiaryAction::New { events, todos, .. },
            }) => {
                assert_eq!(events, vec![2, 3]);
                assert_eq!(todos, vec![10]);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let result = Cli::try_parse_from(["daylog", "diary", "edit", "1", "--unlink", "--todo", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn switch_pairs() {
        assert_eq!(switch(true, false), Some(true));
        assert_eq!(switch(false, true), Some(false));
        assert_eq!(switch(false, false), None);
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["daylog", "day", "2024-03-10", "--json"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }
}
