//! daylog CLI entry point.

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use daylog_core::{TracingConfig, init_tracing};

use daylog_client::cli::{
    CategoryAction, Cli, Command, ConfigAction, DiaryAction, EventAction, TodoAction, switch,
};
use daylog_client::commands::diary::{DiaryEdit, NewDiary};
use daylog_client::commands::event::{EventEdit, NewEvent};
use daylog_client::commands::todo::TodoFields;
use daylog_client::commands::{self, Context};
use daylog_client::config::ClientConfig;
use daylog_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<String> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    init_tracing(TracingConfig::cli(cli.debug || config.debug))?;

    // Config commands never touch a backend.
    if let Some(Command::Config { ref action }) = cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => Ok(commands::config::path(&config_path)),
        };
    }

    let ctx = Context::from_config(&config, &cli)?;
    match cli.command {
        None => commands::day::day(&ctx, Local::now().date_naive()).await,
        Some(Command::Day { date }) => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            commands::day::day(&ctx, date).await
        }
        Some(Command::Show { id }) => commands::day::show(&ctx, id).await,
        Some(Command::Event { action }) => match action {
            EventAction::New {
                date,
                from,
                to,
                start,
                end,
                title,
                description,
                category,
                color,
            } => {
                let args = NewEvent {
                    date,
                    from,
                    to,
                    start,
                    end,
                    title,
                    description,
                    category,
                    color,
                };
                commands::event::create(&ctx, &args).await
            }
            EventAction::Edit {
                id,
                title,
                description,
                start,
                end,
                all_day,
                timed,
                category,
                color,
            } => {
                let args = EventEdit {
                    title,
                    description,
                    start,
                    end,
                    all_day: switch(all_day, timed),
                    category,
                    color,
                };
                commands::event::edit(&ctx, id, &args).await
            }
            EventAction::Delete { id } => commands::event::delete(&ctx, id).await,
        },
        Some(Command::Todo { action }) => match action {
            TodoAction::New {
                title,
                description,
                due,
                calendar,
                category,
                color,
            } => {
                let fields = TodoFields {
                    title: Some(title),
                    description,
                    due,
                    show_in_calendar: Some(calendar),
                    category,
                    color,
                };
                commands::todo::create(&ctx, &fields).await
            }
            TodoAction::Edit {
                id,
                title,
                description,
                due,
                calendar,
                no_calendar,
                category,
                color,
            } => {
                let fields = TodoFields {
                    title,
                    description,
                    due,
                    show_in_calendar: switch(calendar, no_calendar),
                    category,
                    color,
                };
                commands::todo::edit(&ctx, id, &fields).await
            }
            TodoAction::Progress { id, value } => commands::todo::progress(&ctx, id, value).await,
            TodoAction::Delete { id } => commands::todo::delete(&ctx, id).await,
        },
        Some(Command::Todos) => commands::todo::list(&ctx).await,
        Some(Command::Diary { action }) => match action {
            DiaryAction::List { date } => commands::diary::list(&ctx, date).await,
            DiaryAction::Show { id } => commands::diary::show(&ctx, id).await,
            DiaryAction::New {
                title,
                content,
                date,
                events,
                todos,
            } => {
                let args = NewDiary {
                    title,
                    content,
                    date,
                    events,
                    todos,
                };
                commands::diary::create(&ctx, &args).await
            }
            DiaryAction::Edit {
                id,
                title,
                content,
                date,
                events,
                todos,
                unlink,
            } => {
                let args = DiaryEdit {
                    title,
                    content,
                    date,
                    events,
                    todos,
                    unlink,
                };
                commands::diary::edit(&ctx, id, &args).await
            }
            DiaryAction::Delete { id } => commands::diary::delete(&ctx, id).await,
        },
        Some(Command::Category { action }) => match action {
            CategoryAction::List => commands::category::list(&ctx).await,
            CategoryAction::Hide { id } => commands::category::set_visible(&ctx, id, false).await,
            CategoryAction::Show { id } => commands::category::set_visible(&ctx, id, true).await,
        },
        Some(Command::Config { .. }) => Ok(String::new()),
    }
}
