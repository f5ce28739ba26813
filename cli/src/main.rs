mod args;
mod error;
mod render;
mod transport;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use users_core::view::DEFAULT_PAGE_SIZE;
use users_core::{
    Config, HttpRequest, ListController, ListStatus, Notice, NoticeKind, Outcome, PageQuery,
    UserFields, UserId, UsersClient,
};

use args::{Cli, Commands};
use error::{CliError, Result};
use transport::Transport;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli
        .base_url
        .clone()
        .map(Config::new)
        .unwrap_or_else(Config::from_env);
    tracing::debug!(base_url = %config.base_url, "resolved configuration");

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    let client = UsersClient::from_config(config);
    let transport = Transport::new();
    let mut out = io::stdout().lock();

    match command {
        Commands::List { page, limit, query } => {
            let mut controller =
                ListController::from_query(client, PageQuery::new(page, limit, query));
            let effect = controller.refresh();
            transport.drive(&mut controller, effect);
            if let ListStatus::Failed(err) = controller.status() {
                return Err(CliError::Api(err.clone()));
            }
            render::list(&mut out, &controller)?;
        }
        Commands::Get { id } => {
            let req = client.build_get_user(&UserId::new(id));
            let user = client.parse_get_user(transport.execute(req)?)?;
            render::record(&mut out, &user)?;
        }
        Commands::Create(fields) => {
            let req = client.build_create_user(&UserFields::from(fields))?;
            let user = client.parse_create_user(transport.execute(req)?)?;
            writeln!(out, "User created")?;
            if let Some(user) = user {
                render::record(&mut out, &user)?;
            }
        }
        Commands::Update { id, fields } => {
            let req = client.build_update_user(&UserId::new(id), &UserFields::from(fields))?;
            let user = client.parse_update_user(transport.execute(req)?)?;
            writeln!(out, "User updated")?;
            if let Some(user) = user {
                render::record(&mut out, &user)?;
            }
        }
        Commands::Delete { id, yes } => {
            if !yes && !confirm("Delete this user?")? {
                writeln!(out, "Cancelled")?;
                return Ok(());
            }
            let notice = delete_user(client, UserId::new(id), |req| transport.execute(req))?;
            render::notice(&mut out, &notice)?;
        }
    }
    Ok(())
}

/// Run the delete through the controller so the CLI reports the same notice
/// the list screen shows. Only the DELETE itself is executed; the list
/// re-query it asks for afterwards has nothing to refresh here.
fn delete_user(
    client: UsersClient,
    id: UserId,
    execute: impl FnOnce(HttpRequest) -> Outcome,
) -> Result<Notice> {
    let mut controller = ListController::new(client, DEFAULT_PAGE_SIZE);
    controller.request_delete(id);
    let effect = controller
        .confirm_delete()
        .ok_or_else(|| CliError::Failed("delete was not started".to_string()))?;
    if controller.complete(effect.ticket, execute(effect.request)).is_some() {
        tracing::debug!("skipping list re-query after delete");
    }
    match controller.notice() {
        Some(notice) if notice.kind == NoticeKind::Failure => {
            Err(CliError::Failed(notice.message.clone()))
        }
        Some(notice) => Ok(notice.clone()),
        None => Err(CliError::Failed("delete finished without a result".to_string())),
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes"))
}
