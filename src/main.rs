use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gitlab_oauth::{GitLabConfig, GitLabTools, OAuthError, ToolResult};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "gitlab-oauth",
    about = "Run GitLab OAuth tools and print their results as JSON."
)]
struct Cli {
    /// Append log output to this file instead of stderr.
    #[arg(long, global = true, env = "GITLAB_OAUTH_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the authorization URL for a state value.
    AuthorizeUrl {
        #[arg(long)]
        state: String,
        /// Also open the URL in the default browser.
        #[arg(long)]
        open: bool,
    },
    /// Exchange an authorization code for an access token.
    Exchange {
        #[arg(long)]
        code: String,
    },
    /// Fetch the profile of the token owner.
    User {
        #[arg(long, env = "GITLAB_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
    },
    /// List projects the token owner is a member of.
    Repos {
        #[arg(long, env = "GITLAB_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
    },
    /// Print the tool definitions.
    Tools,
    /// Call a tool by name with JSON arguments.
    Call {
        name: String,
        #[arg(default_value = "{}")]
        arguments: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, OAuthError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    tracing::info!("starting gitlab oauth tools");

    let ok = match cli.command {
        Command::Tools => {
            print_json(&GitLabTools::definitions())?;
            true
        }
        Command::AuthorizeUrl { state, open } => {
            let result = load_tools()?.get_authorization_url(&state);
            if let (true, ToolResult::Ok { data }) = (open, &result) {
                if let Err(err) = webbrowser::open(data) {
                    eprintln!("Failed to open browser automatically: {err}");
                }
            }
            report(&result)?
        }
        Command::Exchange { code } => {
            report(&load_tools()?.exchange_code_for_token(&code).await)?
        }
        Command::User { access_token } => {
            report(&load_tools()?.get_user_info(&access_token).await)?
        }
        Command::Repos { access_token } => {
            report(&load_tools()?.get_user_repos(&access_token).await)?
        }
        Command::Call { name, arguments } => {
            let arguments =
                serde_json::from_str(&arguments).map_err(|err| OAuthError::InvalidArguments {
                    tool: name.clone(),
                    message: err.to_string(),
                })?;
            report(&load_tools()?.call(&name, arguments).await)?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_tools() -> Result<GitLabTools, OAuthError> {
    GitLabTools::from_config(GitLabConfig::from_env()?)
}

fn report<T: Serialize>(result: &ToolResult<T>) -> Result<bool, OAuthError> {
    print_json(result)?;
    Ok(result.is_ok())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), OAuthError> {
    let output =
        serde_json::to_string_pretty(value).map_err(|err| OAuthError::InvalidResponse {
            message: err.to_string(),
            body: String::new(),
        })?;
    println!("{output}");
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<(), OAuthError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitlab_oauth=info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| OAuthError::InvalidConfig {
                    name: "GITLAB_OAUTH_LOG_FILE",
                    message: format!("{}: {err}", path.display()),
                })?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
