use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use blog_client::{
    CredentialStore, DeleteOutcome, FileCredentialStore, HomeController, HttpClient,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

mod logging;
mod settings;

use logging::init_logging;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "blog-cli", version, about = "Главная страница блога в терминале")]
struct Cli {
    /// Адрес API (по умолчанию BLOG_API_URL или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Файл с токеном доступа (по умолчанию BLOG_TOKEN_FILE или .blog_token).
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Показать список постов.
    Home {
        /// Фильтр по заголовку (без учёта регистра).
        #[arg(long)]
        search: Option<String>,
    },
    /// Удалить свой пост (требует токен).
    Delete {
        #[arg(long)]
        id: String,
        /// Фильтр по заголовку для вывода после удаления.
        #[arg(long)]
        search: Option<String>,
    },
    /// Выйти: удалить сохранённый токен.
    Logout,
    /// Сохранить токен, выданный сервисом авторизации.
    SetToken {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let server = normalize_server(cli.server.unwrap_or(settings.api_url));
    let session = Arc::new(FileCredentialStore::new(
        cli.token_file.unwrap_or(settings.token_file),
    ));
    debug!(%server, token_file = %session.path().display(), "starting");

    match cli.command {
        Command::SetToken { token } => {
            let token = parse_token_arg(&token)?;
            session.set(&token).context("не удалось сохранить токен")?;
            println!("Токен сохранён в {}", session.path().display());
        }
        Command::Home { search } => {
            let home = mount(server, settings.http_timeout, session).await?;
            apply_search(&home, search);
            print!("{}", home.view());
        }
        Command::Delete { id, search } => {
            let home = mount(server, settings.http_timeout, session).await?;
            apply_search(&home, search);
            match home.delete_post(&id).await {
                DeleteOutcome::Deleted => info!(post_id = %id, "post deleted"),
                outcome => debug!(post_id = %id, ?outcome, "post not deleted"),
            }
            print!("{}", home.view());
        }
        Command::Logout => {
            let home = mount(server, settings.http_timeout, session).await?;
            home.logout().context("не удалось удалить токен")?;
            print!("{}", home.view());
        }
    }

    Ok(())
}

async fn mount(
    server: String,
    timeout: Duration,
    session: Arc<FileCredentialStore>,
) -> Result<HomeController> {
    let api = HttpClient::with_timeout(server, timeout).context("не удалось создать HTTP-клиент")?;
    let home = HomeController::new(Arc::new(api), session);
    home.load().await;
    Ok(home)
}

fn apply_search(home: &HomeController, search: Option<String>) {
    if let Some(term) = search {
        home.search(term);
    }
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_arg(raw: &str) -> Result<String> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(anyhow!("токен не должен быть пустым"));
    }
    Ok(token.to_string())
}
