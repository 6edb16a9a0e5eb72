use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use movieflix::config::ConfigError;
use movieflix::net::http::HttpApi;
use movieflix::net::types::{MovieDraft, MovieId, Role, UserId};
use movieflix::state::catalog::GENRES;
use movieflix::state::session::SessionStore;
use movieflix::state::storage::{FileStore, StorageError};
use movieflix::{App, ClientConfig, ClientError};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}", .0.notice())]
    Client(#[from] ClientError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("access denied for {path}; go to {target}")]
    Denied { path: String, target: &'static str },
}

impl CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Client(e) => e.error_code(),
            Self::Storage(_) => "E_STORAGE",
            Self::Config(_) => "E_CONFIG",
            Self::Render(_) => "E_RENDER",
            Self::Denied { .. } => "E_DENIED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Client(e) if e.retryable())
    }
}

#[derive(Parser, Debug)]
#[command(name = "movieflix", about = "MovieFlix catalog client")]
struct Cli {
    #[arg(long, env = "MOVIEFLIX_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "MOVIEFLIX_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    Logout,
    /// Show the stored session.
    Whoami,
    /// Check whether the session may open a screen path.
    Open {
        path: String,
    },
    Movies(MoviesCommand),
    Favorites(FavoritesCommand),
    Admin(AdminCommand),
    Mail(MailCommand),
}

#[derive(Args, Debug)]
struct MoviesCommand {
    #[command(subcommand)]
    command: MoviesSubcommand,
}

#[derive(Subcommand, Debug)]
enum MoviesSubcommand {
    List,
    Show { id: MovieId },
    Search { query: String },
    Genre { genre: String },
    Genres,
}

#[derive(Args, Debug)]
struct FavoritesCommand {
    #[command(subcommand)]
    command: FavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FavoritesSubcommand {
    List,
    Add { movie_id: MovieId },
    Remove { movie_id: MovieId },
    Toggle { movie_id: MovieId },
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Movie(AdminMovieCommand),
    User(AdminUserCommand),
    Favorites(AdminFavoritesCommand),
}

#[derive(Args, Debug)]
struct AdminFavoritesCommand {
    #[command(subcommand)]
    command: AdminFavoritesSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminFavoritesSubcommand {
    /// Read another user's favorites.
    List { user_id: UserId },
    Remove { user_id: UserId, movie_id: MovieId },
}

#[derive(Args, Debug)]
struct AdminMovieCommand {
    #[command(subcommand)]
    command: AdminMovieSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminMovieSubcommand {
    Create(DraftArgs),
    Update {
        id: MovieId,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: MovieId,
    },
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    year: i32,
    #[arg(long, default_value = "")]
    poster_url: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, default_value = "Action")]
    genre: String,
}

impl From<DraftArgs> for MovieDraft {
    fn from(args: DraftArgs) -> Self {
        Self {
            title: args.title,
            poster_url: args.poster_url,
            description: args.description,
            genre: args.genre,
            release_year: args.year,
        }
    }
}

#[derive(Args, Debug)]
struct AdminUserCommand {
    #[command(subcommand)]
    command: AdminUserSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminUserSubcommand {
    List,
    Show { id: UserId },
    SetRole { id: UserId, role: Role },
    Delete { id: UserId },
}

#[derive(Args, Debug)]
struct MailCommand {
    #[command(subcommand)]
    command: MailSubcommand,
}

#[derive(Subcommand, Debug)]
enum MailSubcommand {
    Send {
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

fn error_line(error: &CliError) -> String {
    let hint = if error.retryable() { " (try again later)" } else { "" };
    format!("error[{}]: {error}{hint}", error.error_code())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }

    let session = SessionStore::new(Arc::new(FileStore::open(&config.session_file)?));
    let api = Arc::new(HttpApi::new(&config, session.clone())?);
    let mut app = App::new(api, session);

    match cli.command {
        Command::Login { email, password } => {
            let landing = app.login(&email, &password).await?;
            eprintln!("logged in; landing on {landing}");
            print_json(&session_view(&app))
        }
        Command::Register { name, email, password } => {
            let id = app.register(&name, &email, &password).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::Logout => {
            app.logout();
            eprintln!("logged out");
            Ok(())
        }
        Command::Whoami => print_json(&session_view(&app)),
        Command::Open { path } => {
            let (route, decision) = app.navigate(&path);
            match decision.target() {
                None => {
                    println!("{route}");
                    Ok(())
                }
                Some(target) => Err(CliError::Denied { path, target }),
            }
        }
        Command::Movies(movies) => run_movies(&mut app, movies).await,
        Command::Favorites(favorites) => run_favorites(&mut app, favorites).await,
        Command::Admin(admin) => run_admin(&mut app, admin).await,
        Command::Mail(mail) => match mail.command {
            MailSubcommand::Send { to, subject, text } => {
                app.send_mail(&to, &subject, &text).await?;
                eprintln!("sent");
                Ok(())
            }
        },
    }
}

#[derive(Serialize)]
struct SessionView {
    authenticated: bool,
    user_id: Option<UserId>,
    role: Option<Role>,
}

fn session_view(app: &App<HttpApi>) -> SessionView {
    let session = app.session();
    SessionView { authenticated: session.is_authenticated(), user_id: session.authenticated_user(), role: session.role }
}

async fn run_movies(app: &mut App<HttpApi>, movies: MoviesCommand) -> Result<(), CliError> {
    match movies.command {
        MoviesSubcommand::List => {
            let listing = app.catalog_mut().refresh().await?.to_vec();
            print_json(&listing)
        }
        MoviesSubcommand::Show { id } => print_json(&app.catalog().movie(id).await?),
        MoviesSubcommand::Search { query } => {
            app.catalog_mut().refresh().await?;
            print_json(&app.catalog().search(&query))
        }
        MoviesSubcommand::Genre { genre } => print_json(&app.catalog().by_genre(&genre).await?),
        MoviesSubcommand::Genres => print_json(&GENRES),
    }
}

async fn run_favorites(app: &mut App<HttpApi>, favorites: FavoritesCommand) -> Result<(), CliError> {
    match favorites.command {
        FavoritesSubcommand::List => {
            let movies: Vec<_> = app.load_favorites().await?.into_iter().map(|entry| entry.movie).collect();
            print_json(&movies)
        }
        FavoritesSubcommand::Add { movie_id } => {
            app.restore().await?;
            let movie = app.add_favorite_by_id(movie_id).await?;
            eprintln!("added {}", movie.title);
            Ok(())
        }
        FavoritesSubcommand::Remove { movie_id } => {
            app.remove_favorite(movie_id).await?;
            eprintln!("removed {movie_id}");
            Ok(())
        }
        FavoritesSubcommand::Toggle { movie_id } => {
            app.restore().await?;
            let movie = app.catalog().movie(movie_id).await?;
            let now = app.toggle_favorite(movie).await?;
            eprintln!("{}", if now { "added" } else { "removed" });
            Ok(())
        }
    }
}

async fn run_admin(app: &mut App<HttpApi>, admin: AdminCommand) -> Result<(), CliError> {
    match admin.command {
        AdminSubcommand::Movie(movie) => match movie.command {
            AdminMovieSubcommand::Create(draft) => print_json(&app.create_movie(&draft.into()).await?),
            AdminMovieSubcommand::Update { id, draft } => print_json(&app.update_movie(id, &draft.into()).await?),
            AdminMovieSubcommand::Delete { id } => {
                app.delete_movie(id).await?;
                eprintln!("deleted movie {id}");
                Ok(())
            }
        },
        AdminSubcommand::User(user) => match user.command {
            AdminUserSubcommand::List => print_json(&app.list_users().await?),
            AdminUserSubcommand::Show { id } => print_json(&app.find_user(id).await?),
            AdminUserSubcommand::SetRole { id, role } => print_json(&app.set_user_role(id, role).await?),
            AdminUserSubcommand::Delete { id } => {
                app.delete_user(id).await?;
                eprintln!("deleted user {id}");
                Ok(())
            }
        },
        AdminSubcommand::Favorites(favorites) => match favorites.command {
            AdminFavoritesSubcommand::List { user_id } => print_json(&app.user_favorites(user_id).await?),
            AdminFavoritesSubcommand::Remove { user_id, movie_id } => {
                app.remove_user_favorite(user_id, movie_id).await?;
                eprintln!("removed {movie_id} from user {user_id}");
                Ok(())
            }
        },
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
