use clap::{Args, Parser, Subcommand};
use dialoguer::Input;
use tracing_subscriber::EnvFilter;

use homebit_inbox::api::{ApiClient, ApiError, InboxSession};
use homebit_inbox::auth::AuthStore;
use homebit_inbox::config::Config;
use homebit_inbox::launcher::{self, LaunchError, LIST_PAGE_LIMIT};
use homebit_inbox::output::{self, ConversationListOutput, ResolutionOutput, RouteOutput};
use homebit_inbox::{extract_conversations, inbox_link, inbox_route, StartConversationPayload};

#[derive(Parser)]
#[command(
    name = "inbox",
    version,
    about = "Homebit inbox conversation launcher",
    after_help = "Examples:\n  inbox auth login\n  inbox conversations start --household-user-id u1 --househelp-user-id u2\n  inbox conversations start --household-user-id u1 --househelp-user-id u2 \\\n    --household-profile-id p1 --househelp-profile-id p2 --json\n  inbox conversations list --limit 20\n  inbox route --conversation-id 123e4567-e89b-12d3-a456-426614174000"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, help = "Output JSON instead of text")]
    json: bool,

    #[arg(long, global = true, help = "Compact JSON output (implies --json)")]
    compact: bool,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Store or clear the notifications service token")]
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    #[command(about = "Open or inspect household/househelp conversations")]
    Conversations {
        #[command(subcommand)]
        command: ConversationsCommand,
    },
    #[command(about = "Print the inbox route for a conversation")]
    Route(RouteArgs),
}

#[derive(Subcommand)]
enum AuthCommand {
    #[command(about = "Save a bearer token")]
    Login(AuthLoginArgs),
    #[command(about = "Clear the saved token")]
    Logout,
}

#[derive(Args)]
struct AuthLoginArgs {
    #[arg(long, help = "Bearer token (prompted when omitted)")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum ConversationsCommand {
    #[command(about = "Return the conversation for a pairing, creating it if none exists")]
    Start(StartArgs),
    #[command(about = "List conversations visible to the current token")]
    List(ListArgs),
}

#[derive(Args)]
struct StartArgs {
    #[arg(long, help = "Household user id")]
    household_user_id: String,

    #[arg(long, help = "Househelp user id")]
    househelp_user_id: String,

    #[arg(long, help = "Household profile id")]
    household_profile_id: Option<String>,

    #[arg(long, help = "Househelp profile id")]
    househelp_profile_id: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, help = "Maximum number of conversations to return")]
    limit: Option<u32>,

    #[arg(long, help = "Offset into the conversation list")]
    offset: Option<u32>,
}

#[derive(Args)]
struct RouteArgs {
    #[arg(long, help = "Conversation id")]
    conversation_id: Option<String>,
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(error) = run().await {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("INBOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();
    let auth_store = AuthStore::new(config.secrets_path.clone(), config.notifications_base_url.clone());
    let api = ApiClient::new(config.notifications_base_url.clone());
    let json = cli.json || cli.compact;
    let json_format = output::resolve_json_format(cli.compact);

    match cli.command {
        Command::Auth { command } => match command {
            AuthCommand::Login(args) => {
                let token = match args.token {
                    Some(token) => token,
                    None => Input::<String>::new().with_prompt("Token").interact_text()?,
                };
                auth_store.store_token(&token)?;
                println!("Token saved.");
            }
            AuthCommand::Logout => {
                auth_store.clear_token()?;
                println!("Logged out.");
            }
        },
        Command::Conversations { command } => match command {
            ConversationsCommand::Start(args) => {
                let token = require_token(&auth_store)?;
                let session = InboxSession::new(api, token);
                let pairing = StartConversationPayload {
                    household_user_id: args.household_user_id,
                    househelp_user_id: args.househelp_user_id,
                    household_profile_id: args.household_profile_id,
                    househelp_profile_id: args.househelp_profile_id,
                };

                let resolution = match launcher::resolve_conversation(&session, &pairing).await {
                    Ok(resolution) => resolution,
                    Err(LaunchError::StartFailed(error)) => {
                        return Err(request_failed(&auth_store, error, LaunchError::StartFailed));
                    }
                };

                let conversation_id = resolution.conversation_id();
                let output = ResolutionOutput {
                    route: inbox_route(conversation_id),
                    link: inbox_link(&config.app_base_url, conversation_id),
                    resolution,
                };
                output::print_resolution(&output, json, json_format)?;
            }
            ConversationsCommand::List(args) => {
                let token = require_token(&auth_store)?;
                let limit = args.limit.unwrap_or(LIST_PAGE_LIMIT);
                let offset = args.offset.unwrap_or(0);
                let raw = match api.list_conversations(&token, limit, offset).await {
                    Ok(raw) => raw,
                    Err(error) => return Err(request_failed(&auth_store, error, std::convert::identity)),
                };
                let output = ConversationListOutput {
                    items: extract_conversations(&raw),
                    raw,
                };
                output::print_conversations(&output, json, json_format)?;
            }
        },
        Command::Route(args) => {
            let conversation_id = args.conversation_id.as_deref();
            let output = RouteOutput {
                route: inbox_route(conversation_id),
                link: inbox_link(&config.app_base_url, conversation_id),
            };
            output::print_route(&output, json, json_format)?;
        }
    }
    Ok(())
}

// A 401 drops the saved token and asks for a fresh login; anything else is
// reported as `wrap(error)`.
fn request_failed<E>(
    auth_store: &AuthStore,
    error: ApiError,
    wrap: impl FnOnce(ApiError) -> E,
) -> Box<dyn std::error::Error>
where
    E: std::error::Error + 'static,
{
    match auth_store.forget_if_rejected(&error) {
        Ok(true) => SESSION_EXPIRED.into(),
        Ok(false) => Box::new(wrap(error)),
        Err(auth_error) => Box::new(auth_error),
    }
}

const SESSION_EXPIRED: &str = "Session expired. Run `inbox auth login` again.";

fn require_token(auth_store: &AuthStore) -> Result<String, Box<dyn std::error::Error>> {
    match auth_store.load_token()? {
        Some(token) => Ok(token),
        None => Err("No token found. Run `inbox auth login` first.".into()),
    }
}
