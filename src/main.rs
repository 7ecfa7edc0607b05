use clap::Parser;
use ideabox::cli::{
    handle_account_add, handle_back, handle_bookmark, handle_comment, handle_file_get,
    handle_file_put, handle_file_rm, handle_idea_add, handle_idea_advance, handle_idea_delete,
    handle_idea_explain, handle_idea_list, handle_idea_show, handle_idea_update, handle_init,
    handle_user_add, handle_vet, AccountAction, Cli, Commands, FileAction, IdeaAction, UserAction,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "IDEABOX_LOG";

fn init_tracing(level: Option<&str>) {
    let directive = level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok())
        .unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Account(cmd) => match cmd.action {
            AccountAction::Add {
                name,
                categories,
                json,
            } => handle_account_add(name, categories, json),
        },
        Commands::User(cmd) => match cmd.action {
            UserAction::Add {
                name,
                account,
                json,
            } => handle_user_add(name, account, json),
        },
        Commands::Idea(cmd) => match cmd.action {
            IdeaAction::Add {
                title,
                user,
                fields,
                json,
            } => handle_idea_add(title, user, fields, json),
            IdeaAction::List { query, user, json } => handle_idea_list(query, user, json),
            IdeaAction::Show { id, json } => handle_idea_show(id, json),
            IdeaAction::Update {
                id,
                title,
                fields,
                json,
            } => handle_idea_update(id, title, fields, json),
            IdeaAction::Advance { id, event, json } => handle_idea_advance(id, event, json),
            IdeaAction::Explain { id, state } => handle_idea_explain(id, state),
            IdeaAction::Delete { id, force } => handle_idea_delete(id, force),
        },
        Commands::Vet { id, user, json } => handle_vet(id, user, json),
        Commands::Back { id, user, json } => handle_back(id, user, json),
        Commands::Comment {
            id,
            body,
            user,
            reply_to,
        } => handle_comment(id, body, user, reply_to),
        Commands::Bookmark { id, user, remove } => handle_bookmark(id, user, remove),
        Commands::File(cmd) => match cmd.action {
            FileAction::Put { path, idea } => handle_file_put(path, idea),
            FileAction::Get { id, output } => handle_file_get(id, output),
            FileAction::Rm { id } => handle_file_rm(id),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
