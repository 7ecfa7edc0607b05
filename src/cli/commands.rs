use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ideabox")]
#[command(version, about = "Submit, vet, back and ship ideas")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter (e.g. "info", "ideabox=debug"). Overrides IDEABOX_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new ideabox project in the current directory
    Init,

    /// Manage accounts
    Account(AccountCommand),

    /// Manage users
    User(UserCommand),

    /// Work with ideas
    Idea(IdeaCommand),

    /// Vet a submitted idea
    Vet {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Acting user
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Back (vote for) a vetted idea
    Back {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Acting user
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Comment on an idea
    Comment {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Comment text
        body: String,

        /// Acting user
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Reply to an existing comment
        #[arg(long, value_name = "COMMENT_ID")]
        reply_to: Option<String>,
    },

    /// Bookmark an idea to follow it
    Bookmark {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Acting user
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Remove the bookmark instead
        #[arg(long)]
        remove: bool,
    },

    /// Store and fetch files
    File(FileCommand),
}

#[derive(Args, Debug)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub action: AccountAction,
}

#[derive(Subcommand, Debug)]
pub enum AccountAction {
    /// Add an account
    Add {
        /// Account name
        name: String,

        /// Allowed idea category (can be specified multiple times)
        #[arg(long = "category", short = 'c')]
        categories: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Add a user to an account
    Add {
        /// User name (unique)
        name: String,

        /// Account name or ID
        #[arg(long)]
        account: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct IdeaCommand {
    #[command(subcommand)]
    pub action: IdeaAction,
}

/// Editable idea fields shared by `idea add` and `idea update`.
#[derive(Args, Debug, Default)]
pub struct IdeaFields {
    /// What problem this solves
    #[arg(long)]
    pub problem: Option<String>,

    /// Proposed solution
    #[arg(long)]
    pub solution: Option<String>,

    /// How success will be measured
    #[arg(long)]
    pub metrics: Option<String>,

    /// Idea kind (feature, chore, bug)
    #[arg(long)]
    pub kind: Option<String>,

    /// Category ("none" clears it)
    #[arg(long)]
    pub category: Option<String>,

    /// Design size estimate, 1-4 ("none" clears it)
    #[arg(long)]
    pub design_size: Option<String>,

    /// Development size estimate, 1-4 ("none" clears it)
    #[arg(long)]
    pub development_size: Option<String>,

    /// Rating
    #[arg(long, allow_negative_numbers = true)]
    pub rating: Option<i64>,

    /// Deadline as YYYY-MM-DD ("none" clears it)
    #[arg(long)]
    pub deadline: Option<String>,

    /// Product manager user ("none" clears it)
    #[arg(long)]
    pub product_manager: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum IdeaAction {
    /// Submit a new idea
    Add {
        /// Idea title
        title: String,

        /// Acting user (becomes the author)
        #[arg(long = "as", value_name = "USER")]
        user: String,

        #[command(flatten)]
        fields: IdeaFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List ideas visible to a user
    List {
        /// Query words, e.g. "votable order:size filter:backed category:UX"
        query: Vec<String>,

        /// Acting user
        #[arg(long = "as", value_name = "USER")]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one idea in detail
    Show {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an idea's fields
    Update {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: IdeaFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move an idea one step along its lifecycle
    Advance {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Event: vet, vote, pick, design, approve, implement, sign_off, go_live
        event: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Explain why the action leading to a state is unavailable
    Explain {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Target state of the action
        state: String,
    },

    /// Delete an idea
    Delete {
        /// Idea ID (full UUID or unique prefix)
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct FileCommand {
    #[command(subcommand)]
    pub action: FileAction,
}

#[derive(Subcommand, Debug)]
pub enum FileAction {
    /// Store a file, optionally attaching it to an idea
    Put {
        /// File to store
        path: PathBuf,

        /// Attach to this idea
        #[arg(long)]
        idea: Option<String>,
    },

    /// Write a stored file to disk or stdout
    Get {
        /// Stored file ID
        id: String,

        /// Output path (stdout if omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Delete a stored file
    Rm {
        /// Stored file ID
        id: String,
    },
}
