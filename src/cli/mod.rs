mod commands;
mod handlers;

pub use commands::{
    AccountAction, AccountCommand, Cli, Commands, FileAction, FileCommand, IdeaAction,
    IdeaCommand, IdeaFields, UserAction, UserCommand,
};
pub use handlers::{
    handle_account_add, handle_back, handle_bookmark, handle_comment, handle_file_get,
    handle_file_put, handle_file_rm, handle_idea_add, handle_idea_advance, handle_idea_delete,
    handle_idea_explain, handle_idea_list, handle_idea_show, handle_idea_update, handle_init,
    handle_user_add, handle_vet,
};
