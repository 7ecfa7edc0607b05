use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::commands::IdeaFields;
use crate::entity::{
    Account, Comment, Idea, IdeaEvent, IdeaKind, IdeaSize, IdeaState, IdeaUpdate, SizeField,
    StoredFile, User,
};
use crate::error::{IdeaboxError, Result};
use crate::present::{kind_icon, view_icon, Catalog, Labels};
use crate::query::{parse_query, rating_density};
use crate::store::{ActivityCounts, IdeaStore, IDEABOX_DIR};

/// Find the project root by walking up to the nearest .ideabox/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(IDEABOX_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_store() -> Result<(IdeaStore, Catalog)> {
    let root = find_project_root();
    debug!(root = %root.display(), "opening project");
    let store = IdeaStore::open(&root)?;
    let catalog = store.config().catalog(store.dir())?;
    Ok((store, catalog))
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// `None` for an absent flag, `Some(None)` for "none", `Some(Some(v))` otherwise.
fn clearable<T>(
    raw: Option<String>,
    parse: impl FnOnce(&str) -> Result<T>,
) -> Result<Option<Option<T>>> {
    match raw.as_deref() {
        None => Ok(None),
        Some("none") => Ok(Some(None)),
        Some(value) => parse(value).map(|v| Some(Some(v))),
    }
}

fn parse_size(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<IdeaSize>().map(|s| s.ordinal() as i64))
        .map_err(|_| IdeaboxError::invalid("size", raw))
}

fn build_update(store: &IdeaStore, title: Option<String>, fields: IdeaFields) -> Result<IdeaUpdate> {
    Ok(IdeaUpdate {
        title,
        problem: fields.problem,
        solution: fields.solution,
        metrics: fields.metrics,
        kind: fields.kind.as_deref().map(str::parse::<IdeaKind>).transpose()?,
        category: clearable(fields.category, |c| Ok(c.to_string()))?,
        design_size: clearable(fields.design_size, parse_size)?,
        development_size: clearable(fields.development_size, parse_size)?,
        rating: fields.rating,
        deadline: clearable(fields.deadline, |d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| IdeaboxError::invalid("deadline", d))
        })?,
        product_manager_id: clearable(fields.product_manager, |u| {
            store.resolve_user(u).map(|user| user.id)
        })?,
    })
}

fn idea_line(labels: &Labels<'_>, idea: &Idea) -> String {
    let size = idea
        .size()
        .map(|s| labels.size_short(s))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {:<11}  {:>2}  {:>5}  {}",
        short_id(&idea.id),
        labels.state(idea.state()),
        size,
        idea.rating,
        idea.title
    )
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    let _store = IdeaStore::init(&root)?;
    println!("Initialized ideabox project in {}", root.display());
    Ok(())
}

pub fn handle_account_add(name: String, categories: Vec<String>, json: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let account = Account::new(name, categories);
    store.add_account(&account)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
    } else {
        println!("Created account {} ({})", account.name, short_id(&account.id));
    }
    Ok(())
}

pub fn handle_user_add(name: String, account: String, json: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let account = store.resolve_account(&account)?;
    let user = User::new(account.id, name);
    store.add_user(&user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("Created user {} in {}", user.name, account.name);
    }
    Ok(())
}

pub fn handle_idea_add(title: String, user: String, fields: IdeaFields, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let author = store.resolve_user(&user)?;
    let account = store.get_account(author.account_id)?;

    let mut idea = Idea::new(
        account.id,
        author.id,
        title,
        String::new(),
        String::new(),
        String::new(),
    );
    let update = build_update(&store, None, fields)?;
    let mut errors = idea.apply(update);
    errors.merge(idea.validate(&account.categories));
    errors.into_result()?;

    store.create_idea(&idea)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&idea)?);
    } else {
        println!(
            "Created idea {} - {} ({})",
            short_id(&idea.id),
            idea.title,
            Labels::new(&catalog).state(idea.state())
        );
    }
    Ok(())
}

pub fn handle_idea_list(query: Vec<String>, user: String, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let user = store.resolve_user(&user)?;

    let raw = query.join(" ");
    let mut parsed = parse_query(&raw)?;
    if !raw.split_whitespace().any(|t| t.starts_with("order:")) {
        parsed.order = store.config().default_order;
    }

    let ideas = store.list(&user, &parsed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ideas)?);
        return Ok(());
    }

    let labels = Labels::new(&catalog);
    let mut heading = format!("{} ({})", labels.filter(parsed.filter), parsed.worklist);
    if let Some(qualifier) = labels.category_qualifier(&parsed.category) {
        heading.push(' ');
        heading.push_str(&qualifier);
    }
    println!(
        "{} [{}] - {}",
        heading,
        view_icon(store.config().default_view),
        labels.order(parsed.order)
    );

    if ideas.is_empty() {
        println!("No ideas found.");
        return Ok(());
    }
    for idea in &ideas {
        println!("{}", idea_line(&labels, idea));
    }
    Ok(())
}

#[derive(Serialize)]
struct IdeaDetails<'a> {
    #[serde(flatten)]
    idea: &'a Idea,
    state_label: String,
    kind_label: String,
    kind_icon: &'static str,
    size_label: Option<String>,
    rating_density: i64,
    counts: ActivityCounts,
    participants: Vec<String>,
    comments: Vec<Comment>,
    unavailable_actions: Vec<(IdeaEvent, String)>,
}

pub fn handle_idea_show(id: String, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let labels = Labels::new(&catalog);
    let idea = store.resolve_idea(&id)?;

    let unavailable_actions = IdeaEvent::ALL
        .into_iter()
        .filter(|event| event.from_state() != idea.state())
        .map(|event| {
            (
                event,
                labels.unavailable_action_tooltip(&idea, event.to_state()),
            )
        })
        .collect();

    let details = IdeaDetails {
        idea: &idea,
        state_label: labels.state(idea.state()),
        kind_label: labels.kind(idea.kind),
        kind_icon: kind_icon(idea.kind),
        size_label: idea.size().map(|s| labels.size_long(s)),
        rating_density: rating_density(&idea),
        counts: store.activity_counts(idea.id)?,
        participants: store
            .participants(idea.id)?
            .into_iter()
            .map(|u| u.name)
            .collect(),
        comments: store.toplevel_comments(idea.id)?,
        unavailable_actions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("{} ({})", idea.title, idea.id);
    println!("  State:    {}", details.state_label);
    println!("  Kind:     {}", details.kind_label);
    if let Some(category) = &idea.category {
        println!("  Category: {}", category);
    }
    for (field, size) in [
        (SizeField::DesignSize, idea.design_size),
        (SizeField::DevelopmentSize, idea.development_size),
    ] {
        let value = size
            .map(|s| labels.size_long(s))
            .unwrap_or_else(|| "-".to_string());
        println!("  {}: {}", labels.size_field(field), value);
    }
    println!("  Rating:   {}", idea.rating);
    if let Some(deadline) = idea.deadline {
        println!("  Deadline: {}", deadline);
    }
    println!(
        "  Activity: {} vettings, {} backers, {} comments",
        details.counts.vettings, details.counts.votes, details.counts.comments
    );
    println!("  Participants: {}", details.participants.join(", "));
    println!();
    println!("Problem:\n  {}", idea.problem);
    println!("Solution:\n  {}", idea.solution);
    println!("Metrics:\n  {}", idea.metrics);
    Ok(())
}

pub fn handle_idea_update(
    id: String,
    title: Option<String>,
    fields: IdeaFields,
    json: bool,
) -> Result<()> {
    let (store, _) = open_store()?;
    let idea = store.resolve_idea(&id)?;
    let update = build_update(&store, title, fields)?;
    let idea = store.update_idea(idea.id, update, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&idea)?);
    } else {
        println!("Updated idea {} - {}", short_id(&idea.id), idea.title);
    }
    Ok(())
}

pub fn handle_idea_advance(id: String, event: String, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let event: IdeaEvent = event.parse()?;
    let idea = store.resolve_idea(&id)?;
    let idea = store.fire(idea.id, event, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&idea)?);
    } else {
        let labels = Labels::new(&catalog);
        println!(
            "Idea {} is now {}",
            short_id(&idea.id),
            labels.state(idea.state())
        );
    }
    Ok(())
}

pub fn handle_idea_explain(id: String, state: String) -> Result<()> {
    let (store, catalog) = open_store()?;
    let state: IdeaState = state.parse()?;
    let idea = store.resolve_idea(&id)?;
    println!(
        "{}",
        Labels::new(&catalog).unavailable_action_tooltip(&idea, state)
    );
    Ok(())
}

pub fn handle_idea_delete(id: String, force: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let idea = store.resolve_idea(&id)?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!("Delete idea {} - {}? [y/N] ", short_id(&idea.id), idea.title);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(IdeaboxError::NotAllowed(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    store.delete_idea(idea.id)?;
    println!("Deleted idea {} - {}", short_id(&idea.id), idea.title);
    Ok(())
}

pub fn handle_vet(id: String, user: String, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let user = store.resolve_user(&user)?;
    let idea = store.resolve_idea(&id)?;
    let idea = store.vet(idea.id, user.id, Utc::now())?;
    print_activity_result(&catalog, &idea, "Vetted", json)
}

pub fn handle_back(id: String, user: String, json: bool) -> Result<()> {
    let (store, catalog) = open_store()?;
    let user = store.resolve_user(&user)?;
    let idea = store.resolve_idea(&id)?;
    let idea = store.back(idea.id, user.id, Utc::now())?;
    print_activity_result(&catalog, &idea, "Backed", json)
}

fn print_activity_result(catalog: &Catalog, idea: &Idea, verb: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(idea)?);
    } else {
        println!(
            "{} idea {} ({})",
            verb,
            short_id(&idea.id),
            Labels::new(catalog).state(idea.state())
        );
    }
    Ok(())
}

pub fn handle_comment(
    id: String,
    body: String,
    user: String,
    reply_to: Option<String>,
) -> Result<()> {
    let (store, _) = open_store()?;
    let author = store.resolve_user(&user)?;
    let idea = store.resolve_idea(&id)?;

    let mut comment = Comment::new(idea.id, author.id, body);
    if let Some(parent) = reply_to {
        let parent = Uuid::parse_str(&parent)
            .map_err(|_| IdeaboxError::invalid("comment id", &parent))?;
        comment = comment.reply_to(parent);
    }
    store.add_comment(&comment)?;
    println!("Added comment {} on {}", short_id(&comment.id), short_id(&idea.id));
    Ok(())
}

pub fn handle_bookmark(id: String, user: String, remove: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let user = store.resolve_user(&user)?;
    let idea = store.resolve_idea(&id)?;

    let changed = if remove {
        store.unbookmark(idea.id, user.id)?
    } else {
        store.bookmark(idea.id, user.id)?
    };
    let verb = match (remove, changed) {
        (false, true) => "Bookmarked",
        (false, false) => "Already bookmarked",
        (true, true) => "Removed bookmark on",
        (true, false) => "No bookmark on",
    };
    println!("{} {} - {}", verb, short_id(&idea.id), idea.title);
    Ok(())
}

pub fn handle_file_put(path: PathBuf, idea: Option<String>) -> Result<()> {
    let (store, _) = open_store()?;
    let bytes = fs::read(&path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file_id = match idea {
        Some(idea) => {
            let idea = store.resolve_idea(&idea)?;
            store.attach_file(idea.id, &name, bytes)?.stored_file_id
        }
        None => {
            let file = StoredFile::new(bytes).with_metadata("file_name", name);
            store.put_file(&file)?;
            file.id
        }
    };
    println!("{}", file_id);
    Ok(())
}

pub fn handle_file_get(id: String, output: Option<PathBuf>) -> Result<()> {
    let (store, _) = open_store()?;
    let id = Uuid::parse_str(&id).map_err(|_| IdeaboxError::invalid("file id", &id))?;
    let file = store.get_file(id, Utc::now())?;
    match output {
        Some(path) => fs::write(path, &file.blob)?,
        None => io::stdout().write_all(&file.blob)?,
    }
    Ok(())
}

pub fn handle_file_rm(id: String) -> Result<()> {
    let (store, _) = open_store()?;
    let id = Uuid::parse_str(&id).map_err(|_| IdeaboxError::invalid("file id", &id))?;
    store.delete_file(id)?;
    println!("Deleted file {}", id);
    Ok(())
}
