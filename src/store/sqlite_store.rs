use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{fmt_ts, parse_id, parse_ts};
use crate::config::Config;
use crate::entity::{
    Account, Comment, Idea, IdeaEvent, IdeaKind, IdeaSize, IdeaState, IdeaUpdate, User, Vetting,
    Vote,
};
use crate::error::{IdeaboxError, Result};
use crate::query::{CategoryFilter, IdeaFilter, IdeaQuery, Worklist};

pub const IDEABOX_DIR: &str = ".ideabox";
pub const IDEAS_DB: &str = "ideas.db";

const IDEA_COLUMNS: &str = "ideas.id, ideas.account_id, ideas.author_id, ideas.product_manager_id,
    ideas.title, ideas.problem, ideas.solution, ideas.metrics, ideas.kind, ideas.category,
    ideas.design_size, ideas.development_size, ideas.rating, ideas.state,
    ideas.created_at, ideas.updated_at, ideas.active_at, ideas.deadline";

const USER_COLUMNS: &str = "users.id, users.account_id, users.name, users.created_at";

/// SQLite-backed store for accounts, users, ideas and their activity.
pub struct IdeaStore {
    pub(super) conn: Connection,
    dir: PathBuf,
    config: Config,
}

/// How much activity an idea has gathered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub vettings: usize,
    pub votes: usize,
    pub comments: usize,
    pub bookmarks: usize,
}

impl IdeaStore {
    /// Initialize a new ideabox project under `root`.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(IDEABOX_DIR);
        if dir.exists() {
            return Err(IdeaboxError::AlreadyInitialized);
        }
        fs::create_dir_all(&dir)?;
        Config::default().save(&dir)?;
        info!(dir = %dir.display(), "initialized ideabox project");
        Self::open_dir(dir)
    }

    /// Open an existing project under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(IDEABOX_DIR);
        if !dir.join(IDEAS_DB).exists() {
            return Err(IdeaboxError::NotInitialized);
        }
        Self::open_dir(dir)
    }

    fn open_dir(dir: PathBuf) -> Result<Self> {
        let conn = Connection::open(dir.join(IDEAS_DB))?;
        let config = Config::load(&dir)?;
        let store = Self { conn, dir, config };
        store.init_schema()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                categories TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL REFERENCES accounts(id),
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ideas (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL REFERENCES accounts(id),
                author_id TEXT NOT NULL REFERENCES users(id),
                product_manager_id TEXT REFERENCES users(id),
                title TEXT NOT NULL,
                problem TEXT NOT NULL,
                solution TEXT NOT NULL,
                metrics TEXT NOT NULL,
                kind TEXT NOT NULL,
                category TEXT,
                design_size INTEGER CHECK (design_size BETWEEN 1 AND 4),
                development_size INTEGER CHECK (development_size BETWEEN 1 AND 4),
                rating INTEGER NOT NULL DEFAULT 0,
                state TEXT NOT NULL,
                state_rank INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                active_at TEXT NOT NULL,
                deadline TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_ideas_account_state ON ideas(account_id, state_rank);

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                idea_id TEXT NOT NULL,
                author_id TEXT NOT NULL REFERENCES users(id),
                parent_id TEXT,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_idea ON comments(idea_id);

            CREATE TABLE IF NOT EXISTS vettings (
                id TEXT PRIMARY KEY,
                idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                UNIQUE (idea_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS votes (
                id TEXT PRIMARY KEY,
                idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                UNIQUE (idea_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS bookmarks (
                idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                PRIMARY KEY (idea_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS stored_files (
                id TEXT PRIMARY KEY,
                blob BLOB NOT NULL,
                metadata TEXT NOT NULL,
                accessed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS attachments (
                id TEXT PRIMARY KEY,
                idea_id TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
                stored_file_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    // Accounts and users

    pub fn add_account(&self, account: &Account) -> Result<()> {
        self.conn.execute(
            "INSERT INTO accounts (id, name, categories, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                account.id.to_string(),
                account.name,
                serde_json::to_string(&account.categories)?,
                fmt_ts(&account.created_at),
            ],
        )?;
        info!(account = %account.name, "added account");
        Ok(())
    }

    pub fn get_account(&self, id: Uuid) -> Result<Account> {
        self.find_account("id", &id.to_string())?
            .ok_or_else(|| IdeaboxError::not_found("Account", id))
    }

    /// Look an account up by name or full id.
    pub fn resolve_account(&self, key: &str) -> Result<Account> {
        match self.find_account("name", key)? {
            Some(account) => Ok(account),
            None => self
                .find_account("id", key)?
                .ok_or_else(|| IdeaboxError::not_found("Account", key)),
        }
    }

    fn find_account(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, name, categories, created_at FROM accounts WHERE {} = ?1",
                    column
                ),
                [value],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, categories, created_at)| {
            Ok(Account {
                id: parse_id(&id)?,
                name,
                categories: serde_json::from_str(&categories)?,
                created_at: parse_ts(&created_at)?,
            })
        })
        .transpose()
    }

    pub fn add_user(&self, user: &User) -> Result<()> {
        self.get_account(user.account_id)?;
        self.conn.execute(
            "INSERT INTO users (id, account_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.account_id.to_string(),
                user.name,
                fmt_ts(&user.created_at),
            ],
        )?;
        info!(user = %user.name, "added user");
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        load_user(&self.conn, id)
    }

    /// Look a user up by name or full id.
    pub fn resolve_user(&self, key: &str) -> Result<User> {
        let by_name = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE name = ?1", USER_COLUMNS),
                [key],
                UserRow::from_row,
            )
            .optional()?;
        match by_name {
            Some(row) => row.into_user(),
            None => match Uuid::parse_str(key) {
                Ok(id) => self.get_user(id),
                Err(_) => Err(IdeaboxError::not_found("User", key)),
            },
        }
    }

    // Ideas

    /// Validate and insert a new idea.
    pub fn create_idea(&self, idea: &Idea) -> Result<()> {
        let account = self.get_account(idea.account_id)?;
        let mut errors = idea.validate(&account.categories);
        self.check_member(&mut errors, "author", Some(idea.author_id), account.id)?;
        self.check_member(&mut errors, "product_manager", idea.product_manager_id, account.id)?;
        errors.into_result()?;

        self.conn.execute(
            &format!(
                "INSERT INTO ideas ({}, state_rank) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                IDEA_COLUMNS.replace("ideas.", "")
            ),
            params![
                idea.id.to_string(),
                idea.account_id.to_string(),
                idea.author_id.to_string(),
                idea.product_manager_id.map(|id| id.to_string()),
                idea.title,
                idea.problem,
                idea.solution,
                idea.metrics,
                idea.kind.to_string(),
                idea.category,
                idea.design_size.map(IdeaSize::ordinal),
                idea.development_size.map(IdeaSize::ordinal),
                idea.rating,
                idea.state().to_string(),
                fmt_ts(&idea.created_at),
                fmt_ts(&idea.updated_at),
                fmt_ts(&idea.active_at),
                idea.deadline.map(|d| d.to_string()),
                idea.state().rank(),
            ],
        )?;
        info!(idea = %idea.id, title = %idea.title, "created idea");
        Ok(())
    }

    fn check_member(
        &self,
        errors: &mut crate::validation::ValidationErrors,
        field: &str,
        user_id: Option<Uuid>,
        account_id: Uuid,
    ) -> Result<()> {
        if let Some(id) = user_id {
            match self.get_user(id) {
                Ok(user) if user.account_id == account_id => {}
                Ok(_) => errors.add(field, "belongs to another account"),
                Err(IdeaboxError::NotFound { .. }) => errors.add(field, "must exist"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn get_idea(&self, id: Uuid) -> Result<Idea> {
        load_idea(&self.conn, id)
    }

    /// Find an idea by full id or unambiguous id prefix.
    pub fn resolve_idea(&self, key: &str) -> Result<Idea> {
        if let Ok(id) = Uuid::parse_str(key) {
            return self.get_idea(id);
        }
        let prefix = key.to_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(IdeaboxError::not_found("Idea", key));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id FROM ideas WHERE id LIKE ?1 || '%' LIMIT 2")?;
        let ids = stmt
            .query_map([&prefix], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match ids.as_slice() {
            [id] => self.get_idea(parse_id(id)?),
            [] => Err(IdeaboxError::not_found("Idea", key)),
            _ => Err(IdeaboxError::NotAllowed(format!(
                "id prefix '{}' matches more than one idea",
                key
            ))),
        }
    }

    /// Apply an update; nothing is written unless the result is valid.
    pub fn update_idea(&self, id: Uuid, update: IdeaUpdate, now: DateTime<Utc>) -> Result<Idea> {
        let mut idea = self.get_idea(id)?;
        let account = self.get_account(idea.account_id)?;

        let mut errors = idea.apply(update);
        errors.merge(idea.validate(&account.categories));
        self.check_member(&mut errors, "product_manager", idea.product_manager_id, account.id)?;
        errors.into_result()?;

        idea.touch(now);
        self.conn.execute(
            "UPDATE ideas SET product_manager_id = ?1, title = ?2, problem = ?3, solution = ?4,
                 metrics = ?5, kind = ?6, category = ?7, design_size = ?8, development_size = ?9,
                 rating = ?10, deadline = ?11, updated_at = ?12, active_at = MAX(active_at, ?13)
             WHERE id = ?14",
            params![
                idea.product_manager_id.map(|id| id.to_string()),
                idea.title,
                idea.problem,
                idea.solution,
                idea.metrics,
                idea.kind.to_string(),
                idea.category,
                idea.design_size.map(IdeaSize::ordinal),
                idea.development_size.map(IdeaSize::ordinal),
                idea.rating,
                idea.deadline.map(|d| d.to_string()),
                fmt_ts(&idea.updated_at),
                fmt_ts(&idea.active_at),
                idea.id.to_string(),
            ],
        )?;
        debug!(idea = %idea.id, "updated idea");
        self.get_idea(id)
    }

    /// Fire a lifecycle event against the stored idea.
    pub fn fire(&self, id: Uuid, event: IdeaEvent, now: DateTime<Utc>) -> Result<Idea> {
        let mut idea = self.get_idea(id)?;
        let from = idea.fire(event, now)?;

        let tx = self.conn.unchecked_transaction()?;
        advance_state(&tx, id, event)?;
        ping_idea(&tx, id, now)?;
        tx.commit()?;

        info!(idea = %id, %from, to = %idea.state(), "fired {}", event);
        self.get_idea(id)
    }

    /// Delete an idea with its vettings, votes, bookmarks and attachments.
    /// Comments stay behind.
    pub fn delete_idea(&self, id: Uuid) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM stored_files WHERE id IN
                 (SELECT stored_file_id FROM attachments WHERE idea_id = ?1)",
            [id.to_string()],
        )?;
        let deleted = tx.execute("DELETE FROM ideas WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(IdeaboxError::not_found("Idea", id));
        }
        tx.commit()?;
        info!(idea = %id, "deleted idea");
        Ok(())
    }

    // Activity

    /// Record a vetting. Once enough distinct users have vetted, the idea
    /// moves on to `vetted`.
    pub fn vet(&self, idea_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Idea> {
        let tx = self.conn.unchecked_transaction()?;
        let idea = load_idea(&tx, idea_id)?;
        let user = load_user(&tx, user_id)?;
        ensure_same_account(&idea, &user)?;

        if !Worklist::Vettable.admits(idea.state()) {
            return Err(IdeaboxError::InvalidTransition {
                event: IdeaEvent::Vet.to_string(),
                from: idea.state().to_string(),
            });
        }
        if has_row(&tx, "vettings", idea_id, user_id)? {
            return Err(IdeaboxError::NotAllowed(format!(
                "{} has already vetted this idea",
                user.name
            )));
        }

        let vetting = Vetting::new(idea_id, user_id);
        tx.execute(
            "INSERT INTO vettings (id, idea_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                vetting.id.to_string(),
                idea_id.to_string(),
                user_id.to_string(),
                fmt_ts(&now),
            ],
        )?;

        let vetters: u32 = tx.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM vettings WHERE idea_id = ?1",
            [idea_id.to_string()],
            |row| row.get(0),
        )?;
        if vetters >= self.config.vettings_required {
            advance_state(&tx, idea_id, IdeaEvent::Vet)?;
        }
        ping_idea(&tx, idea_id, now)?;
        tx.commit()?;

        info!(idea = %idea_id, user = %user.name, vetters, "vetted idea");
        self.get_idea(idea_id)
    }

    /// Record a backing. The first one moves a vetted idea to `voted`.
    pub fn back(&self, idea_id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<Idea> {
        let tx = self.conn.unchecked_transaction()?;
        let idea = load_idea(&tx, idea_id)?;
        let user = load_user(&tx, user_id)?;
        ensure_same_account(&idea, &user)?;

        if !Worklist::Votable.admits(idea.state()) {
            return Err(IdeaboxError::InvalidTransition {
                event: IdeaEvent::Vote.to_string(),
                from: idea.state().to_string(),
            });
        }
        if has_row(&tx, "votes", idea_id, user_id)? {
            return Err(IdeaboxError::NotAllowed(format!(
                "{} has already backed this idea",
                user.name
            )));
        }

        let vote = Vote::new(idea_id, user_id);
        tx.execute(
            "INSERT INTO votes (id, idea_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                vote.id.to_string(),
                idea_id.to_string(),
                user_id.to_string(),
                fmt_ts(&now),
            ],
        )?;
        if idea.state() == IdeaState::Vetted {
            advance_state(&tx, idea_id, IdeaEvent::Vote)?;
        }
        ping_idea(&tx, idea_id, now)?;
        tx.commit()?;

        info!(idea = %idea_id, user = %user.name, "backed idea");
        self.get_idea(idea_id)
    }

    pub fn add_comment(&self, comment: &Comment) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let idea = load_idea(&tx, comment.idea_id)?;
        let author = load_user(&tx, comment.author_id)?;
        ensure_same_account(&idea, &author)?;

        if comment.body.trim().is_empty() {
            let mut errors = crate::validation::ValidationErrors::new();
            errors.add("body", "can't be blank");
            return Err(IdeaboxError::Validation(errors));
        }
        if let Some(parent) = comment.parent_id {
            let parent_idea: Option<String> = tx
                .query_row(
                    "SELECT idea_id FROM comments WHERE id = ?1",
                    [parent.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            if parent_idea.as_deref() != Some(comment.idea_id.to_string().as_str()) {
                return Err(IdeaboxError::not_found("Comment", parent));
            }
        }

        tx.execute(
            "INSERT INTO comments (id, idea_id, author_id, parent_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                comment.id.to_string(),
                comment.idea_id.to_string(),
                comment.author_id.to_string(),
                comment.parent_id.map(|id| id.to_string()),
                comment.body,
                fmt_ts(&comment.created_at),
            ],
        )?;
        ping_idea(&tx, comment.idea_id, comment.created_at)?;
        tx.commit()?;

        debug!(idea = %comment.idea_id, comment = %comment.id, "added comment");
        Ok(())
    }

    pub fn comments(&self, idea_id: Uuid) -> Result<Vec<Comment>> {
        self.query_comments("WHERE idea_id = ?1", idea_id)
    }

    pub fn toplevel_comments(&self, idea_id: Uuid) -> Result<Vec<Comment>> {
        self.query_comments("WHERE idea_id = ?1 AND parent_id IS NULL", idea_id)
    }

    fn query_comments(&self, clause: &str, idea_id: Uuid) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, idea_id, author_id, parent_id, body, created_at FROM comments {}
             ORDER BY created_at ASC, rowid ASC",
            clause
        ))?;
        let rows = stmt
            .query_map([idea_id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, idea_id, author_id, parent_id, body, created_at)| {
                Ok(Comment {
                    id: parse_id(&id)?,
                    idea_id: parse_id(&idea_id)?,
                    author_id: parse_id(&author_id)?,
                    parent_id: parent_id.as_deref().map(parse_id).transpose()?,
                    body,
                    created_at: parse_ts(&created_at)?,
                })
            })
            .collect()
    }

    /// Bookmark an idea. Returns false if it was already bookmarked.
    pub fn bookmark(&self, idea_id: Uuid, user_id: Uuid) -> Result<bool> {
        let idea = self.get_idea(idea_id)?;
        let user = self.get_user(user_id)?;
        ensure_same_account(&idea, &user)?;
        let added = self.conn.execute(
            "INSERT OR IGNORE INTO bookmarks (idea_id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![idea_id.to_string(), user_id.to_string(), fmt_ts(&Utc::now())],
        )?;
        Ok(added > 0)
    }

    /// Remove a bookmark. Returns false if there was none.
    pub fn unbookmark(&self, idea_id: Uuid, user_id: Uuid) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM bookmarks WHERE idea_id = ?1 AND user_id = ?2",
            params![idea_id.to_string(), user_id.to_string()],
        )?;
        Ok(removed > 0)
    }

    pub fn activity_counts(&self, idea_id: Uuid) -> Result<ActivityCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE idea_id = ?1", table),
                [idea_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };
        Ok(ActivityCounts {
            vettings: count("vettings")?,
            votes: count("votes")?,
            comments: count("comments")?,
            bookmarks: count("bookmarks")?,
        })
    }

    // Related users

    pub fn commenters(&self, idea_id: Uuid) -> Result<Vec<User>> {
        self.users_where(
            "users.id IN (SELECT author_id FROM comments WHERE idea_id = ?1)",
            idea_id,
        )
    }

    pub fn vetters(&self, idea_id: Uuid) -> Result<Vec<User>> {
        self.users_where(
            "users.id IN (SELECT user_id FROM vettings WHERE idea_id = ?1)",
            idea_id,
        )
    }

    pub fn backers(&self, idea_id: Uuid) -> Result<Vec<User>> {
        self.users_where(
            "users.id IN (SELECT user_id FROM votes WHERE idea_id = ?1)",
            idea_id,
        )
    }

    pub fn bookmarkers(&self, idea_id: Uuid) -> Result<Vec<User>> {
        self.users_where(
            "users.id IN (SELECT user_id FROM bookmarks WHERE idea_id = ?1)",
            idea_id,
        )
    }

    /// Backers, vetters, commenters and the author, each listed once.
    pub fn participants(&self, idea_id: Uuid) -> Result<Vec<User>> {
        self.users_where(
            "users.id IN (
                 SELECT user_id FROM votes WHERE idea_id = ?1
                 UNION SELECT user_id FROM vettings WHERE idea_id = ?1
                 UNION SELECT author_id FROM comments WHERE idea_id = ?1
                 UNION SELECT author_id FROM ideas WHERE id = ?1
             )",
            idea_id,
        )
    }

    fn users_where(&self, condition: &str, idea_id: Uuid) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users WHERE {} ORDER BY users.name",
            USER_COLUMNS, condition
        ))?;
        let rows = stmt
            .query_map([idea_id.to_string()], UserRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    // Listing

    /// List the ideas of `user`'s account matching `query`, in its order.
    pub fn list(&self, user: &User, query: &IdeaQuery) -> Result<Vec<Idea>> {
        let mut args = vec![user.account_id.to_string()];
        // The user id is bound once, and only when some clause refers to it.
        let mut user_slot: Option<usize> = None;
        let mut user_param = |args: &mut Vec<String>| -> usize {
            *user_slot.get_or_insert_with(|| {
                args.push(user.id.to_string());
                args.len()
            })
        };

        let ranks = query
            .worklist
            .states()
            .iter()
            .map(|s| s.rank().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT {} FROM ideas WHERE ideas.account_id = ?1 AND ideas.state_rank IN ({})",
            IDEA_COLUMNS, ranks
        );

        match query.worklist {
            Worklist::Followed => sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM bookmarks b WHERE b.idea_id = ideas.id AND b.user_id = ?{})",
                user_param(&mut args)
            )),
            Worklist::Managed => sql.push_str(&format!(
                " AND ideas.product_manager_id = ?{}",
                user_param(&mut args)
            )),
            _ => {}
        }

        match query.filter {
            IdeaFilter::All => {}
            IdeaFilter::Authored => sql.push_str(&format!(
                " AND ideas.author_id = ?{}",
                user_param(&mut args)
            )),
            IdeaFilter::Commented => sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM comments c WHERE c.idea_id = ideas.id AND c.author_id = ?{})",
                user_param(&mut args)
            )),
            IdeaFilter::Vetted => sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM vettings v WHERE v.idea_id = ideas.id AND v.user_id = ?{})",
                user_param(&mut args)
            )),
            IdeaFilter::Backed => sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM votes v WHERE v.idea_id = ideas.id AND v.user_id = ?{})",
                user_param(&mut args)
            )),
        }

        if query.not_vetted {
            sql.push_str(&format!(
                " AND NOT EXISTS (SELECT 1 FROM vettings v WHERE v.idea_id = ideas.id AND v.user_id = ?{})",
                user_param(&mut args)
            ));
        }

        match &query.category {
            CategoryFilter::All => {}
            CategoryFilter::None => sql.push_str(" AND ideas.category IS NULL"),
            CategoryFilter::Named(name) => {
                args.push(name.clone());
                sql.push_str(&format!(" AND ideas.category = ?{}", args.len()));
            }
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(query.order.sql());
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        debug!(%sql, "listing ideas");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), IdeaRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(IdeaRow::into_idea).collect()
    }
}

fn ensure_same_account(idea: &Idea, user: &User) -> Result<()> {
    if idea.account_id != user.account_id {
        return Err(IdeaboxError::NotAllowed(format!(
            "{} is not a member of this idea's account",
            user.name
        )));
    }
    Ok(())
}

fn has_row(conn: &Connection, table: &str, idea_id: Uuid, user_id: Uuid) -> Result<bool> {
    let found = conn
        .query_row(
            &format!(
                "SELECT 1 FROM {} WHERE idea_id = ?1 AND user_id = ?2",
                table
            ),
            params![idea_id.to_string(), user_id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Move the stored idea along `event`'s edge, only if it is still in the
/// event's source state.
fn advance_state(conn: &Connection, id: Uuid, event: IdeaEvent) -> Result<()> {
    let to = event.to_state();
    let changed = conn.execute(
        "UPDATE ideas SET state = ?1, state_rank = ?2 WHERE id = ?3 AND state = ?4",
        params![
            to.to_string(),
            to.rank(),
            id.to_string(),
            event.from_state().to_string()
        ],
    )?;
    if changed == 0 {
        let current = load_idea(conn, id)?.state();
        return Err(IdeaboxError::InvalidTransition {
            event: event.to_string(),
            from: current.to_string(),
        });
    }
    Ok(())
}

/// Single-statement activity bump: `active_at` only ever moves forward.
fn ping_idea(conn: &Connection, id: Uuid, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE ideas SET updated_at = ?1, active_at = MAX(active_at, ?1) WHERE id = ?2",
        params![fmt_ts(&now), id.to_string()],
    )?;
    Ok(())
}

fn load_idea(conn: &Connection, id: Uuid) -> Result<Idea> {
    conn.query_row(
        &format!("SELECT {} FROM ideas WHERE ideas.id = ?1", IDEA_COLUMNS),
        [id.to_string()],
        IdeaRow::from_row,
    )
    .optional()?
    .ok_or_else(|| IdeaboxError::not_found("Idea", id))?
    .into_idea()
}

fn load_user(conn: &Connection, id: Uuid) -> Result<User> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE users.id = ?1", USER_COLUMNS),
        [id.to_string()],
        UserRow::from_row,
    )
    .optional()?
    .ok_or_else(|| IdeaboxError::not_found("User", id))?
    .into_user()
}

/// Raw `ideas` row, converted outside the rusqlite closure so parse errors
/// surface as our own error type.
struct IdeaRow {
    id: String,
    account_id: String,
    author_id: String,
    product_manager_id: Option<String>,
    title: String,
    problem: String,
    solution: String,
    metrics: String,
    kind: String,
    category: Option<String>,
    design_size: Option<i64>,
    development_size: Option<i64>,
    rating: i64,
    state: String,
    created_at: String,
    updated_at: String,
    active_at: String,
    deadline: Option<String>,
}

impl IdeaRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            author_id: row.get(2)?,
            product_manager_id: row.get(3)?,
            title: row.get(4)?,
            problem: row.get(5)?,
            solution: row.get(6)?,
            metrics: row.get(7)?,
            kind: row.get(8)?,
            category: row.get(9)?,
            design_size: row.get(10)?,
            development_size: row.get(11)?,
            rating: row.get(12)?,
            state: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
            active_at: row.get(16)?,
            deadline: row.get(17)?,
        })
    }

    fn into_idea(self) -> Result<Idea> {
        let corrupt = |what: &str, value: &str| {
            IdeaboxError::Storage(format!("Bad {} in database: {}", what, value))
        };
        let state: IdeaState = self
            .state
            .parse()
            .map_err(|_| corrupt("state", &self.state))?;
        let kind: IdeaKind = self.kind.parse().map_err(|_| corrupt("kind", &self.kind))?;
        let size = |raw: Option<i64>| {
            raw.map(|v| IdeaSize::from_ordinal(v).map_err(|_| corrupt("size", &v.to_string())))
                .transpose()
        };

        let mut idea = Idea::new(
            parse_id(&self.account_id)?,
            parse_id(&self.author_id)?,
            self.title,
            self.problem,
            self.solution,
            self.metrics,
        )
        .with_state(state);
        idea.id = parse_id(&self.id)?;
        idea.product_manager_id = self.product_manager_id.as_deref().map(parse_id).transpose()?;
        idea.kind = kind;
        idea.category = self.category;
        idea.design_size = size(self.design_size)?;
        idea.development_size = size(self.development_size)?;
        idea.rating = self.rating;
        idea.created_at = parse_ts(&self.created_at)?;
        idea.updated_at = parse_ts(&self.updated_at)?;
        idea.active_at = parse_ts(&self.active_at)?;
        idea.deadline = self
            .deadline
            .as_deref()
            .map(|d| d.parse::<NaiveDate>().map_err(|_| corrupt("deadline", d)))
            .transpose()?;
        Ok(idea)
    }
}

struct UserRow {
    id: String,
    account_id: String,
    name: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id)?,
            account_id: parse_id(&self.account_id)?,
            name: self.name,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::IdeaOrder;
    use chrono::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        store: IdeaStore,
        account: Account,
        alice: User,
        bob: User,
    }

    fn setup() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let store = IdeaStore::init(tmp.path()).unwrap();
        let account = Account::new("Acme".to_string(), vec!["UX".to_string(), "Billing".to_string()]);
        store.add_account(&account).unwrap();
        let alice = User::new(account.id, "alice".to_string());
        let bob = User::new(account.id, "bob".to_string());
        store.add_user(&alice).unwrap();
        store.add_user(&bob).unwrap();
        Fixture {
            _tmp: tmp,
            store,
            account,
            alice,
            bob,
        }
    }

    fn new_idea(f: &Fixture, title: &str) -> Idea {
        let idea = Idea::new(
            f.account.id,
            f.alice.id,
            title.to_string(),
            "problem".to_string(),
            "solution".to_string(),
            "metrics".to_string(),
        );
        f.store.create_idea(&idea).unwrap();
        idea
    }

    fn sized(f: &Fixture, title: &str, rating: i64, sizes: Option<(i64, i64)>) -> Idea {
        let idea = new_idea(f, title);
        f.store
            .update_idea(
                idea.id,
                IdeaUpdate {
                    rating: Some(rating),
                    design_size: Some(sizes.map(|s| s.0)),
                    development_size: Some(sizes.map(|s| s.1)),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap()
    }

    fn titles(ideas: &[Idea]) -> Vec<&str> {
        ideas.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_init_creates_db_and_config() {
        let tmp = TempDir::new().unwrap();
        let _store = IdeaStore::init(tmp.path()).unwrap();
        assert!(tmp.path().join(".ideabox/ideas.db").exists());
        assert!(tmp.path().join(".ideabox/config.yaml").exists());
        assert!(matches!(
            IdeaStore::init(tmp.path()),
            Err(IdeaboxError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_requires_init() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            IdeaStore::open(tmp.path()),
            Err(IdeaboxError::NotInitialized)
        ));
    }

    #[test]
    fn test_create_and_get_idea() {
        let f = setup();
        let idea = new_idea(&f, "Dark mode");
        let loaded = f.store.get_idea(idea.id).unwrap();
        assert_eq!(loaded.title, "Dark mode");
        assert_eq!(loaded.state(), IdeaState::Submitted);
        assert_eq!(loaded.created_at, idea.created_at);
        assert_eq!(loaded.active_at, idea.active_at);

        let prefix = &idea.id.to_string()[..8];
        assert_eq!(f.store.resolve_idea(prefix).unwrap().id, idea.id);
    }

    #[test]
    fn test_create_rejects_invalid_idea() {
        let f = setup();
        let mut idea = Idea::new(
            f.account.id,
            f.alice.id,
            String::new(),
            "p".to_string(),
            "s".to_string(),
            "m".to_string(),
        );
        idea.category = Some("Marketing".to_string());
        match f.store.create_idea(&idea) {
            Err(IdeaboxError::Validation(errors)) => {
                assert_eq!(errors.on("title").len(), 1);
                assert_eq!(errors.on("category").len(), 1);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(matches!(
            f.store.get_idea(idea.id),
            Err(IdeaboxError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_rejects_out_of_range_rating() {
        let f = setup();
        let idea = sized(&f, "Hype", 1, Some((1, 1)));
        let result = f.store.update_idea(
            idea.id,
            IdeaUpdate {
                rating: Some(10_000_000_000_000_000),
                ..Default::default()
            },
            Utc::now(),
        );
        match result {
            Err(IdeaboxError::Validation(errors)) => {
                assert_eq!(errors.on("rating"), ["is out of range"])
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(f.store.get_idea(idea.id).unwrap().rating, 1);
    }

    #[test]
    fn test_deadline_round_trips() {
        let f = setup();
        let idea = new_idea(&f, "Launch");
        assert_eq!(f.store.get_idea(idea.id).unwrap().deadline, None);

        let due = chrono::NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        let updated = f
            .store
            .update_idea(
                idea.id,
                IdeaUpdate {
                    deadline: Some(Some(due)),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(updated.deadline, Some(due));
    }

    #[test]
    fn test_update_rejects_out_of_range_size() {
        let f = setup();
        let idea = new_idea(&f, "Export");
        let result = f.store.update_idea(
            idea.id,
            IdeaUpdate {
                design_size: Some(Some(9)),
                title: Some("Export to CSV".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(IdeaboxError::Validation(_))));
        // Nothing persisted.
        assert_eq!(f.store.get_idea(idea.id).unwrap().title, "Export");
    }

    #[test]
    fn test_product_manager_must_be_member() {
        let f = setup();
        let other = Account::new("Other".to_string(), vec![]);
        f.store.add_account(&other).unwrap();
        let outsider = User::new(other.id, "mallory".to_string());
        f.store.add_user(&outsider).unwrap();

        let idea = new_idea(&f, "Reports");
        let result = f.store.update_idea(
            idea.id,
            IdeaUpdate {
                product_manager_id: Some(Some(outsider.id)),
                ..Default::default()
            },
            Utc::now(),
        );
        match result {
            Err(IdeaboxError::Validation(errors)) => {
                assert_eq!(errors.on("product_manager").len(), 1)
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_fire_walks_pipeline_and_rejects_jumps() {
        let f = setup();
        let idea = new_idea(&f, "Search");
        let now = Utc::now();
        assert!(matches!(
            f.store.fire(idea.id, IdeaEvent::Approve, now),
            Err(IdeaboxError::InvalidTransition { .. })
        ));
        for event in IdeaEvent::ALL {
            let updated = f.store.fire(idea.id, event, now).unwrap();
            assert_eq!(updated.state(), event.to_state());
        }
        assert_eq!(f.store.get_idea(idea.id).unwrap().state(), IdeaState::Live);
    }

    #[test]
    fn test_vet_then_back() {
        let f = setup();
        let idea = new_idea(&f, "Webhooks");
        let t0 = Utc::now();

        assert!(matches!(
            f.store.back(idea.id, f.bob.id, t0),
            Err(IdeaboxError::InvalidTransition { .. })
        ));

        let vetted = f.store.vet(idea.id, f.bob.id, t0).unwrap();
        assert_eq!(vetted.state(), IdeaState::Vetted);
        assert!(matches!(
            f.store.vet(idea.id, f.alice.id, t0),
            Err(IdeaboxError::InvalidTransition { .. })
        ));

        let voted = f.store.back(idea.id, f.bob.id, t0).unwrap();
        assert_eq!(voted.state(), IdeaState::Voted);
        let again = f.store.back(idea.id, f.alice.id, t0).unwrap();
        assert_eq!(again.state(), IdeaState::Voted);
        assert!(matches!(
            f.store.back(idea.id, f.bob.id, t0),
            Err(IdeaboxError::NotAllowed(_))
        ));

        let counts = f.store.activity_counts(idea.id).unwrap();
        assert_eq!(counts.vettings, 1);
        assert_eq!(counts.votes, 2);
    }

    #[test]
    fn test_activity_bumps_active_at_but_never_rewinds() {
        let f = setup();
        let idea = new_idea(&f, "Notifications");
        let later = idea.active_at + Duration::hours(2);

        let mut comment = Comment::new(idea.id, f.bob.id, "Yes please".to_string());
        comment.created_at = later;
        f.store.add_comment(&comment).unwrap();
        let after_comment = f.store.get_idea(idea.id).unwrap();
        assert_eq!(after_comment.active_at, later);
        assert!(after_comment.active_at >= after_comment.updated_at);

        // An activity stamped earlier leaves active_at where it was.
        let mut late_comment = Comment::new(idea.id, f.alice.id, "Old news".to_string());
        late_comment.created_at = idea.active_at;
        f.store.add_comment(&late_comment).unwrap();
        assert_eq!(f.store.get_idea(idea.id).unwrap().active_at, later);
    }

    #[test]
    fn test_comments_and_threads() {
        let f = setup();
        let idea = new_idea(&f, "Threads");
        let top = Comment::new(idea.id, f.bob.id, "Top".to_string());
        f.store.add_comment(&top).unwrap();
        let reply = Comment::new(idea.id, f.alice.id, "Reply".to_string()).reply_to(top.id);
        f.store.add_comment(&reply).unwrap();

        assert_eq!(f.store.comments(idea.id).unwrap().len(), 2);
        let toplevel = f.store.toplevel_comments(idea.id).unwrap();
        assert_eq!(toplevel.len(), 1);
        assert_eq!(toplevel[0].id, top.id);

        let stray = Comment::new(idea.id, f.bob.id, "?".to_string()).reply_to(Uuid::new_v4());
        assert!(f.store.add_comment(&stray).is_err());
        let blank = Comment::new(idea.id, f.bob.id, "  ".to_string());
        assert!(matches!(
            f.store.add_comment(&blank),
            Err(IdeaboxError::Validation(_))
        ));
    }

    #[test]
    fn test_participants_are_deduplicated() {
        let f = setup();
        let carol = User::new(f.account.id, "carol".to_string());
        f.store.add_user(&carol).unwrap();
        let idea = new_idea(&f, "Audit log");
        let now = Utc::now();

        f.store.vet(idea.id, f.bob.id, now).unwrap();
        f.store.back(idea.id, f.bob.id, now).unwrap();
        f.store
            .add_comment(&Comment::new(idea.id, f.bob.id, "+1".to_string()))
            .unwrap();
        f.store
            .add_comment(&Comment::new(idea.id, f.alice.id, "thanks".to_string()))
            .unwrap();
        f.store.bookmark(idea.id, carol.id).unwrap();

        let names = |users: Vec<User>| users.into_iter().map(|u| u.name).collect::<Vec<_>>();
        assert_eq!(names(f.store.participants(idea.id).unwrap()), ["alice", "bob"]);
        assert_eq!(names(f.store.commenters(idea.id).unwrap()), ["alice", "bob"]);
        assert_eq!(names(f.store.vetters(idea.id).unwrap()), ["bob"]);
        assert_eq!(names(f.store.backers(idea.id).unwrap()), ["bob"]);
        assert_eq!(names(f.store.bookmarkers(idea.id).unwrap()), ["carol"]);
    }

    #[test]
    fn test_bookmarks() {
        let f = setup();
        let idea = new_idea(&f, "Saved");
        assert!(f.store.bookmark(idea.id, f.bob.id).unwrap());
        assert!(!f.store.bookmark(idea.id, f.bob.id).unwrap());

        let followed = f
            .store
            .list(&f.bob, &IdeaQuery::new(Worklist::Followed))
            .unwrap();
        assert_eq!(titles(&followed), ["Saved"]);

        assert!(f.store.unbookmark(idea.id, f.bob.id).unwrap());
        assert!(!f.store.unbookmark(idea.id, f.bob.id).unwrap());
        assert!(f
            .store
            .list(&f.bob, &IdeaQuery::new(Worklist::Followed))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_worklists_follow_state() {
        let f = setup();
        new_idea(&f, "submitted");
        let voted = new_idea(&f, "voted");
        let designed = new_idea(&f, "designed");
        let now = Utc::now();
        f.store.vet(voted.id, f.bob.id, now).unwrap();
        f.store.back(voted.id, f.bob.id, now).unwrap();
        for event in [
            IdeaEvent::Vet,
            IdeaEvent::Vote,
            IdeaEvent::Pick,
            IdeaEvent::Design,
        ] {
            f.store.fire(designed.id, event, now).unwrap();
        }

        let list = |w: Worklist| {
            let ideas = f.store.list(&f.alice, &IdeaQuery::new(w)).unwrap();
            ideas.into_iter().map(|i| i.title).collect::<Vec<_>>()
        };
        assert_eq!(list(Worklist::Vettable), ["submitted"]);
        assert_eq!(list(Worklist::Votable), ["voted"]);
        assert_eq!(list(Worklist::Pickable), ["voted"]);
        assert_eq!(list(Worklist::Approvable), ["designed"]);
        assert!(list(Worklist::Signoffable).is_empty());
        assert_eq!(list(Worklist::Buildable), ["designed"]);
        assert_eq!(list(Worklist::Discussable).len(), 3);
    }

    #[test]
    fn test_every_worklist_lists_with_default_query() {
        let f = setup();
        let idea = new_idea(&f, "only");
        f.store.bookmark(idea.id, f.alice.id).unwrap();
        f.store
            .update_idea(
                idea.id,
                IdeaUpdate {
                    product_manager_id: Some(Some(f.alice.id)),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();

        for worklist in Worklist::ALL {
            for order in IdeaOrder::ALL {
                let ideas = f
                    .store
                    .list(&f.alice, &IdeaQuery::new(worklist).order(order))
                    .unwrap();
                let expected = usize::from(worklist.admits(IdeaState::Submitted));
                assert_eq!(ideas.len(), expected, "{} by {}", worklist, order);
            }
        }

        // The user id is bound once even when several clauses use it.
        let mut query = IdeaQuery::new(Worklist::Followed)
            .filter(IdeaFilter::Authored)
            .category(CategoryFilter::None);
        query.not_vetted = true;
        assert_eq!(titles(&f.store.list(&f.alice, &query).unwrap()), ["only"]);
        query = query.category(CategoryFilter::Named("UX".to_string()));
        assert!(f.store.list(&f.alice, &query).unwrap().is_empty());
    }

    #[test]
    fn test_lists_are_scoped_to_account() {
        let f = setup();
        new_idea(&f, "ours");
        let other = Account::new("Other".to_string(), vec![]);
        f.store.add_account(&other).unwrap();
        let eve = User::new(other.id, "eve".to_string());
        f.store.add_user(&eve).unwrap();

        assert!(f
            .store
            .list(&eve, &IdeaQuery::default())
            .unwrap()
            .is_empty());
        assert!(matches!(
            f.store.bookmark(new_idea(&f, "also ours").id, eve.id),
            Err(IdeaboxError::NotAllowed(_))
        ));
    }

    #[test]
    fn test_filters() {
        let f = setup();
        let mine = new_idea(&f, "mine");
        let theirs = Idea::new(
            f.account.id,
            f.bob.id,
            "theirs".to_string(),
            "p".to_string(),
            "s".to_string(),
            "m".to_string(),
        );
        f.store.create_idea(&theirs).unwrap();
        let now = Utc::now();
        f.store
            .add_comment(&Comment::new(theirs.id, f.alice.id, "hm".to_string()))
            .unwrap();
        f.store.vet(mine.id, f.bob.id, now).unwrap();
        f.store.back(mine.id, f.bob.id, now).unwrap();

        let query = |user: &User, filter: IdeaFilter| {
            let q = IdeaQuery::default().filter(filter).order(IdeaOrder::Creation);
            let ideas = f.store.list(user, &q).unwrap();
            ideas.into_iter().map(|i| i.title).collect::<Vec<_>>()
        };
        assert_eq!(query(&f.alice, IdeaFilter::Authored), ["mine"]);
        assert_eq!(query(&f.alice, IdeaFilter::Commented), ["theirs"]);
        assert_eq!(query(&f.bob, IdeaFilter::Vetted), ["mine"]);
        assert_eq!(query(&f.bob, IdeaFilter::Backed), ["mine"]);
        assert!(query(&f.alice, IdeaFilter::Backed).is_empty());

        let mut not_vetted = IdeaQuery::default();
        not_vetted.not_vetted = true;
        let ideas = f.store.list(&f.bob, &not_vetted).unwrap();
        assert_eq!(titles(&ideas), ["theirs"]);
    }

    #[test]
    fn test_category_filter() {
        let f = setup();
        let ux = new_idea(&f, "ux");
        f.store
            .update_idea(
                ux.id,
                IdeaUpdate {
                    category: Some(Some("UX".to_string())),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        new_idea(&f, "loose");

        let by = |category: CategoryFilter| {
            let ideas = f
                .store
                .list(&f.alice, &IdeaQuery::default().category(category))
                .unwrap();
            ideas.into_iter().map(|i| i.title).collect::<Vec<_>>()
        };
        assert_eq!(by(CategoryFilter::Named("UX".to_string())), ["ux"]);
        assert_eq!(by(CategoryFilter::None), ["loose"]);
        assert_eq!(by(CategoryFilter::All).len(), 2);
    }

    #[test]
    fn test_sql_order_matches_in_memory_sort() {
        let f = setup();
        let mut inserted = vec![
            sized(&f, "unsized", 90, None).id,
            sized(&f, "sparse", 8, Some((2, 2))).id,
            sized(&f, "dense", 10, Some((1, 1))).id,
            sized(&f, "thirds", 10, Some((1, 2))).id,
            sized(&f, "negative", -3, Some((4, 4))).id,
            sized(&f, "tie", 8, Some((2, 2))).id,
        ];
        let live = sized(&f, "live", 1, Some((4, 3)));
        inserted.push(live.id);
        for event in IdeaEvent::ALL {
            f.store.fire(live.id, event, Utc::now()).unwrap();
        }

        for order in IdeaOrder::ALL {
            let from_sql = f
                .store
                .list(&f.alice, &IdeaQuery::default().order(order))
                .unwrap();
            let mut in_memory = inserted
                .iter()
                .map(|id| f.store.get_idea(*id).unwrap())
                .collect::<Vec<_>>();
            order.sort(&mut in_memory);
            assert_eq!(titles(&from_sql), titles(&in_memory), "order {}", order);
        }

        let by_rating = f
            .store
            .list(&f.alice, &IdeaQuery::default().order(IdeaOrder::Rating))
            .unwrap();
        assert_eq!(
            titles(&by_rating),
            ["dense", "thirds", "sparse", "tie", "live", "unsized", "negative"]
        );

        let by_size = f
            .store
            .list(&f.alice, &IdeaQuery::default().order(IdeaOrder::Size))
            .unwrap();
        assert_eq!(by_size.first().unwrap().title, "dense");
        assert_eq!(by_size.last().unwrap().title, "unsized");

        let by_progress = f
            .store
            .list(&f.alice, &IdeaQuery::default().order(IdeaOrder::Progress))
            .unwrap();
        assert_eq!(by_progress[0].title, "live");
    }

    #[test]
    fn test_limit() {
        let f = setup();
        for i in 0..5 {
            new_idea(&f, &format!("idea {}", i));
        }
        let mut query = IdeaQuery::default();
        query.limit = Some(2);
        assert_eq!(f.store.list(&f.alice, &query).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_cascades_owned_records() {
        let f = setup();
        let idea = new_idea(&f, "Doomed");
        let now = Utc::now();
        f.store.vet(idea.id, f.bob.id, now).unwrap();
        f.store.back(idea.id, f.bob.id, now).unwrap();
        f.store.bookmark(idea.id, f.bob.id).unwrap();
        let attachment = f
            .store
            .attach_file(idea.id, "sketch.png", vec![1, 2, 3])
            .unwrap();
        f.store
            .add_comment(&Comment::new(idea.id, f.bob.id, "bye".to_string()))
            .unwrap();

        f.store.delete_idea(idea.id).unwrap();
        let counts = f.store.activity_counts(idea.id).unwrap();
        assert_eq!(counts.vettings, 0);
        assert_eq!(counts.votes, 0);
        assert_eq!(counts.bookmarks, 0);
        assert_eq!(counts.comments, 1);
        assert!(!f.store.has_file(attachment.stored_file_id).unwrap());
        assert!(f.store.attachments(idea.id).unwrap().is_empty());

        assert!(matches!(
            f.store.delete_idea(idea.id),
            Err(IdeaboxError::NotFound { .. })
        ));
    }

    #[test]
    fn test_vettings_required_from_config() {
        let tmp = TempDir::new().unwrap();
        drop(IdeaStore::init(tmp.path()).unwrap());
        let config = Config {
            vettings_required: 2,
            ..Config::default()
        };
        config.save(&tmp.path().join(IDEABOX_DIR)).unwrap();

        let store = IdeaStore::open(tmp.path()).unwrap();
        let account = Account::new("Acme".to_string(), vec![]);
        store.add_account(&account).unwrap();
        let a = User::new(account.id, "a".to_string());
        let b = User::new(account.id, "b".to_string());
        store.add_user(&a).unwrap();
        store.add_user(&b).unwrap();
        let idea = Idea::new(
            account.id,
            a.id,
            "t".to_string(),
            "p".to_string(),
            "s".to_string(),
            "m".to_string(),
        );
        store.create_idea(&idea).unwrap();

        let now = Utc::now();
        assert_eq!(store.vet(idea.id, a.id, now).unwrap().state(), IdeaState::Submitted);
        assert!(matches!(
            store.vet(idea.id, a.id, now),
            Err(IdeaboxError::NotAllowed(_))
        ));
        assert_eq!(store.vet(idea.id, b.id, now).unwrap().state(), IdeaState::Vetted);
    }

    #[test]
    fn test_resolve_account_and_user() {
        let f = setup();
        assert_eq!(f.store.resolve_account("Acme").unwrap().id, f.account.id);
        assert_eq!(
            f.store.resolve_account(&f.account.id.to_string()).unwrap().name,
            "Acme"
        );
        assert_eq!(f.store.resolve_user("bob").unwrap().id, f.bob.id);
        assert_eq!(f.store.resolve_user(&f.bob.id.to_string()).unwrap().name, "bob");
        assert!(matches!(
            f.store.resolve_user("nobody"),
            Err(IdeaboxError::NotFound { .. })
        ));
        assert_eq!(f.store.get_account(f.account.id).unwrap().categories.len(), 2);
    }
}
