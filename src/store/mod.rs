use bson::{doc, DateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::models::{Task, TaskList, UserDoc, UserStats};

const USERS_COLLECTION: &str = "users";

/// All reads and writes against account documents. One `Storage` is built at
/// process start and shared by every concurrent operation; the client owns
/// the connection pool for the process lifetime.
pub struct Storage {
    client: Client,
    users: Collection<UserDoc>,
}

impl Storage {
    /// Connect to MongoDB, verify connectivity with a ping, and ensure the
    /// unique index on `username`. A failed ping is fatal for the caller:
    /// the process cannot serve requests without the store.
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.mongodb_uri)
            .await
            .map_err(StoreError::Unreachable)?;
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options).map_err(StoreError::Unreachable)?;
        let db = client.database(&config.database);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Unreachable)?;
        info!(database = %config.database, "connected to MongoDB");

        let users = db.collection::<UserDoc>(USERS_COLLECTION);

        // The unique index is the authority on username uniqueness; the
        // pre-check in create_user is only an optimization.
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;

        Ok(Storage { client, users })
    }

    /// Release the client and its pool. Call at shutdown.
    pub async fn close(self) {
        self.client.shutdown().await;
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        let user = self.find_user(username).await?;
        Ok(user.is_some())
    }

    /// Create an account with empty task lists. Returns `Ok(false)` if the
    /// username is taken, whether the pre-check catches it or the unique
    /// index rejects a racing insert.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<bool> {
        // Short-circuit before paying for the bcrypt work.
        if self.user_exists(username).await? {
            return Ok(false);
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user = UserDoc {
            username: username.to_string(),
            password_hash,
            todos: Vec::new(),
            completed: Vec::new(),
            created_at: DateTime::now(),
        };

        match self.users.insert_one(&user).await {
            Ok(_) => {
                info!(username, "account created");
                Ok(true)
            }
            Err(e) if is_duplicate_key(&e) => {
                // Lost the race between the existence check and the insert.
                debug!(username, "duplicate username rejected by unique index");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials against the stored bcrypt hash. A missing account
    /// and a wrong password both come back `Ok(false)`; plaintext is never
    /// compared.
    pub async fn verify_user(&self, username: &str, password: &str) -> Result<bool> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(false);
        };
        Ok(bcrypt::verify(password, &user.password_hash)?)
    }

    /// Pending tasks in stored order; empty if the account is absent.
    pub async fn get_user_todos(&self, username: &str) -> Result<Vec<Task>> {
        let user = self.find_user(username).await?;
        Ok(user.map(|u| u.todos).unwrap_or_default())
    }

    /// Completed tasks in stored order; empty if the account is absent.
    pub async fn get_user_completed(&self, username: &str) -> Result<Vec<Task>> {
        let user = self.find_user(username).await?;
        Ok(user.map(|u| u.completed).unwrap_or_default())
    }

    /// Append a new pending task and return it; `None` if the account is
    /// absent.
    ///
    /// The id is `max(current todo ids) + 1`. Reading the list and pushing
    /// are two round trips, so two concurrent adds on one account can mint
    /// the same id; the push itself is atomic. Ids are also scoped to the
    /// `todos` list only, so completing a high-numbered task frees its id
    /// for reuse. Both are long-standing behavior and deliberately kept.
    pub async fn add_todo(&self, username: &str, text: &str) -> Result<Option<Task>> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(None);
        };

        let task = Task {
            id: next_task_id(&user.todos),
            text: text.to_string(),
            created_at: DateTime::now(),
            completed_at: None,
        };

        self.users
            .update_one(
                doc! { "username": username },
                doc! { "$push": { "todos": task_doc(&task) } },
            )
            .await?;
        debug!(username, task_id = task.id, "task added");

        Ok(Some(task))
    }

    /// Move a task from `todos` to `completed`, stamping `completed_at`.
    /// Both sides of the move ride in one update, so concurrent readers
    /// never see the task in neither list or in both. Returns `Ok(false)`
    /// if the account or the task id is absent.
    pub async fn complete_task(&self, username: &str, task_id: i64) -> Result<bool> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(false);
        };
        let Some(task) = user.todos.iter().find(|t| t.id == task_id) else {
            return Ok(false);
        };

        let mut done = task.clone();
        done.completed_at = Some(DateTime::now());

        self.users
            .update_one(
                doc! { "username": username },
                doc! {
                    "$pull": { "todos": { "id": task_id } },
                    "$push": { "completed": task_doc(&done) },
                },
            )
            .await?;
        debug!(username, task_id, "task completed");

        Ok(true)
    }

    /// Remove a task by id from the named list. `Ok(true)` only if an entry
    /// was actually removed, going by the server's modified count rather
    /// than mere request acceptance.
    pub async fn delete_task(&self, username: &str, task_id: i64, list: TaskList) -> Result<bool> {
        let mut pull = Document::new();
        pull.insert(list.as_str(), doc! { "id": task_id });

        let result = self
            .users
            .update_one(doc! { "username": username }, doc! { "$pull": pull })
            .await?;

        Ok(result.modified_count > 0)
    }

    /// Lengths of the two lists; zeroes if the account is absent.
    pub async fn get_user_stats(&self, username: &str) -> Result<UserStats> {
        let user = self.find_user(username).await?;
        Ok(match user {
            Some(u) => UserStats {
                todo_count: u.todos.len(),
                completed_count: u.completed.len(),
            },
            None => UserStats::default(),
        })
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserDoc>> {
        let user = self.users.find_one(doc! { "username": username }).await?;
        Ok(user)
    }
}

fn next_task_id(todos: &[Task]) -> i64 {
    todos.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

fn task_doc(task: &Task) -> Document {
    let mut doc = doc! {
        "id": task.id,
        "text": task.text.as_str(),
        "created_at": task.created_at,
    };
    if let Some(done) = task.completed_at {
        doc.insert("completed_at", done);
    }
    doc
}

/// Duplicate-key rejection (code 11000) from the unique username index is
/// the one constraint violation create_user expects.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
    )
}
