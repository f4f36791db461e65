//! Command-line front end for the notes API.
//!
//! Usage:
//!   notes login a@b.com --password secret
//!   notes notes list --tag work
//!   notes share 12 friend@b.com
//!
//! Credentials persist between runs in the configured credentials file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notes_client::{
    ApiError, ClientConfig, DEFAULT_SEARCH_LIMIT, DEFAULT_SHARED_LIMIT, NotesClient,
    SessionSignal, SessionStatus,
};
use notes_types::{Note, NoteDraft, NoteFilter, NoteId, NoteUpdate, Visibility};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notes")]
#[command(about = "Command-line client for the notes API", version)]
pub struct Cli {
    /// API base URL (overrides NOTES_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Credentials file (overrides NOTES_CREDENTIALS_PATH)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Request timeout in seconds (overrides NOTES_API_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env().context("invalid environment configuration")?;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(path) = &self.credentials {
            config.credentials_path = Some(path.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Ask the server instead of trusting the stored profile
        #[arg(long)]
        remote: bool,
    },
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Work with your notes
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Share a note with another user
    Share { note_id: NoteId, email: String },
    /// Stop sharing a note with a user
    Unshare { note_id: NoteId, email: String },
    /// List notes shared with you
    SharedWithMe {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_SHARED_LIMIT)]
        limit: u32,
    },
    /// List who a note is shared with
    Shares { note_id: NoteId },
    /// Manage public links
    #[command(subcommand)]
    Link(LinkCommand),
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List your notes, optionally filtered locally
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        visibility: Option<Visibility>,
        /// Only notes carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Show { id: NoteId },
    Create {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "prive")]
        visibility: Visibility,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        visibility: Option<Visibility>,
        /// Replaces the whole tag set (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },
    Delete { id: NoteId },
    /// Server-side full-text search
    Search {
        query: String,
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Notes carrying a tag
    Tagged { tag: String },
    /// Notes with a given visibility
    Visible { visibility: Visibility },
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// Create a public link for a note
    Create { note_id: NoteId },
    /// Revoke a note's public link
    Revoke { note_id: NoteId },
    /// Read a note through its public token
    Open { token: String },
}

/// Log directives for the CLI: `rust_log` when it parses, else `warn`.
/// `--verbose` raises the global level to `debug` on top of either.
#[must_use]
pub fn log_directives(verbose: bool, rust_log: Option<&str>) -> String {
    let base = rust_log
        .map(str::trim)
        .filter(|d| !d.is_empty() && EnvFilter::try_new(d).is_ok())
        .unwrap_or("warn");
    if verbose {
        format!("{base},debug")
    } else {
        base.to_string()
    }
}

/// Runs one command against `client`, writing results to `out`.
pub async fn run<W: Write>(
    client: &NotesClient,
    command: Command,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let mut signals = client.session().signals();
    client.session().restore();

    let signing_in = matches!(command, Command::Login { .. } | Command::Register { .. });
    let result = dispatch(client, command, json, out).await;

    match signals.try_recv() {
        Ok(SessionSignal::LoginRequired) if !signing_in => {
            writeln!(out, "Session expired. Run `notes login` to sign in again.")?;
        }
        Ok(SessionSignal::LoginRequired)
        | Err(TryRecvError::Empty | TryRecvError::Closed | TryRecvError::Lagged(_)) => {}
    }
    result
}

async fn dispatch<W: Write>(
    client: &NotesClient,
    command: Command,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let session = client.session();
    match command {
        Command::Register { email, password } => {
            let response = client
                .auth()
                .register(&email, &password)
                .await
                .map_err(|e| explain(e, "Registration failed"))?;
            let message = if response.message.is_empty() {
                "Account created".to_string()
            } else {
                response.message
            };
            writeln!(out, "{message}")?;
        }
        Command::Login { email, password } => {
            let user = session
                .login(&email, &password)
                .await
                .map_err(|e| explain(e, "Login failed"))?;
            emit(out, json, &user, |out| writeln!(out, "Signed in as {}", user.email))?;
        }
        Command::Logout => {
            session.logout().await.context("failed to clear credentials")?;
            writeln!(out, "Signed out")?;
        }
        Command::Whoami { remote } => {
            let user = if remote {
                Some(
                    session
                        .revalidate()
                        .await
                        .map_err(|e| explain(e, "Could not verify the session"))?,
                )
            } else {
                session.current_user()
            };
            match user {
                Some(user) => emit(out, json, &user, |out| {
                    writeln!(out, "{} ({})", user.email, user.id)
                })?,
                None => writeln!(out, "{}", describe_status(&session.status()))?,
            }
        }
        Command::Refresh => {
            session
                .refresh()
                .await
                .map_err(|e| explain(e, "Could not refresh the session"))?;
            writeln!(out, "Session refreshed")?;
        }
        Command::Notes(command) => notes(client, command, json, out).await?,
        Command::Share { note_id, email } => {
            let result = client
                .sharing()
                .share_with(&note_id, &email)
                .await
                .map_err(|e| explain(e, "Could not share the note"))?;
            writeln!(out, "{}", or_default(&result.message, "Note shared"))?;
        }
        Command::Unshare { note_id, email } => {
            let result = client
                .sharing()
                .unshare_with(&note_id, &email)
                .await
                .map_err(|e| explain(e, "Could not stop sharing the note"))?;
            writeln!(out, "{}", or_default(&result.message, "Sharing removed"))?;
        }
        Command::SharedWithMe { skip, limit } => {
            let notes = client
                .sharing()
                .shared_with_me(skip, limit)
                .await
                .map_err(|e| explain(e, "Could not load shared notes"))?;
            print_notes(out, json, &notes.iter().collect::<Vec<_>>())?;
        }
        Command::Shares { note_id } => {
            let shares = client
                .sharing()
                .note_shares(&note_id)
                .await
                .map_err(|e| explain(e, "Could not load shares"))?;
            emit(out, json, &shares, |out| {
                if shares.is_empty() {
                    return writeln!(out, "Not shared with anyone");
                }
                for share in &shares {
                    writeln!(out, "{}", share.user_email)?;
                }
                Ok(())
            })?;
        }
        Command::Link(LinkCommand::Create { note_id }) => {
            let link = client
                .sharing()
                .create_public_link(&note_id)
                .await
                .map_err(|e| explain(e, "Could not create a public link"))?;
            emit(out, json, &link, |out| match &link.public_url {
                Some(url) => writeln!(out, "{url}"),
                None => writeln!(out, "Public token: {}", link.public_token),
            })?;
        }
        Command::Link(LinkCommand::Revoke { note_id }) => {
            let result = client
                .sharing()
                .revoke_public_link(&note_id)
                .await
                .map_err(|e| explain(e, "Could not revoke the public link"))?;
            writeln!(out, "{}", or_default(&result.message, "Public link revoked"))?;
        }
        Command::Link(LinkCommand::Open { token }) => {
            let note = client
                .sharing()
                .public_note(&token)
                .await
                .map_err(|e| explain(e, "Could not open the public note"))?;
            print_note(out, json, &note)?;
        }
    }
    Ok(())
}

async fn notes<W: Write>(
    client: &NotesClient,
    command: NotesCommand,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let service = client.notes();
    match command {
        NotesCommand::List {
            search,
            visibility,
            tags,
        } => {
            let notes = service
                .list()
                .await
                .map_err(|e| explain(e, "Could not load notes"))?;
            let mut filter = NoteFilter::new();
            if let Some(text) = search {
                filter = filter.search(text);
            }
            if let Some(visibility) = visibility {
                filter = filter.visibility(visibility);
            }
            for tag in tags {
                filter = filter.tag(tag);
            }
            print_notes(out, json, &filter.apply(&notes))?;
        }
        NotesCommand::Show { id } => {
            let note = service
                .get(&id)
                .await
                .map_err(|e| explain(e, "Could not load the note"))?;
            print_note(out, json, &note)?;
        }
        NotesCommand::Create {
            title,
            content,
            visibility,
            tags,
        } => {
            let draft = NoteDraft::new(title, content)
                .with_visibility(visibility)
                .with_tags(tags);
            let note = service
                .create(&draft)
                .await
                .map_err(|e| explain(e, "Could not create the note"))?;
            emit(out, json, &note, |out| writeln!(out, "Created note {}", note.id))?;
        }
        NotesCommand::Edit {
            id,
            title,
            content,
            visibility,
            tags,
        } => {
            let update = NoteUpdate {
                title,
                content,
                visibility,
                tags,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to change; pass --title, --content, --visibility or --tag");
            }
            let note = service
                .update(&id, &update)
                .await
                .map_err(|e| explain(e, "Could not update the note"))?;
            emit(out, json, &note, |out| writeln!(out, "Updated note {}", note.id))?;
        }
        NotesCommand::Delete { id } => {
            service
                .delete(&id)
                .await
                .map_err(|e| explain(e, "Could not delete the note"))?;
            writeln!(out, "Deleted note {id}")?;
        }
        NotesCommand::Search { query, skip, limit } => {
            let notes = service
                .search(&query, skip, limit)
                .await
                .map_err(|e| explain(e, "Search failed"))?;
            print_notes(out, json, &notes.iter().collect::<Vec<_>>())?;
        }
        NotesCommand::Tagged { tag } => {
            let notes = service
                .by_tag(&tag)
                .await
                .map_err(|e| explain(e, "Could not load tagged notes"))?;
            print_notes(out, json, &notes.iter().collect::<Vec<_>>())?;
        }
        NotesCommand::Visible { visibility } => {
            let notes = service
                .by_visibility(visibility)
                .await
                .map_err(|e| explain(e, "Could not load notes"))?;
            print_notes(out, json, &notes.iter().collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

/// Wraps an API error with the message a user should see.
pub fn explain(error: ApiError, fallback: &str) -> anyhow::Error {
    let message = error.user_message(fallback);
    anyhow::Error::new(error).context(message)
}

/// Current session state as one line of text.
#[must_use]
pub fn describe_status(status: &SessionStatus) -> String {
    match status {
        SessionStatus::Unauthenticated => "Not signed in".to_string(),
        SessionStatus::Authenticating => "Signing in...".to_string(),
        SessionStatus::Authenticated(user) => format!("Signed in as {}", user.email),
    }
}

fn or_default<'a>(message: &'a str, default: &'a str) -> &'a str {
    let message = message.trim();
    if message.is_empty() { default } else { message }
}

fn emit<W, T, F>(out: &mut W, json: bool, value: &T, text: F) -> Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&mut W) -> std::io::Result<()>,
{
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    } else {
        text(out)?;
    }
    Ok(())
}

fn print_note<W: Write>(out: &mut W, json: bool, note: &Note) -> Result<()> {
    emit(out, json, note, |out| {
        writeln!(out, "# {} [{}]", note.title, note.visibility)?;
        let tags = note.tag_names();
        if !tags.is_empty() {
            writeln!(out, "tags: {}", tags.join(", "))?;
        }
        if !note.content.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", note.content)?;
        }
        Ok(())
    })
}

fn print_notes<W: Write>(out: &mut W, json: bool, notes: &[&Note]) -> Result<()> {
    emit(out, json, &notes, |out| {
        if notes.is_empty() {
            return writeln!(out, "No notes");
        }
        for note in notes {
            let tags = note.tag_names();
            if tags.is_empty() {
                writeln!(
                    out,
                    "{:>6}  {:<8} {}",
                    note.id.as_str(),
                    note.visibility.as_wire(),
                    note.title
                )?;
            } else {
                writeln!(
                    out,
                    "{:>6}  {:<8} {}  [{}]",
                    note.id.as_str(),
                    note.visibility.as_wire(),
                    note.title,
                    tags.join(", ")
                )?;
            }
        }
        Ok(())
    })
}
