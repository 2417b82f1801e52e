//! CLI command implementations.

use std::io::{self, BufRead, Write};
use std::path::Path;

use netbill_console::format::{format_date_value, is_date_field};
use netbill_console::resource::ParseResourceKindError;
use netbill_console::{
    ApiError, AppState, AuthError, Config, ConfigError, Record, Resource, ResourceKind, Route,
};
use serde_json::Value;
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnknownResource(#[from] ParseResourceKindError),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Record data must be a JSON object")]
    NotAnObject,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not logged in. Use 'netbill login' first.")]
    NotLoggedIn,

    #[error("No config path available")]
    NoConfigPath,

    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

// ==================== Session Commands ====================

/// Log in, reading the password from stdin when not given.
///
/// Stdin is read as a plain line, so a terminal shows the password as it
/// is typed.
pub async fn login(state: &AppState, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    state.auth().login(username, &password).await?;

    if let Err(e) = state.auth().fetch_user().await {
        tracing::warn!(error = %e, "Could not load profile after login");
    }

    println!("Logged in as {username}");
    println!("Session: {}", state.navigator().current());
    Ok(())
}

/// Forget the stored session.
pub fn logout(state: &AppState) -> Result<()> {
    state.auth().logout();
    println!("Logged out");
    Ok(())
}

/// Show session status.
pub async fn status(state: &AppState) -> Result<()> {
    println!("netbill Status");
    println!("==============");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("API:     {}", state.client().base_url());

    if !state.session().is_authenticated() {
        println!("Session: Not logged in");
        return Ok(());
    }

    println!("Session: Logged in");
    state.auth().fetch_user().await?;
    if let Some(user) = state.session().user() {
        println!("Profile:");
        print!("{}", render_record(&user));
    }
    Ok(())
}

/// Resolve a path through the route guard and print where it lands.
pub fn open(state: &AppState, path: &str) -> Result<()> {
    let requested = Route::parse(path);
    let landed = state.navigator().navigate(path);

    if landed == requested {
        println!("{landed}");
    } else {
        println!("{landed} (redirected from {requested})");
    }
    Ok(())
}

// ==================== Resource Commands ====================

/// List records of a resource.
pub async fn list(state: &AppState, resource: &str) -> Result<()> {
    let resource = open_resource(state, resource)?;

    resource.fetch_items().await;
    if let Some(error) = resource.error() {
        return Err(CliError::Failed(error));
    }

    let items = resource.items();
    if items.is_empty() {
        println!("No {} found", resource.name());
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", render_record(item));
    }
    println!("\n{} record(s)", items.len());
    Ok(())
}

/// Create a record.
pub async fn create(state: &AppState, resource: &str, json: &str) -> Result<()> {
    let resource = open_resource(state, resource)?;
    let data = parse_object(json)?;

    resource.create_item(&data).await?;

    println!("Created {} record", resource.name());
    Ok(())
}

/// Update a record.
pub async fn update(state: &AppState, resource: &str, id: &str, json: &str) -> Result<()> {
    let resource = open_resource(state, resource)?;
    let data = parse_object(json)?;

    resource.update_item(id, &data).await?;

    let updated = resource
        .items()
        .into_iter()
        .find(|item| item.id().is_some_and(|rid| rid.as_str() == id));
    match updated {
        Some(item) => print!("{}", render_record(&item)),
        None => println!("Updated {} record {id}", resource.name()),
    }
    Ok(())
}

/// Delete a record.
pub async fn delete(state: &AppState, resource: &str, id: &str) -> Result<()> {
    let resource = open_resource(state, resource)?;

    resource.delete_item(id).await?;

    println!("Deleted {} record {id}", resource.name());
    Ok(())
}

// ==================== Config Commands ====================

/// Show the stored config, optionally changing the server URL first.
pub fn config(mut config: Config, path: Option<&Path>, set_server: Option<&str>) -> Result<()> {
    if let Some(server) = set_server {
        let path = path.ok_or(CliError::NoConfigPath)?;
        config.server_url = server.to_string();
        config.save_to(path)?;
        println!("Saved {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

// ==================== Output ====================

/// Print and drain pending notifications to stderr.
pub fn print_notifications(state: &AppState) {
    let notifications = state.notifications();
    for notification in notifications.snapshot() {
        eprintln!(
            "[{}] {}: {}",
            notification.kind, notification.title, notification.message
        );
        if let Some(details) = &notification.details {
            for line in details.lines() {
                eprintln!("    {line}");
            }
        }
    }
    notifications.clear();
}

/// Render a record as `key: value` lines, `id` first.
fn render_record(record: &Value) -> String {
    let Value::Object(fields) = record else {
        return format!("{record}\n");
    };

    let width = fields.keys().map(String::len).max().unwrap_or(0);
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort_by_key(|key| key.as_str() != "id");

    let mut lines = Vec::with_capacity(keys.len());
    for key in keys {
        let value = &fields[key.as_str()];
        let shown = if is_date_field(key) {
            format_date_value(value)
        } else {
            match value {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            }
        };
        lines.push(format!("{key:<width$}  {shown}\n"));
    }
    lines.concat()
}

/// Resolve a resource name and check the session allows opening it.
fn open_resource(state: &AppState, name: &str) -> Result<Resource<Value>> {
    let kind: ResourceKind = name.parse()?;

    let target = Route::Resource(kind);
    if state.navigator().push(target.clone()) != target {
        return Err(CliError::NotLoggedIn);
    }

    Ok(state.records(kind))
}

fn parse_object(json: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(json)? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(CliError::NotAnObject),
    }
}

/// Prompt shown before reading the password from stdin.
const PASSWORD_PROMPT: &str = "Password (input is echoed; use --password or pipe it to hide it): ";

fn read_password() -> Result<String> {
    read_password_from(&mut io::stdin().lock(), &mut io::stderr())
}

/// Read one line as the password. The terminal echoes it as typed.
fn read_password_from(input: &mut impl BufRead, prompt: &mut impl Write) -> Result<String> {
    prompt.write_all(PASSWORD_PROMPT.as_bytes())?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
