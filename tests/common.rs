#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use booktracker::app::App;
use booktracker::config::{ConfigV1, load_config_from_str};
use booktracker::shell::{self, Command};
use booktracker::startup::build_state;
use booktracker::state::AppState;

pub const DUNE_RESULTS: &str = r#"{"kind":"books#volumes","totalItems":2,"items":[
    {"id":"v1","volumeInfo":{"title":"Dune","authors":["Frank Herbert"],
     "description":"Desert planet.","imageLinks":{"thumbnail":"http://img/v1.jpg"}}},
    {"id":"v2","volumeInfo":{"title":"Dune Messiah","authors":["Frank Herbert"]}}
]}"#;

/// Plain accounts, in-memory favorites, and the catalog at `books_uri`.
/// Sessions go to `session_file` when given.
pub fn local_config(books_uri: &str, session_file: Option<&Path>) -> ConfigV1 {
    let persistence = match session_file {
        Some(path) => format!("\n  persistence:\n    type: \"file\"\n    path: \"{}\"", path.display()),
        None => String::new(),
    };
    let yaml = format!(
        r#"
version: "1.0.0"
auth:
  type: "plain"
  name: "Local accounts"
  issuer: "booktracker-test"
  secret: "test-secret"
session:
  key: "booktracker:authUser"{persistence}
store:
  type: "memory"
search:
  uri: "{books_uri}"
"#
    );
    load_config_from_str(&yaml).expect("test config should parse")
}

/// Firebase accounts and Firestore favorites, both served from `uri`.
pub fn firebase_config(uri: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
auth:
  type: "firebase"
  name: "Firebase"
  api_key: "test-key"
  identity_uri: "{uri}"
  token_uri: "{uri}"
store:
  type: "firestore"
  project_id: "demo"
  uri: "{uri}"
search:
  uri: "{uri}"
"#
    );
    load_config_from_str(&yaml).expect("test config should parse")
}

pub async fn start(config: ConfigV1) -> (App, AppState) {
    let state = build_state(Arc::new(config));
    let app = App::start(state.clone()).await;
    (app, state)
}

/// Parse and run one shell line.
pub async fn run(app: &mut App, line: &str) -> Vec<String> {
    let command = Command::parse(line).expect("test command should parse");
    shell::execute(app, command).await
}

pub fn has_line(output: &[String], expected: &str) -> bool {
    output.iter().any(|line| line == expected)
}
