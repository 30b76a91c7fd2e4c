//! A line-oriented terminal front end over the screens.
//!
//! Each input line is one command; `execute` returns the lines to print.

use crate::app::App;
use crate::models::BookRecord;
use crate::screens::profile::NO_FAVORITES;
use crate::screens::{DetailsScreen, MainScreens, Notice, NoticeLevel, Root, Tab};
use crate::state::AppState;

pub const HELP: &str = "\
Commands:
  register <email> <password>   create an account
  login <email> <password>      sign in
  logout                        sign out
  search <query>                search the catalog
  open <n>                      show details of result/favorite n
  fav                           add the open book to favorites
  back                          close the details view
  home                          show the search tab
  profile                       show your favorites
  show                          redraw the current screen
  help                          this text
  quit                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout,
    Search(String),
    Open(usize),
    Favorite,
    Back,
    Home,
    Profile,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Result numbers are 1-based for the user.
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "register" | "login" => {
                let mut parts = rest.split_whitespace();
                let (Some(email), Some(password), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err(format!("usage: {} <email> <password>", word));
                };
                let (email, password) = (email.to_string(), password.to_string());
                Ok(if word.eq_ignore_ascii_case("register") {
                    Command::Register { email, password }
                } else {
                    Command::Login { email, password }
                })
            }
            "logout" => Ok(Command::Logout),
            // The query may be blank; the home screen ignores it.
            "search" => Ok(Command::Search(rest.to_string())),
            "open" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Open(n - 1)),
                _ => Err("usage: open <n>, n starting at 1".to_string()),
            },
            "fav" | "favorite" => Ok(Command::Favorite),
            "back" => Ok(Command::Back),
            "home" => Ok(Command::Home),
            "profile" => Ok(Command::Profile),
            "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

/// Run one command against the app and describe the resulting screen.
pub async fn execute(app: &mut App, command: Command) -> Vec<String> {
    let state = app.state().clone();
    let mut out = Vec::new();

    match command {
        Command::Help => return HELP.lines().map(str::to_string).collect(),
        Command::Quit | Command::Show => {}
        Command::Register { email, password } => {
            sign_in(app, &state, email, password, true, &mut out).await
        }
        Command::Login { email, password } => {
            sign_in(app, &state, email, password, false, &mut out).await
        }
        Command::Logout => match app.root() {
            Root::Main(main) => main.profile.logout(&state.auth).await,
            Root::Auth(_) => out.push("Not signed in.".to_string()),
        },
        other => match app.root() {
            Root::Auth(_) => out.push("Sign in first: login <email> <password>".to_string()),
            Root::Main(main) => main_command(main, other, &state, &mut out).await,
        },
    }

    app.settle().await;
    out.extend(render(app.root()));
    out
}

async fn sign_in(
    app: &mut App,
    state: &AppState,
    email: String,
    password: String,
    register: bool,
    out: &mut Vec<String>,
) {
    let Root::Auth(screen) = app.root() else {
        out.push("Already signed in; logout first.".to_string());
        return;
    };
    screen.email = email;
    screen.password = password;
    if register {
        screen.register(&state.auth).await;
    } else {
        screen.login(&state.auth).await;
    }
}

async fn main_command(
    main: &mut MainScreens,
    command: Command,
    state: &AppState,
    out: &mut Vec<String>,
) {
    match command {
        Command::Search(query) => {
            main.back();
            main.show_home();
            main.stack.home.query = query;
            if !main.stack.home.search(state.search.as_ref()).await {
                out.push("Enter a search term.".to_string());
            }
        }
        Command::Open(index) => {
            let details = match main.tab {
                Tab::Home => main.stack.home.select(index),
                Tab::Profile => main.profile.select(index),
            };
            match details {
                Some(details) => main.push_details(details),
                None => out.push(format!("No item {}.", index + 1)),
            }
        }
        Command::Favorite => {
            let saved = match main.tab {
                Tab::Home => {
                    main.favorite_open_book(&state.auth, state.favorites.as_ref())
                        .await
                }
                Tab::Profile => None,
            };
            if saved.is_none() {
                out.push("Open a book first.".to_string());
            }
        }
        Command::Back => {
            if !main.back() {
                out.push("Nothing to go back from.".to_string());
            }
        }
        Command::Home => main.show_home(),
        Command::Profile => {
            main.show_profile(&state.auth, state.favorites.as_ref())
                .await
        }
        // Handled before dispatch.
        Command::Register { .. }
        | Command::Login { .. }
        | Command::Logout
        | Command::Show
        | Command::Help
        | Command::Quit => {}
    }
}

fn render_notice(notice: Option<Notice>, out: &mut Vec<String>) {
    if let Some(notice) = notice {
        let marker = match notice.level {
            NoticeLevel::Info => "*",
            NoticeLevel::Error => "!",
        };
        out.push(format!("{} {}", marker, notice.message));
    }
}

fn book_line(position: usize, book: &BookRecord) -> String {
    format!("  {}. {} by {}", position + 1, book.title(), book.author_line())
}

fn render_details(details: &mut DetailsScreen, out: &mut Vec<String>) {
    let book = details.book();
    out.push(format!("== {} ==", book.title()));
    out.push(format!("by {}", book.author_line()));
    if let Some(thumbnail) = book.thumbnail() {
        out.push(format!("cover: {}", thumbnail));
    }
    out.push(book.description().unwrap_or("No description available.").to_string());
    out.push("fav: add to favorites, back: return to results".to_string());
    render_notice(details.take_notice(), out);
}

/// Describe the visible root, consuming any pending notices.
pub fn render(root: &mut Root) -> Vec<String> {
    let mut out = Vec::new();
    match root {
        Root::Auth(screen) => {
            out.push("== Sign in ==".to_string());
            if let Some(error) = screen.error() {
                out.push(format!("! {}", error));
            }
            out.push("register <email> <password> | login <email> <password>".to_string());
        }
        Root::Main(main) => {
            out.push(format!("[{}]", main.session().email));
            match main.tab {
                Tab::Home => match main.stack.details.as_mut() {
                    Some(details) => render_details(details, &mut out),
                    None => {
                        let home = &main.stack.home;
                        out.push(format!("== Search: {} ==", home.query.trim()));
                        if home.results().is_empty() {
                            out.push("No results.".to_string());
                        }
                        for (i, book) in home.results().iter().enumerate() {
                            out.push(book_line(i, book));
                        }
                    }
                },
                Tab::Profile => {
                    out.push("== Your Favorites ==".to_string());
                    if main.profile.favorites().is_empty() {
                        out.push(NO_FAVORITES.to_string());
                    }
                    for (i, book) in main.profile.favorites().iter().enumerate() {
                        out.push(book_line(i, book));
                    }
                    render_notice(main.profile.take_notice(), &mut out);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("login a@x.com secret1"),
            Ok(Command::Login {
                email: "a@x.com".to_string(),
                password: "secret1".to_string()
            })
        );
        assert_eq!(
            Command::parse("  search   dune  messiah "),
            Ok(Command::Search("dune  messiah".to_string()))
        );
        assert_eq!(Command::parse("search"), Ok(Command::Search(String::new())));
        assert_eq!(Command::parse("open 2"), Ok(Command::Open(1)));
        assert_eq!(Command::parse("FAV"), Ok(Command::Favorite));
        assert_eq!(Command::parse(""), Ok(Command::Show));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("register a@x.com").is_err());
        assert!(Command::parse("login a b c").is_err());
        assert!(Command::parse("open 0").is_err());
        assert!(Command::parse("open two").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn test_render_auth_error() {
        let mut root = Root::Auth(crate::screens::AuthScreen::new());
        let lines = render(&mut root);
        assert_eq!(lines[0], "== Sign in ==");
    }
}
