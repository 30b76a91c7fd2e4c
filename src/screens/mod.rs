//! Headless screens. Each holds only its own view state and talks to the
//! auth client, favorites store and catalog search it is handed; the session
//! is passed in explicitly rather than read from anywhere global.

pub mod auth_screen;
pub mod details;
pub mod home;
pub mod profile;

pub use auth_screen::AuthScreen;
pub use details::DetailsScreen;
pub use home::HomeScreen;
pub use profile::ProfileScreen;

use crate::auth::AuthClient;
use crate::models::Session;
use crate::navigator::Flow;
use crate::store::FavoritesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A one-shot message for the user, consumed when displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Profile,
}

/// The Home tab's stack: search, with Details pushed on top.
#[derive(Default)]
pub struct HomeStack {
    pub home: HomeScreen,
    pub details: Option<DetailsScreen>,
}

/// Everything visible while signed in.
pub struct MainScreens {
    session: Session,
    pub tab: Tab,
    pub stack: HomeStack,
    pub profile: ProfileScreen,
}

impl MainScreens {
    pub fn new(session: Session) -> Self {
        MainScreens {
            session,
            tab: Tab::Home,
            stack: HomeStack::default(),
            profile: ProfileScreen::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Same user, new tokens. No screen state is touched.
    pub fn update_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Push Details on the Home stack and show it, whichever tab it came from.
    pub fn push_details(&mut self, details: DetailsScreen) {
        self.stack.details = Some(details);
        self.tab = Tab::Home;
    }

    /// Pop Details. Returns false if there was nothing to pop.
    pub fn back(&mut self) -> bool {
        self.stack.details.take().is_some()
    }

    pub fn show_home(&mut self) {
        self.tab = Tab::Home;
    }

    /// The auth client's session with a live id token, if it still belongs to
    /// this user. Store calls go through here so an expired token is refreshed
    /// before it is presented.
    pub async fn fresh_session(&mut self, auth: &AuthClient) -> Option<Session> {
        let session = auth.session().await.filter(|s| s.same_user(&self.session))?;
        self.session = session.clone();
        Some(session)
    }

    /// Switch to Profile, which fetches favorites on mount.
    pub async fn show_profile(&mut self, auth: &AuthClient, store: &dyn FavoritesStore) {
        self.tab = Tab::Profile;
        self.profile = ProfileScreen::new();
        let session = self.fresh_session(auth).await;
        self.profile.load(session.as_ref(), store).await;
    }

    /// Add the open Details book to favorites. `None` when no book is open.
    pub async fn favorite_open_book(
        &mut self,
        auth: &AuthClient,
        store: &dyn FavoritesStore,
    ) -> Option<bool> {
        self.stack.details.as_ref()?;
        let session = self.fresh_session(auth).await;
        let details = self.stack.details.as_mut()?;
        Some(details.add_to_favorites(session.as_ref(), store).await)
    }
}

/// The visible root subtree. Rebuilt from scratch on every navigator
/// transition; nothing carries over.
pub enum Root {
    Auth(AuthScreen),
    Main(Box<MainScreens>),
}

impl Root {
    pub fn mount(flow: &Flow) -> Self {
        match flow {
            Flow::Unauthenticated => Root::Auth(AuthScreen::new()),
            Flow::Authenticated(session) => Root::Main(Box::new(MainScreens::new(session.clone()))),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Root::Main(_))
    }
}
