//! The running application: services, the navigator and the mounted root.

use tracing::debug;

use crate::navigator::{Flow, FlowState, Navigator};
use crate::screens::Root;
use crate::state::AppState;

pub struct App {
    state: AppState,
    navigator: Navigator,
    root: Root,
    mounted_generation: u64,
}

impl App {
    /// Attach the navigator, then restore any persisted session. The root
    /// starts on the auth flow and follows the first notification.
    pub async fn start(state: AppState) -> Self {
        let navigator = Navigator::attach(&state.auth);
        let initial = navigator.current();
        let mut app = App {
            root: Root::mount(&initial.flow),
            mounted_generation: initial.generation,
            navigator,
            state,
        };
        app.state.auth.initialize().await;
        app.settle().await;
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn flow(&self) -> FlowState {
        self.navigator.current()
    }

    /// Wait until the navigator has caught up with the auth client's current
    /// session, then bring the root in line with it.
    pub async fn settle(&mut self) {
        let session = self.state.auth.current_session();
        self.navigator
            .wait_for(|state| state.flow.matches(session.as_ref()))
            .await;
        self.sync_root();
    }

    /// The visible root, remounted if the navigator moved on since the last look.
    pub fn root(&mut self) -> &mut Root {
        self.sync_root();
        &mut self.root
    }

    fn sync_root(&mut self) {
        let current = self.navigator.current();
        if current.generation != self.mounted_generation {
            debug!(
                "Remounting root for generation {} (was {})",
                current.generation, self.mounted_generation
            );
            self.root = Root::mount(&current.flow);
            self.mounted_generation = current.generation;
            return;
        }
        if let (Root::Main(main), Flow::Authenticated(session)) = (&mut self.root, current.flow) {
            if main.session() != &session {
                main.update_session(session);
            }
        }
    }

    /// Release the navigator's subscription.
    pub async fn shutdown(self) {
        self.navigator.shutdown().await;
    }
}
