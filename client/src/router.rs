//! Path to view mapping for the web frontend.

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    History,
    Details,
    Login,
    Register,
    Report,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::History,
        Route::Details,
        Route::Login,
        Route::Register,
        Route::Report,
    ];

    /// Resolves a location path. Query strings and fragments are ignored, as
    /// is a trailing slash. Unknown paths resolve to [`Route::NotFound`].
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        Self::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::NotFound)
    }

    /// The canonical path. [`Route::NotFound`] has none of its own and
    /// reports the catch-all pattern.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::History => "/storico",
            Route::Details => "/dettagli",
            Route::Login => "/accedi",
            Route::Register => "/registrati",
            Route::Report => "/invia_segnalazione",
            Route::NotFound => "/:pathMatch(.*)*",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::History => "storico",
            Route::Details => "dettagli",
            Route::Login => "accedi",
            Route::Register => "registrati",
            Route::Report => "invia_segnalazione",
            Route::NotFound => "error404",
        }
    }
}
