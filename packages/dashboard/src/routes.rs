//! Page routes.

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing page.
    Home,
    /// Live map.
    Map,
    /// Charts and breakdowns.
    Statistics,
    /// Summary cards.
    Dashboard,
    /// Report submission form.
    Report,
    /// Paged report list.
    Reports,
    /// Hotspot list.
    Hotspots,
}

impl Route {
    /// Every route, in navigation order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Home,
            Self::Map,
            Self::Dashboard,
            Self::Statistics,
            Self::Reports,
            Self::Hotspots,
            Self::Report,
        ]
    }

    /// URL path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Map => "/map",
            Self::Statistics => "/statistics",
            Self::Dashboard => "/dashboard",
            Self::Report => "/report",
            Self::Reports => "/reports",
            Self::Hotspots => "/hotspots",
        }
    }

    /// Page title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Lovebug Map",
            Self::Map => "Live Map",
            Self::Statistics => "Statistics",
            Self::Dashboard => "Dashboard",
            Self::Report => "Report a Sighting",
            Self::Reports => "Reports",
            Self::Hotspots => "Hotspots",
        }
    }

    /// Resolves a path, ignoring any query string, fragment or trailing
    /// slash.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::all().iter().copied().find(|route| route.path() == path)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
