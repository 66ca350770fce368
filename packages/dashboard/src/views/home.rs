use crate::routes::Route;

/// A call-to-action on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeLink {
    /// Destination.
    pub route: Route,
    /// Button text.
    pub label: &'static str,
    /// Whether this is the primary action.
    pub primary: bool,
}

/// Landing page headline.
pub const HEADLINE: &str = "Track lovebug sightings across the city in real time";

/// Landing page actions, primary first.
pub const HOME_LINKS: &[HomeLink] = &[
    HomeLink {
        route: Route::Map,
        label: "Open the live map",
        primary: true,
    },
    HomeLink {
        route: Route::Report,
        label: "Report a sighting",
        primary: false,
    },
    HomeLink {
        route: Route::Statistics,
        label: "View statistics",
        primary: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_primary_link() {
        assert_eq!(HOME_LINKS.iter().filter(|l| l.primary).count(), 1);
        assert_eq!(HOME_LINKS[0].route, Route::Map);
    }
}
