//! Routes of the site.

use crate::components::views::{HomeView, InspirationsView};
use crate::components::AppShell;
use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum AppView {
    #[layout(AppShell)]
        #[route("/")]
        HomeView {},
        #[route("/inspirations")]
        InspirationsView {},
}

pub fn view_label(view: &AppView) -> &'static str {
    match view {
        AppView::HomeView {} => "Home",
        AppView::InspirationsView {} => "Inspirations",
    }
}

/// Entries shown in the header, in order.
pub fn nav_entries() -> [(AppView, &'static str); 2] {
    [
        (AppView::HomeView {}, "home"),
        (AppView::InspirationsView {}, "film"),
    ]
}
