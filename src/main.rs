use dioxus::prelude::*;

use pagecast::components::AppView;

const SITE_CSS: Asset = asset!("/assets/styling/site.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        document::Meta { name: "theme-color", content: "#09090b" }
        document::Stylesheet { href: SITE_CSS }

        Router::<AppView> {}
    }
}
