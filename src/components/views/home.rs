use crate::components::{AppView, GithubHeatmap, Icon};
use crate::db::SiteConfig;
use dioxus::prelude::*;

#[component]
pub fn HomeView() -> Element {
    let config = use_context::<Signal<SiteConfig>>();
    let config = config();
    let has_heatmap = config
        .heatmap
        .username
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    let featured = config.featured_videos.len();

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "{config.title}" }
            }

            if has_heatmap {
                section { class: "bg-zinc-800/30 rounded-2xl border border-zinc-700/30 p-6",
                    h2 { class: "text-lg font-semibold text-white mb-4", "Activity" }
                    GithubHeatmap {}
                }
            }

            if featured > 0 {
                Link {
                    to: AppView::InspirationsView {},
                    class: "inline-flex items-center gap-2 text-sm text-zinc-300 hover:text-white transition-colors",
                    Icon { name: "film".to_string(), class: "w-4 h-4".to_string() }
                    "{featured} featured videos"
                }
            }
        }
    }
}
