use crate::components::EmbeddedVideoPlayer;
use crate::db::SiteConfig;
use dioxus::prelude::*;

#[component]
pub fn InspirationsView() -> Element {
    let config = use_context::<Signal<SiteConfig>>();
    let config = config();
    let is_mobile = cfg!(feature = "mobile");

    rsx! {
        div { class: "space-y-8",
            header { class: "page-header",
                h1 { class: "page-title", "Inspirations" }
                p { class: "page-subtitle", "Videos worth a watch. Only one plays at a time." }
            }

            if config.featured_videos.is_empty() {
                p { class: "text-sm text-zinc-500", "Nothing featured yet." }
            }

            for video in config.featured_videos.iter() {
                EmbeddedVideoPlayer {
                    key: "{video.bvid}-{video.page.unwrap_or(1)}",
                    bvid: video.bvid.clone(),
                    page: video.page.unwrap_or(1),
                    title: video.title.clone(),
                    cover: video.cover_url(&config.cover_proxy),
                    is_mobile,
                }
            }
        }
    }
}
