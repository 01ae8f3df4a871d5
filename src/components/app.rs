use crate::components::{nav_entries, view_label, AppView, Icon};
use crate::db::{initialize_database, load_site_config, SiteConfig};
use crate::playback::PlaybackBus;
use dioxus::prelude::*;

/// Page layout. Owns the page's playback bus and the loaded site config;
/// routes render only once the config is in.
#[component]
pub fn AppShell() -> Element {
    let mut site_config = use_signal(SiteConfig::default);
    let mut config_loaded = use_signal(|| false);

    // One bus per page: players mounted under this shell never overlap.
    use_context_provider(PlaybackBus::new);
    use_context_provider(|| site_config);

    use_effect(move || {
        spawn(async move {
            if let Err(err) = initialize_database().await {
                tracing::warn!("failed to initialize site store: {err}");
            }
            match load_site_config().await {
                Ok(config) => site_config.set(config),
                Err(err) => tracing::warn!("failed to load site config, using defaults: {err}"),
            }
            config_loaded.set(true);
        });
    });

    let view = use_route::<AppView>();
    let title = site_config().title;

    rsx! {
        div { class: "app-container flex flex-col min-h-screen text-white bg-zinc-950",
            header { class: "border-b border-zinc-800/60 bg-zinc-950/80 backdrop-blur-xl",
                div { class: "flex items-center justify-between px-4 py-3 max-w-5xl mx-auto",
                    div { class: "flex flex-col",
                        span { class: "text-xs uppercase tracking-widest text-zinc-500", "{title}" }
                        span { class: "text-sm font-semibold text-white", "{view_label(&view)}" }
                    }
                    nav { class: "flex items-center gap-1",
                        for (target, icon) in nav_entries() {
                            Link {
                                key: "{target}",
                                to: target.clone(),
                                class: "flex items-center gap-2 px-3 py-2 rounded-lg text-zinc-400 hover:text-white hover:bg-zinc-800/60 transition-colors",
                                active_class: "text-white bg-zinc-800/60",
                                Icon { name: icon.to_string(), class: "w-4 h-4".to_string() }
                                span { class: "text-sm", "{view_label(&target)}" }
                            }
                        }
                    }
                }
            }

            main { class: "flex-1 overflow-y-auto main-scroll",
                div { class: "page-shell max-w-5xl mx-auto px-4 py-6",
                    if config_loaded() {
                        Outlet::<AppView> {}
                    } else {
                        div { class: "flex items-center justify-center py-24 text-zinc-500",
                            Icon { name: "loader".to_string(), class: "w-6 h-6".to_string() }
                        }
                    }
                }
            }
        }
    }
}
