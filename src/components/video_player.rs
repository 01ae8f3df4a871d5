use crate::components::Icon;
use crate::db::SiteConfig;
use crate::playback::{EmbedHost, EmbedRequest, EmbedSource, MediaController, PlaybackBus};
#[cfg(target_arch = "wasm32")]
use crate::playback::ElementViewport;
use dioxus::prelude::*;
use std::cell::Cell;

const IFRAME_SANDBOX: &str = "allow-same-origin allow-scripts allow-popups allow-forms allow-presentation allow-top-navigation-by-user-activation";
const IFRAME_ALLOW: &str = "autoplay; fullscreen; picture-in-picture; encrypted-media";

/// What the player renders while an embed is live.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedEmbed {
    pub src: String,
    /// Bumped on every mount so the iframe is recreated rather than reused.
    pub generation: u64,
}

/// Mounts embeds by writing into the player's signal.
pub struct SignalEmbedHost {
    slot: Signal<Option<MountedEmbed>>,
    next_generation: Cell<u64>,
}

impl SignalEmbedHost {
    pub fn new(slot: Signal<Option<MountedEmbed>>) -> Self {
        Self {
            slot,
            next_generation: Cell::new(0),
        }
    }
}

impl EmbedHost for SignalEmbedHost {
    type Handle = u64;

    fn mount(&self, source: &EmbedSource) -> u64 {
        let generation = self.next_generation.get() + 1;
        self.next_generation.set(generation);
        let mut slot = self.slot;
        slot.set(Some(MountedEmbed {
            src: source.as_str().to_string(),
            generation,
        }));
        generation
    }

    fn unmount(&self, handle: u64) {
        // The scope may already be gone during teardown.
        let mut slot = self.slot;
        let Ok(mut current) = slot.try_write() else {
            return;
        };
        if current.as_ref().map(|embed| embed.generation) == Some(handle) {
            *current = None;
        }
    }
}

/// A Bilibili player that shows a poster until clicked and yields to any
/// other player on the page.
#[component]
pub fn EmbeddedVideoPlayer(
    bvid: String,
    #[props(default = 1)] page: u32,
    #[props(!optional, default)] title: Option<String>,
    #[props(!optional, default)] cover: Option<String>,
    #[props(default = false)] is_mobile: bool,
) -> Element {
    let bus = use_context::<PlaybackBus>();
    let config = use_context::<Signal<SiteConfig>>();
    let mounted = use_signal(|| None::<MountedEmbed>);

    let controller = use_hook(|| {
        let config = config.peek();
        MediaController::new(
            &bus,
            SignalEmbedHost::new(mounted),
            config.embed.clone(),
            config.threshold(),
        )
    });
    let container_id = controller.id().dom_key();

    #[cfg(target_arch = "wasm32")]
    {
        let controller = controller.clone();
        let container_id = container_id.clone();
        use_effect(move || {
            controller.watch_viewport(&ElementViewport::new(container_id.clone()));
        });
    }

    use_drop({
        let controller = controller.clone();
        move || controller.teardown()
    });

    let label = title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| bvid.clone());
    let frame_class = if is_mobile {
        "relative w-full aspect-video overflow-hidden rounded-lg bg-zinc-900"
    } else {
        "relative w-full aspect-video overflow-hidden rounded-lg bg-zinc-900 min-h-[480px]"
    };

    let on_play = {
        let controller = controller.clone();
        let bvid = bvid.clone();
        move |_| {
            controller.activate(&EmbedRequest::new(bvid.clone()).with_track(page));
        }
    };

    rsx! {
        div {
            id: "{container_id}",
            class: "w-full max-w-full sm:max-w-5xl mx-auto mb-4",
            div { class: "{frame_class}",
                {
                    match mounted() {
                        Some(embed) => rsx! {
                            iframe {
                                key: "{embed.generation}",
                                src: "{embed.src}",
                                title: "{label}",
                                class: "absolute inset-0 w-full h-full",
                                style: "border: none;",
                                "scrolling": "no",
                                "frameborder": "0",
                                "loading": "lazy",
                                "allow": IFRAME_ALLOW,
                                "allowfullscreen": "true",
                                "sandbox": IFRAME_SANDBOX,
                                "referrerpolicy": "no-referrer",
                            }
                        },
                        None => rsx! {
                            button {
                                r#type: "button",
                                class: "group absolute inset-0 w-full h-full flex items-center justify-center cursor-pointer",
                                aria_label: "Play {label}",
                                onclick: on_play,
                                if let Some(src) = cover.clone() {
                                    img {
                                        src: "{src}",
                                        alt: "{label}",
                                        class: "absolute inset-0 w-full h-full object-cover",
                                        loading: "lazy",
                                    }
                                }
                                div { class: "relative z-10 w-16 h-16 rounded-full bg-black/60 flex items-center justify-center text-white group-hover:bg-[#00AEEC] transition-colors",
                                    Icon { name: "play".to_string(), class: "w-8 h-8 ml-1".to_string() }
                                }
                            }
                        },
                    }
                }
            }
            div { class: "flex items-center gap-2 mt-2 text-sm text-zinc-400",
                Icon { name: "tv".to_string(), class: "w-5 h-5".to_string() }
                span { class: "font-mono", "BV: {bvid}" }
                if let Some(title) = title.as_ref().filter(|t| !t.trim().is_empty()) {
                    span { class: "text-zinc-200 truncate", "{title}" }
                }
            }
        }
    }
}
