use crate::api::{fetch_contributions, layout_weeks, level_color, week_start_day, ContributionDay};
use crate::components::Icon;
use crate::db::{HeatmapSettings, SiteConfig};
#[cfg(target_arch = "wasm32")]
use crate::playback::ElementViewport;
#[cfg(not(target_arch = "wasm32"))]
use crate::playback::NoViewport;
use crate::playback::{InstanceId, Observation, ViewportObserver};
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

const HEATMAP_FALLBACK: &str = "Contribution activity is unavailable right now.";

#[derive(Debug, Clone, PartialEq)]
struct HeatCell {
    color: Option<String>,
    tooltip: Option<String>,
}

impl HeatCell {
    fn style(&self, block: u32) -> String {
        match &self.color {
            Some(color) => format!(
                "width: {block}px; height: {block}px; border-radius: 2px; background-color: {color};"
            ),
            None => format!("width: {block}px; height: {block}px;"),
        }
    }
}

fn heatmap_columns(days: &[ContributionDay], settings: &HeatmapSettings) -> Vec<Vec<HeatCell>> {
    layout_weeks(days, week_start_day(settings.week_start))
        .into_iter()
        .map(|week| {
            week.into_iter()
                .map(|slot| match slot {
                    Some(day) => HeatCell {
                        color: Some(level_color(&settings.theme, day.level).to_string()),
                        tooltip: Some(match day.count {
                            1 => format!("1 contribution on {}", day.date),
                            n => format!("{n} contributions on {}", day.date),
                        }),
                    },
                    None => HeatCell {
                        color: None,
                        tooltip: None,
                    },
                })
                .collect()
        })
        .collect()
}

/// Contribution calendar for the configured GitHub user. Nothing is fetched
/// until the widget first scrolls into view.
#[component]
pub fn GithubHeatmap(#[props(!optional, default)] username: Option<String>) -> Element {
    let config = use_context::<Signal<SiteConfig>>();
    let mut revealed = use_signal(|| false);
    let container_id = use_hook(|| format!("heatmap-{}", InstanceId::next().get()));
    let watcher = use_hook(|| Rc::new(RefCell::new(None::<Observation>)));

    #[cfg(target_arch = "wasm32")]
    let observer = ElementViewport::new(container_id.clone());
    #[cfg(not(target_arch = "wasm32"))]
    let observer = NoViewport;

    use_effect(move || {
        if revealed() {
            watcher.borrow_mut().take();
            return;
        }
        if watcher.borrow().is_some() {
            return;
        }

        let threshold = config.peek().threshold();
        let on_change = Rc::new(move |visible: bool| {
            if visible && !*revealed.peek() {
                let mut revealed = revealed;
                revealed.set(true);
            }
        });
        match observer.observe(threshold, on_change) {
            Some(observation) => *watcher.borrow_mut() = Some(observation),
            // No way to tell when we are on screen; load right away.
            None => revealed.set(true),
        }
    });

    let contributions = use_resource(move || {
        let visible = revealed();
        let settings = config().heatmap;
        let username = username
            .clone()
            .or_else(|| settings.username.clone())
            .filter(|name| !name.trim().is_empty());
        async move {
            if !visible {
                return None;
            }
            let username = username?;
            let result = fetch_contributions(&settings, &username)
                .await
                .map(|days| heatmap_columns(&days, &settings))
                .map_err(|err| {
                    tracing::warn!(%username, error = %err, "failed to load contributions");
                    err.to_string()
                });
            Some(result)
        }
    });

    let settings = config().heatmap;
    let block = settings.block_size;
    let margin = settings.block_margin;

    rsx! {
        section {
            id: "{container_id}",
            class: "w-full overflow-x-auto py-2",
            {
                match contributions() {
                    Some(Some(Ok(columns))) => rsx! {
                        div { class: "flex", style: "gap: {margin}px;",
                            for (week_index, week) in columns.into_iter().enumerate() {
                                div {
                                    key: "{week_index}",
                                    class: "flex flex-col",
                                    style: "gap: {margin}px;",
                                    for (day_index, cell) in week.into_iter().enumerate() {
                                        div {
                                            key: "{day_index}",
                                            title: cell.tooltip.clone().unwrap_or_default(),
                                            style: cell.style(block),
                                        }
                                    }
                                }
                            }
                        }
                    },
                    Some(Some(Err(_))) => rsx! {
                        p { class: "text-sm text-zinc-500", "{HEATMAP_FALLBACK}" }
                    },
                    Some(None) if revealed() => rsx! {},
                    _ => rsx! {
                        div { class: "flex items-center gap-2 text-sm text-zinc-500",
                            Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                            "Loading activity..."
                        }
                    },
                }
            }
        }
    }
}
