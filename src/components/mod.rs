//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod github_heatmap;
mod icons;
mod video_player;
pub mod views;

pub use app::*;
pub use app_view::*;
pub use github_heatmap::*;
pub use icons::*;
pub use video_player::*;
