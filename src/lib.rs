//! Personal site widgets: embedded video players that never play over each
//! other, a contribution heatmap, and the cover image proxy backing them.

pub mod api;
pub mod components;
pub mod db;
pub mod playback;
