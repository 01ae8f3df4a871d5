//! Outbound HTTP: the cover image relay and the contribution calendar feed.

use once_cell::sync::Lazy;

pub mod contributions;
pub mod cover_proxy;

pub use contributions::*;
pub use cover_proxy::*;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);
