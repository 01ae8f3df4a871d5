mod home;
mod inspirations;

pub use home::HomeView;
pub use inspirations::InspirationsView;
