pub mod categories;
pub mod events;

pub use categories::CategoryService;
pub use events::{EventListing, EventService};
