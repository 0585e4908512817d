pub mod category;
pub mod event;

pub use category::{Category, CategoryInput};
pub use event::{AddressFields, Event, EventInput, EventResponse, MapMarker};
