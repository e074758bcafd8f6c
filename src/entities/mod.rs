pub mod event;
pub mod location;
pub mod milestone;
pub mod saint;
pub mod saint_year;

pub use event::Entity as Event;
pub use location::Entity as Location;
pub use milestone::Entity as Milestone;
pub use saint::Entity as Saint;
pub use saint_year::Entity as SaintYear;
