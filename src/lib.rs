pub mod appsettings;
pub mod clock;
pub mod delivery;
pub mod format;
pub mod occurrence;
pub mod prayer;
pub mod registry;
pub mod reminder;
pub mod scheduler;
