//! MO2 configuration files.

pub mod ini;
pub mod modlist;
pub mod organizer_ini;
