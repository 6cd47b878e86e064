pub mod auth;
pub mod calendars;
pub mod join;
pub mod logout;
