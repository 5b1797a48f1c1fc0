pub mod announcements;
pub mod root;
