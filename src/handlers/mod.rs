pub mod home;
pub mod news;
