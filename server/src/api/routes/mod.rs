//! API route handlers

pub mod chat;
pub mod emoji_custom;
pub mod engagement;
pub mod health;
pub mod rooms;
pub mod teams;
pub mod users;
