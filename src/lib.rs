//! MedMind: a small web front-end that turns health questions into templated
//! prompts for a remote chat-completion service and renders the replies.

pub mod completion;
pub mod config;
pub mod controller;
pub mod error;
pub mod prompts;
pub mod session;
pub mod web;
