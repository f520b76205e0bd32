//! LINE bot core library: configuration, webhook gateway, completion relay, and
//! weather lookup, shared by the `linebot` CLI.

pub mod completion;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod line;
pub mod responder;
pub mod weather;
