//! Core types and trait definitions for the Newsroom editorial service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model, the article and comment state machines, the
//! [`store::NewsroomStore`] abstraction, and the [`workflow`] operations that
//! drive the state machines against any store.

pub mod article;
pub mod comment;
pub mod error;
pub mod principal;
pub mod store;
pub mod subject;
pub mod workflow;

pub use error::{Error, Result};
