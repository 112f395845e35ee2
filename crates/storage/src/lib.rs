//! Storage adapters for the quiz engine.
//!
//! [`repository`] defines the table-store contract the rest of the system
//! depends on: five operation shapes (create subject / quiz / question /
//! choices, plus two joined reads) and a connection probe. The engine never
//! assumes a specific backend; [`sqlite`] is the local store and [`rest`]
//! speaks to a hosted PostgREST-style table service.

#![forbid(unsafe_code)]

pub mod repository;
pub mod rest;
pub mod sqlite;
