//! Library crate for chess-swiss-back: the Swiss pairing engine and the tournament
//! admin service built around it.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod pairing;
pub mod routes;
pub mod services;
pub mod state;
