//! Todo API: a small CRUD web service managing todo records, with
//! username/password authentication issuing signed bearer tokens and an
//! IP allow-list gate on the todo controller.

pub mod auth;
pub mod database;
pub mod error;
pub mod ip_filter;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod state;
pub mod validation;
