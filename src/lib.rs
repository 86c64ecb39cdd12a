//! Product listing viewer.
//!
//! The view engine ([`view::ViewEngine`]) filters, paginates and projects a
//! snapshot of heterogeneous JSON records through a [`columns::ColumnModel`].
//! It does not know about terminals; [`model`], [`controller`] and [`ui`]
//! wire it to a ratatui frontend.

pub mod columns;
pub mod controller;
pub mod domain;
pub mod filter;
pub mod inputter;
pub mod model;
pub mod pagination;
pub mod products;
pub mod snapshot;
pub mod ui;
pub mod view;
