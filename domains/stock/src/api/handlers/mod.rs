//! HTTP handlers for the stock export domain

pub mod export;
