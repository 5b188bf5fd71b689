//! Core identifier types shared across the domain

pub mod ids;
