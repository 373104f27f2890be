// src/menu.rs
//
// Lógica do painel do cardápio que não depende de HTTP.

pub mod actions;
pub mod display;
pub mod reorder;
pub mod selection;
