//! Command implementations for the prefab CLI
//!
//! Each command renders part of the normalized configuration. Rendering is
//! kept separate from printing so it can be tested directly.

pub mod check;
pub mod hosts;
pub mod roles;
pub mod show;

/// Width of the label column when listing named entries.
fn label_width<'a>(labels: impl Iterator<Item = &'a String>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}
