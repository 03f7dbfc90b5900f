// greenhouse_storefront/src/models/status.rs

//! Status badges and the shared transition-table contract.
//!
//! Every status enum declares which statuses may follow it. Services call
//! [`Lifecycle::transition`] before writing a status, so an invalid move is
//! rejected before it reaches the store.

use serde::Serialize;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
  Gray,
  Yellow,
  Blue,
  Indigo,
  Green,
  Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
  pub label: &'static str,
  pub color: BadgeColor,
}

impl StatusBadge {
  pub const fn new(label: &'static str, color: BadgeColor) -> Self {
    Self { label, color }
  }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {entity} status transition: {from} -> {to}")]
pub struct InvalidTransition {
  pub entity: &'static str,
  pub from: &'static str,
  pub to: &'static str,
}

pub trait Lifecycle: Copy + Eq + Debug + 'static {
  const ENTITY: &'static str;

  fn as_str(self) -> &'static str;

  /// Statuses reachable in one move. Empty for terminal statuses.
  fn allowed_next(self) -> &'static [Self];

  fn badge(self) -> StatusBadge;

  fn can_transition_to(self, next: Self) -> bool {
    self.allowed_next().contains(&next)
  }

  fn is_terminal(self) -> bool {
    self.allowed_next().is_empty()
  }

  fn transition(self, next: Self) -> Result<Self, InvalidTransition> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(InvalidTransition {
        entity: Self::ENTITY,
        from: self.as_str(),
        to: next.as_str(),
      })
    }
  }
}
