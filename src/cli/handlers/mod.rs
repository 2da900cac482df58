// This module contains the logic for each CLI action.

pub mod check;
pub mod commons;
pub mod list;
pub mod run;
