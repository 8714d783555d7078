//! Pagination module
//!
//! # Overview
//!
//! List endpoints wrap their results in an envelope carrying a
//! `result_info` block. [`ResultInfo`] models that block and
//! [`is_consistent`] checks that the page the service returned actually
//! matches the page that was asked for and that its counters agree with
//! one another.
//!
//! An inconsistent page is reported through [`Page::consistent`]; it is
//! up to the caller to decide whether to trust, retry or abandon it.

mod types;
mod validate;

pub use types::{Listing, Page, PaginationOptions, ResultInfo};
pub use validate::is_consistent;
