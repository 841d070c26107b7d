//! Property-based tests
//!
//! - `pagination_props`: page count and list paging invariants
//!   - Page count covers every document with no empty trailing page
//!   - Ticket pages are always within `1..=total_pages`
//!   - Only the latest request's response is ever displayed
//!
//! - `progress_props`: upload progress reporting
//!   - Percentages stay within 0..=100
//!   - Reports never decrease and end at 100

mod pagination_props;
mod progress_props;
