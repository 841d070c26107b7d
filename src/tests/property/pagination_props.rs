//! Property-based tests for list paging
//!
//! Tests invariants:
//! - Page count covers every document with no empty trailing page
//! - Requested pages are clamped to at least 1
//! - Only the most recent request's response is displayed

use proptest::prelude::*;

use crate::core::api::{total_pages, DocumentId, DocumentPage, DocumentSummary, PAGE_SIZE};
use crate::core::workflow::ListWorkflow;

fn page_of(tag: u64, total: u64) -> DocumentPage {
    DocumentPage {
        documents: vec![DocumentSummary {
            id: DocumentId::new(format!("doc-{tag}")),
            filename: format!("{tag}.pdf"),
            upload_date: None,
            status: None,
        }],
        total,
    }
}

proptest! {
    /// Property: `total_pages` is the smallest page count holding `total` docs
    #[test]
    fn prop_total_pages_is_ceiling(total in 0u64..1_000_000) {
        let pages = total_pages(total);
        prop_assert!(pages * PAGE_SIZE >= total);
        if total > 0 {
            prop_assert!((pages - 1) * PAGE_SIZE < total, "empty trailing page for {}", total);
        } else {
            prop_assert_eq!(pages, 0);
        }
    }

    /// Property: more documents never means fewer pages
    #[test]
    fn prop_total_pages_is_monotonic(a in 0u64..100_000, b in 0u64..100_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(total_pages(lo) <= total_pages(hi));
    }

    /// Property: tickets never carry page 0
    #[test]
    fn prop_request_clamps_to_first_page(page in 0u64..1_000) {
        let mut list = ListWorkflow::new();
        let ticket = list.request(page);
        prop_assert!(ticket.page >= 1);
        prop_assert_eq!(ticket.page, page.max(1));
    }

    /// Property: whatever order responses arrive in, the displayed page is the
    /// one requested last
    #[test]
    fn prop_latest_request_wins(
        pages in prop::collection::vec(1u64..20, 1..8),
        order in any::<u64>(),
    ) {
        let mut list = ListWorkflow::new();
        let mut tickets: Vec<_> = pages.iter().map(|p| list.request(*p)).collect();
        let latest = *tickets.last().unwrap();

        // Deterministic shuffle driven by the generated seed
        let mut seed = order;
        for i in (1..tickets.len()).rev() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (seed % (i as u64 + 1)) as usize;
            tickets.swap(i, j);
        }

        for ticket in tickets {
            list.apply(ticket, Ok(page_of(ticket.seq, 500)));
        }

        prop_assert_eq!(list.page(), latest.page);
        let expected = format!("doc-{}", latest.seq);
        prop_assert_eq!(list.documents()[0].id.as_str(), expected.as_str());
    }
}
