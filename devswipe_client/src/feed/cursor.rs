/// Identifies one page request: the page it asked for and the session
/// generation it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
}

/// Paging state of the feed. The page counter names the next page to
/// request and only moves after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    page: u32,
    page_size: u32,
    has_more: bool,
    in_flight: Option<FetchTicket>,
}

impl PaginationCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            has_more: true,
            in_flight: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn can_fetch(&self) -> bool {
        self.has_more && self.in_flight.is_none()
    }

    /// Claims the cursor for a request. Returns `None` when another request
    /// is outstanding or the feed is exhausted.
    pub fn begin(&mut self, generation: u64) -> Option<FetchTicket> {
        if !self.can_fetch() {
            return None;
        }
        let ticket = FetchTicket {
            generation,
            page: self.page,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Records a successful page. An empty page ends the feed no matter what
    /// the backend claimed.
    pub fn complete(&mut self, ticket: FetchTicket, item_count: usize, has_more: bool) {
        self.release(ticket);
        self.page = ticket.page + 1;
        self.has_more = has_more && item_count > 0;
    }

    /// Records a failed page; the same page is requested again next time.
    pub fn fail(&mut self, ticket: FetchTicket) {
        self.release(ticket);
    }

    fn release(&mut self, ticket: FetchTicket) {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_request_at_a_time() {
        let mut cursor = PaginationCursor::new(6);
        let ticket = cursor.begin(0).expect("first fetch");
        assert_eq!(ticket.page, 1);
        assert_eq!(cursor.begin(0), None);

        cursor.complete(ticket, 6, true);
        assert_eq!(cursor.page(), 2);
        assert_eq!(cursor.begin(0).map(|t| t.page), Some(2));
    }

    #[test]
    fn failure_keeps_the_page_number() {
        let mut cursor = PaginationCursor::new(6);
        let ticket = cursor.begin(0).unwrap();
        cursor.fail(ticket);
        assert_eq!(cursor.page(), 1);
        assert!(cursor.has_more());
        assert_eq!(cursor.begin(0).map(|t| t.page), Some(1));
    }

    #[test]
    fn empty_page_is_terminal() {
        let mut cursor = PaginationCursor::new(6);
        let ticket = cursor.begin(0).unwrap();
        cursor.complete(ticket, 0, true);
        assert!(!cursor.has_more());
        assert_eq!(cursor.begin(0), None);
    }

    #[test]
    fn page_size_is_at_least_one() {
        assert_eq!(PaginationCursor::new(0).page_size(), 1);
    }
}
