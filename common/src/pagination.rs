//! Abstractions for offset pagination.

/// Paging of a listed result.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Paging {
    /// 1-based index of the page.
    pub page_index: u32,

    /// Maximum number of nodes the page may hold.
    pub page_size: u32,

    /// Total number of nodes matching the listing, as reported by the source
    /// producing it.
    ///
    /// May exceed the number of nodes on the page, and stays intact even when
    /// some nodes of the page are unavailable.
    pub total: u64,
}

impl Paging {
    /// Creates a new [`Paging`] of the given page reporting the given total.
    #[must_use]
    pub const fn new(page_index: u32, page_size: u32, total: u64) -> Self {
        Self {
            page_index,
            page_size,
            total,
        }
    }

    /// Returns the number of nodes preceding this [`Paging`]'s page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        Self::offset_of(self.page_index, self.page_size)
    }

    /// Returns the number of nodes preceding the page with the given
    /// `page_index`, with every page holding `page_size` nodes at most.
    #[must_use]
    pub fn offset_of(page_index: u32, page_size: u32) -> u64 {
        u64::from(page_index.saturating_sub(1)) * u64::from(page_size)
    }
}

/// A page of nodes along with its [`Paging`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<N> {
    /// Nodes of this [`Page`], in the order the source produced them.
    pub nodes: Vec<N>,

    /// [`Paging`] of this [`Page`].
    pub paging: Paging,
}

#[cfg(test)]
mod spec {
    use super::Paging;

    #[test]
    fn offset() {
        assert_eq!(Paging::new(1, 50, 0).offset(), 0);
        assert_eq!(Paging::new(2, 50, 0).offset(), 50);
        assert_eq!(Paging::new(3, 20, 0).offset(), 40);
        assert_eq!(Paging::new(1, 500, 0).offset(), 0);
        assert_eq!(Paging::new(4, 1, 0).offset(), 3);

        // Degenerate page indices cannot underflow.
        assert_eq!(Paging::new(0, 50, 0).offset(), 0);
    }

    #[test]
    fn new() {
        let paging = Paging::new(2, 25, 150);

        assert_eq!(paging.page_index, 2);
        assert_eq!(paging.page_size, 25);
        assert_eq!(paging.total, 150);
    }
}
