//! Page addressing and resolution types

use std::fmt;

use serde::Serialize;

/// 1-based page number as used at every public boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageNumber(usize);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// `None` for page 0
    pub fn new(page: usize) -> Option<Self> {
        (page >= 1).then_some(Self(page))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// 0-based index for the rendering library
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// All pages of a document with `count` pages
    pub fn all(count: usize) -> impl Iterator<Item = PageNumber> {
        (1..=count).map(PageNumber)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rendering resolution in dots per inch, always within [72, 600]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dpi(u32);

impl Dpi {
    pub const MIN: u32 = 72;
    pub const MAX: u32 = 600;
    pub const DEFAULT: Dpi = Dpi(200);
    pub const THUMBNAIL: Dpi = Dpi(72);

    /// `None` when outside [72, 600]
    pub fn new(dpi: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&dpi).then_some(Self(dpi))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Scale factor over PDF points (72 per inch)
    pub fn scale(self) -> f32 {
        self.0 as f32 / 72.0
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_bounds() {
        assert!(PageNumber::new(0).is_none());
        let page = PageNumber::new(3).unwrap();
        assert_eq!(page.get(), 3);
        assert_eq!(page.index(), 2);
        assert_eq!(PageNumber::default(), PageNumber::FIRST);
    }

    #[test]
    fn test_page_number_all() {
        let pages: Vec<usize> = PageNumber::all(3).map(PageNumber::get).collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(PageNumber::all(0).count(), 0);
    }

    #[test]
    fn test_dpi_range() {
        assert!(Dpi::new(71).is_none());
        assert!(Dpi::new(601).is_none());
        assert_eq!(Dpi::new(72), Some(Dpi::THUMBNAIL));
        assert_eq!(Dpi::new(600).map(Dpi::get), Some(600));
        assert_eq!(Dpi::default().get(), 200);
    }

    #[test]
    fn test_dpi_scale() {
        assert_eq!(Dpi::THUMBNAIL.scale(), 1.0);
        assert_eq!(Dpi::new(144).unwrap().scale(), 2.0);
    }
}
