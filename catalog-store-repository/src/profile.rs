//! Named populate profiles.
//!
//! Each profile fixes which relations are loaded with a product, so the set
//! of queries the store can be asked to run is finite and testable.

/// Which relations to load together with a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateProfile {
    /// Everything the search document needs: category with its ancestor
    /// chain, tags, seller with metadata and avatar, images, subcategories.
    ProductFull,
    /// Direct category (no ancestors) and images only.
    ProductCard,
}

impl PopulateProfile {
    pub fn category(&self) -> bool {
        true
    }

    /// Walk the category's parent links up to the root.
    pub fn category_ancestors(&self) -> bool {
        matches!(self, PopulateProfile::ProductFull)
    }

    pub fn tags(&self) -> bool {
        matches!(self, PopulateProfile::ProductFull)
    }

    pub fn seller(&self) -> bool {
        matches!(self, PopulateProfile::ProductFull)
    }

    pub fn images(&self) -> bool {
        true
    }

    pub fn subcategories(&self) -> bool {
        matches!(self, PopulateProfile::ProductFull)
    }
}
