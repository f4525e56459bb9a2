//! Fixtures
//!
//! The demo catalog used by tests and the example: the reference deploy's
//! two products, software installations with per-version priced variants.

use rusty_money::{Money, iso::USD};

use crate::catalog::{Catalog, CatalogError, Product, ProductId, Variant};

/// Build the demo catalog: Windows and Office installation services.
///
/// # Errors
///
/// Returns a [`CatalogError`] if the catalog fails validation; the fixture
/// data is well-formed, so this only happens if the data is edited badly.
pub fn demo_catalog() -> Result<Catalog, CatalogError> {
    let products = vec![
        Product::new(
            ProductId::new(1),
            "Instalación de Windows",
            "Instalación profesional del sistema operativo Windows con licencia digital.",
            vec![
                Variant::new("win7", "Windows 7 Professional", Money::from_minor(10_00, USD)),
                Variant::new("win8", "Windows 8/8.1 Pro", Money::from_minor(10_00, USD)),
                Variant::new("win10", "Windows 10 Pro", Money::from_minor(15_00, USD)),
                Variant::new("win11", "Windows 11 Pro", Money::from_minor(15_00, USD)),
            ],
        ),
        Product::new(
            ProductId::new(2),
            "Instalación de Microsoft Office",
            "Instalación completa de Microsoft Office con licencia digital.",
            vec![
                Variant::new("office2010", "Office 2010", Money::from_minor(10_00, USD)),
                Variant::new("office2013", "Office 2013", Money::from_minor(10_00, USD)),
                Variant::new("office2016", "Office 2016", Money::from_minor(10_00, USD)),
                Variant::new("office2019", "Office 2019", Money::from_minor(15_00, USD)),
                Variant::new("office2021", "Office 2021", Money::from_minor(15_00, USD)),
            ],
        ),
    ];

    Catalog::new(products, USD)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn demo_catalog_is_well_formed() -> TestResult {
        let catalog = demo_catalog()?;

        assert_eq!(catalog.products().len(), 2);
        assert_eq!(catalog.currency(), USD);

        let windows = catalog.product(ProductId::new(1))?;

        assert_eq!(windows.variants().len(), 4);

        Ok(())
    }
}
