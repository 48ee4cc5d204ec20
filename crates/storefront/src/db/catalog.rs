//! The seed catalog.
//!
//! Both storage backends start from this list: the memory store holds it
//! directly, the `PostgreSQL` store receives it through `lucid-cli seed`.

use lucid_core::{Price, ProductId};

use crate::models::Product;

/// Products offered at launch, in id order.
#[must_use]
pub fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "2mg Nicotine Lozenge".to_owned(),
            description: "Our 2mg nicotine lozenge provides a gentle cognitive boost for improved focus and mental clarity.".to_owned(),
            price: Price::from_cents(2499),
            strength_mg: Some(2),
            pack_size: None,
            is_subscription: false,
            image_url: None,
        },
        Product {
            id: ProductId::new(2),
            name: "4mg Nicotine Lozenge".to_owned(),
            description: "Our 4mg nicotine lozenge delivers maximum cognitive enhancement for peak mental performance and intense focus.".to_owned(),
            price: Price::from_cents(2999),
            strength_mg: Some(4),
            pack_size: None,
            is_subscription: true,
            image_url: None,
        },
        Product {
            id: ProductId::new(3),
            name: "Essential Pack".to_owned(),
            description: "Perfect starter pack for enhanced focus and clarity".to_owned(),
            price: Price::from_cents(3999),
            strength_mg: None,
            pack_size: Some(20),
            is_subscription: false,
            image_url: Some("/images/product-20.png".to_owned()),
        },
        Product {
            id: ProductId::new(4),
            name: "Performance Pack".to_owned(),
            description: "Ideal for consistent users seeking better value".to_owned(),
            price: Price::from_cents(6999),
            strength_mg: None,
            pack_size: Some(40),
            is_subscription: false,
            image_url: Some("/images/product-40.png".to_owned()),
        },
        Product {
            id: ProductId::new(5),
            name: "Professional Pack".to_owned(),
            description: "Best value for dedicated high-performers".to_owned(),
            price: Price::from_cents(8999),
            strength_mg: None,
            pack_size: Some(60),
            is_subscription: false,
            image_url: Some("/images/product-60.png".to_owned()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_sequential() {
        let ids: Vec<i32> = seed_products().iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_only_four_mg_is_subscription() {
        let subs: Vec<_> = seed_products()
            .into_iter()
            .filter(|p| p.is_subscription)
            .map(|p| p.id)
            .collect();
        assert_eq!(subs, vec![ProductId::new(2)]);
    }
}
