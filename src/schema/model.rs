//! Storefront entities.
//!
//! Wire and filter names are the PascalCase column names of the backing
//! tables. Navigation collections are not materialized; relations are carried
//! by their foreign-key fields only.

use crate::schema::entity;
use rust_decimal::Decimal;
use uuid::Uuid;

entity! {
    /// A country, keyed by its name.
    pub struct Country in "Country" {
        key name: String as "Name",
        country_id: Uuid as "CountryId",
        code: Option<String> as "Code",
    }
}

entity! {
    pub struct Customer in "Customer" {
        key customer_id: Uuid as "CustomerId",
        name: String as "Name",
        is_active: bool as "IsActive",
        address: Option<String> as "Address",
        country_name: String as "CountryName" = String::from("India") => Country,
    }
}

entity! {
    /// Self-referencing lookup table.
    pub struct Dictionary in "Dictionary" {
        key id: Uuid as "Id",
        name: String as "Name",
        parent_id: Uuid as "ParentId" => Dictionary,
    }
}

entity! {
    pub struct Order in "Order" {
        key order_id: Uuid as "OrderID",
        customer_id: Uuid as "CustomerId" => Customer,
        total_amount: Option<String> as "TotalAmount",
        order_status_id: Uuid as "OrderStatusId" => OrderStatus,
    }
}

entity! {
    pub struct OrderLine in "OrderLine" {
        key order_line_id: Uuid as "OrderLineId",
        order_id: Uuid as "OrderId" => Order,
        product_id: Uuid as "ProductId" => Product,
        quantity: Option<String> as "Quantity",
    }
}

entity! {
    pub struct OrderStatus in "OrderStatus" {
        key order_status_id: Uuid as "OrderStatusId",
        name: Option<String> as "Name",
    }
}

entity! {
    pub struct Product in "Product" {
        key product_id: Uuid as "ProductId",
        name: Option<String> as "Name",
        code: Option<String> as "Code",
        price: Decimal as "Price" = Decimal::from(5),
    }
}

entity! {
    /// A sale of a product. `CustomerId` is free text, not a relation.
    pub struct Sales in "Sales" {
        key sales_id: Uuid as "SalesId",
        name: Option<String> as "Name",
        product_id: Uuid as "ProductId" => Product,
        customer_id: Option<String> as "CustomerId",
    }
}
