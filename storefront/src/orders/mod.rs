//! Orders Module
//!
//! Checkout, order history, cancellation and the admin order board. With
//! stock reservation enabled, placing an order takes the ordered quantities
//! out of product stock in the same transaction that stores the order.

mod reservation;
mod service;

pub use service::OrderService;
