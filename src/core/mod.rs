//! Business operations, independent of the HTTP layer.
//!
//! Every function takes a `SeaORM` connection and returns [`crate::errors::Result`].
//! Functions generic over `ConnectionTrait` can also run inside a caller's
//! transaction.

pub mod capital;
pub mod catalog;
pub mod check;
pub mod codes;
pub mod customer;
pub mod employee;
pub mod expense;
pub mod guard;
pub mod ledger;
pub mod pagination;
pub mod partner;
pub mod quotation;
pub mod review;
pub mod revenue;
pub mod settings;
pub mod shareen;
pub mod supplier;
pub mod validate;
pub mod voucher;
pub mod work_order;
