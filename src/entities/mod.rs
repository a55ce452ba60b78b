//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod check_detail;
pub mod company_settings;
pub mod customer;
pub mod customer_review;
pub mod employee;
pub mod expense;
pub mod expense_type;
pub mod partner;
pub mod payment_voucher;
pub mod project_type;
pub mod quotation;
pub mod quotation_item;
pub mod receipt_voucher;
pub mod revenue;
pub mod revenue_type;
pub mod sea_orm_active_enums;
pub mod shareen;
pub mod supplier;
pub mod work_order;

// Re-export specific types to avoid conflicts
pub use check_detail::{Entity as CheckDetail, Model as CheckDetailModel};
pub use company_settings::{Entity as CompanySettings, Model as CompanySettingsModel};
pub use customer::{Entity as Customer, Model as CustomerModel};
pub use customer_review::{Entity as CustomerReview, Model as CustomerReviewModel};
pub use employee::{Entity as Employee, Model as EmployeeModel};
pub use expense::{Entity as Expense, Model as ExpenseModel};
pub use expense_type::{Entity as ExpenseType, Model as ExpenseTypeModel};
pub use partner::{Entity as Partner, Model as PartnerModel};
pub use payment_voucher::{Entity as PaymentVoucher, Model as PaymentVoucherModel};
pub use project_type::{Entity as ProjectType, Model as ProjectTypeModel};
pub use quotation::{Entity as Quotation, Model as QuotationModel};
pub use quotation_item::{Entity as QuotationItem, Model as QuotationItemModel};
pub use receipt_voucher::{Entity as ReceiptVoucher, Model as ReceiptVoucherModel};
pub use revenue::{Entity as Revenue, Model as RevenueModel};
pub use revenue_type::{Entity as RevenueType, Model as RevenueTypeModel};
pub use shareen::{Entity as Shareen, Model as ShareenModel};
pub use supplier::{Entity as Supplier, Model as SupplierModel};
pub use work_order::{Entity as WorkOrder, Model as WorkOrderModel};
