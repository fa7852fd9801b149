pub mod account;
pub mod adjustment;
pub mod invoice;
pub mod redemption;
pub mod subscription;
pub mod transaction;

pub use self::{
    account::Account,
    adjustment::{Adjustment, TaxDetail},
    invoice::Invoice,
    redemption::Redemption,
    subscription::{Plan, Subscription},
    transaction::Transaction,
};
