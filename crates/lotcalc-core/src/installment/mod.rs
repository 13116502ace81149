//! Installment plans: a short program without surcharge and a long,
//! surcharged one, each across three down-payment tiers.

pub mod plan;
pub mod schedule;

pub use plan::{
    plan_installments, HorizonPlan, InstallmentInput, InstallmentPlan, InstallmentPlanner,
};
pub use schedule::{build_schedule, BalloonPayment, TierSchedule};
