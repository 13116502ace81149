pub mod comparator;
pub mod tax;

pub use comparator::{
    compare_deposits, DepositComparator, DepositComparison, DepositInput, DepositScenario,
    DepositYear, ScenarioSelector,
};
pub use tax::YearTax;
