pub mod calc;
pub mod rates;
pub mod serve;
pub mod setup;
pub mod ui;
