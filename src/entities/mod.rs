//! SeaORM entity definitions

pub mod addresses;
pub mod prelude;
