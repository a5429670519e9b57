pub use super::addresses::Entity as Addresses;
