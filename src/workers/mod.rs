pub mod converter;
pub mod notifier;
