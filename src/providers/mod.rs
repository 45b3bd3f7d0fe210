pub mod google_converter;

pub use google_converter::GoogleRatioProvider;
