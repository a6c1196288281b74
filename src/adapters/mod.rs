// Adapters layer: concrete implementations of the domain ports.

pub mod tabular;

pub use tabular::CsvReader;
