pub mod collection;

pub use collection::ColumnCollection;
