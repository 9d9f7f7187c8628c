//! Schema detection and standardization for heterogeneous ledger exports

pub mod mapper;
pub mod synonyms;

pub use mapper::SchemaMapper;
pub use synonyms::SynonymTable;
