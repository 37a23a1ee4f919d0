//! Configuration module

mod site;

pub use site::CollectionConfig;
pub use site::ContentConfig;
pub use site::HighlightConfig;
pub use site::MdxConfig;
pub use site::MdxPlugin;
