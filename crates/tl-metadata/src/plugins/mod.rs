//! Standard metadata plugins

pub mod actions;
pub mod legacy;
pub mod section;
pub mod version;

pub use actions::ActionsPlugin;
pub use legacy::LegacyPlugin;
pub use section::SectionPlugin;
pub use version::VersionPlugin;

/// List sections stored one per file, in registration order
pub const LIST_SECTIONS: [&str; 5] = [
    "tables",
    "functions",
    "query_collections",
    "allow_list",
    "remote_schemas",
];

#[cfg(test)]
#[path = "plugins_test.rs"]
mod tests;
