pub mod book_details;
pub mod create_book;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use catalog_db::BookStore;
use catalog_kernel::{settings::Settings, ModuleRegistry};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn BookStore>, settings: &Settings) {
    registry.register(book_details::create_module(Arc::clone(&store)));
    registry.register(create_book::create_module(store, settings));
}
