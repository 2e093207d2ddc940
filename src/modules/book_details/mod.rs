pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use catalog_db::BookStore;
use catalog_http::AppError;
use catalog_kernel::{InitCtx, Module};

use crate::utils::escape_html;
use models::{BookDetailsQuery, BookDetailsResponse};

/// Read-only book details route
pub struct BookDetailsModule {
    store: Arc<dyn BookStore>,
}

impl BookDetailsModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BookDetailsModule {
    fn name(&self) -> &'static str {
        "book_dtls"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "book details module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(book_details))
            .with_state(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Details of a book and its copies",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "query",
                            "required": false,
                            "schema": { "type": "string" },
                            "description": "Book id"
                        }],
                        "responses": {
                            "200": {
                                "description": "Book title, author name and copies",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookDetails" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book has this id",
                                "content": {
                                    "text/plain": {
                                        "schema": { "$ref": "#/components/schemas/PlainTextError" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Book or copies lookup failed",
                                "content": {
                                    "text/plain": {
                                        "schema": { "$ref": "#/components/schemas/PlainTextError" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookDetails": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": {
                                "type": "string",
                                "description": "Author display name, family name first"
                            },
                            "copies": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BookCopy" }
                            }
                        },
                        "required": ["title", "author", "copies"]
                    },
                    "BookCopy": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "book": { "type": "string" },
                            "imprint": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["Available", "Maintenance", "Loaned", "Reserved"]
                            },
                            "due_back": { "type": ["string", "null"], "format": "date" }
                        },
                        "required": ["id", "book", "imprint", "status"]
                    }
                }
            }
        }))
    }
}

/// Book details endpoint
///
/// The book and its copies are looked up together; either failing fails the request.
async fn book_details(
    State(store): State<Arc<dyn BookStore>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BookDetailsResponse>, AppError> {
    let id = BookDetailsQuery::from_pairs(pairs).id.unwrap_or_default();

    let (book, copies) = tokio::try_join!(store.get_book(&id), store.get_book_details(&id))
        .map_err(|err| AppError::internal(format!("Error fetching book {}", escape_html(&id)), err))?;

    let Some(book) = book else {
        return Err(AppError::not_found(format!(
            "Book {} not found",
            escape_html(&id)
        )));
    };

    Ok(Json(BookDetailsResponse {
        title: book.title,
        author: book.author.name(),
        copies,
    }))
}

/// Create a new instance of the book details module
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BookDetailsModule::new(store))
}
