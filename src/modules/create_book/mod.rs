pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use catalog_db::BookStore;
use catalog_http::{AppError, FormOrJson, RateLimitLayer};
use catalog_kernel::{settings::Settings, InitCtx, Module};

use crate::utils::escape_html;
use models::CreateBookRequest;

/// Body returned when a creation request lacks one of its four fields.
pub const INVALID_INPUTS: &str = "Invalid Inputs";

#[derive(Clone)]
struct CreateBookState {
    store: Arc<dyn BookStore>,
    strict_validation: bool,
}

/// Rate-limited book creation route
pub struct CreateBookModule {
    state: CreateBookState,
    rate_limit: RateLimitLayer,
}

impl CreateBookModule {
    pub fn new(store: Arc<dyn BookStore>, settings: &Settings) -> Self {
        Self {
            state: CreateBookState {
                store,
                strict_validation: settings.books.strict_validation,
            },
            rate_limit: RateLimitLayer::from_settings(&settings.rate_limit),
        }
    }
}

#[async_trait]
impl Module for CreateBookModule {
    fn name(&self) -> &'static str {
        "newbook"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            max_requests = ctx.settings.rate_limit.max_requests,
            window_secs = ctx.settings.rate_limit.window_secs,
            strict_validation = self.state.strict_validation,
            "book creation module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        // route_layer: the limiter only sees matched requests and runs before body parsing.
        Router::new()
            .route("/", post(create_book))
            .route_layer(self.rate_limit.clone())
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Create a book for an existing author and genre",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                },
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBook" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "The saved book, or the text `Invalid Inputs` when a field is missing",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookRecord" }
                                    },
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Malformed body, or a missing field under strict validation",
                                "content": {
                                    "text/plain": {
                                        "schema": { "$ref": "#/components/schemas/PlainTextError" }
                                    }
                                }
                            },
                            "429": {
                                "description": "Too many requests from this client address",
                                "content": {
                                    "text/plain": {
                                        "schema": { "$ref": "#/components/schemas/PlainTextError" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Author or genre missing, or the store failed",
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
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "familyName": { "type": "string" },
                            "firstName": { "type": "string" },
                            "genreName": { "type": "string" },
                            "bookTitle": { "type": "string" }
                        },
                        "required": ["familyName", "firstName", "genreName", "bookTitle"]
                    },
                    "BookRecord": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string", "description": "Author id" },
                            "genre": {
                                "type": "array",
                                "items": { "type": "string", "description": "Genre id" }
                            }
                        },
                        "required": ["id", "title", "author", "genre"]
                    }
                }
            }
        }))
    }
}

/// Create book endpoint
async fn create_book(
    State(state): State<CreateBookState>,
    FormOrJson(request): FormOrJson<CreateBookRequest>,
) -> Result<Response, AppError> {
    let Some(new_book) = request.complete() else {
        let status = if state.strict_validation {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        return Ok((status, INVALID_INPUTS).into_response());
    };

    let saved = state
        .store
        .save_book_of_existing_author_and_genre(
            new_book.family_name,
            new_book.first_name,
            new_book.genre_name,
            new_book.book_title,
        )
        .await
        .map_err(|err| {
            let message = format!("Error creating book: {}", escape_html(err.public_message()));
            AppError::internal(message, err)
        })?;

    tracing::info!(book_id = %saved.id, "book created");
    Ok(Json(saved).into_response())
}

/// Create a new instance of the book creation module
pub fn create_module(store: Arc<dyn BookStore>, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(CreateBookModule::new(store, settings))
}
