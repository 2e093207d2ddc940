//! Body parsing shared by every write route.

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Request body decoded from JSON or from an urlencoded form, picked by `Content-Type`.
///
/// A request with no body type, or one this extractor does not understand, yields
/// `T::default()` so the handler sees every field as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOrJson<T>(pub T);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let Some(content_type) = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

fn reject(status: StatusCode, kind: &str, detail: String) -> AppError {
    tracing::debug!(%detail, "{kind} body rejected");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Request body too large")
    } else {
        AppError::bad_request(format!("Malformed {kind} body"))
    }
}

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&request) {
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(request, state)
                    .await
                    .map_err(|rejection: JsonRejection| {
                        reject(rejection.status(), "JSON", rejection.body_text())
                    })?;
                Ok(Self(value))
            }
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(request, state)
                    .await
                    .map_err(|rejection: FormRejection| {
                        reject(rejection.status(), "form", rejection.body_text())
                    })?;
                Ok(Self(value))
            }
            BodyKind::Other => Ok(Self(T::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    struct Probe {
        name: Option<String>,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[rstest]
    #[case(Some("application/json"), r#"{"name":"Tehanu"}"#)]
    #[case(Some("application/json; charset=utf-8"), r#"{"name":"Tehanu"}"#)]
    #[case(Some("application/x-www-form-urlencoded"), "name=Tehanu")]
    #[case(Some("Application/X-WWW-Form-Urlencoded"), "name=Tehanu")]
    #[tokio::test]
    async fn decodes_supported_bodies(#[case] content_type: Option<&str>, #[case] body: &'static str) {
        let FormOrJson(probe) = FormOrJson::<Probe>::from_request(request(content_type, body), &())
            .await
            .unwrap();
        assert_eq!(probe.name.as_deref(), Some("Tehanu"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("text/plain"))]
    #[case(Some("multipart/form-data; boundary=x"))]
    #[tokio::test]
    async fn unknown_bodies_are_empty(#[case] content_type: Option<&str>) {
        let FormOrJson(probe) =
            FormOrJson::<Probe>::from_request(request(content_type, "name=Tehanu"), &())
                .await
                .unwrap();
        assert_eq!(probe, Probe::default());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = FormOrJson::<Probe>::from_request(request(Some("application/json"), "{name"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad request: Malformed JSON body");
    }
}
