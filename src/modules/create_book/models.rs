use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields accepted by the book creation route, form- or JSON-encoded.
///
/// Decoding never fails on a field's type: strings are kept, truthy numbers and
/// `true` become their text, `false`, `0`, `null`, empty strings and objects
/// count as absent. A repeated key or a JSON array contributes its first value.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub family_name: Option<String>,
    pub first_name: Option<String>,
    pub genre_name: Option<String>,
    pub book_title: Option<String>,
}

/// A creation request with all four fields present and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBook<'a> {
    pub family_name: &'a str,
    pub first_name: &'a str,
    pub genre_name: &'a str,
    pub book_title: &'a str,
}

impl CreateBookRequest {
    /// `None` unless every field is present and non-empty. Content is not checked further.
    pub fn complete(&self) -> Option<NewBook<'_>> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|value| !value.is_empty())
        }

        Some(NewBook {
            family_name: present(&self.family_name)?,
            first_name: present(&self.first_name)?,
            genre_name: present(&self.genre_name)?,
            book_title: present(&self.book_title)?,
        })
    }
}

/// One loosely typed body field.
struct FieldValue(Option<String>);

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any value")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(FieldValue(Some(value.to_string()).filter(|value| !value.is_empty())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(FieldValue(Some(value).filter(|value| !value.is_empty())))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(FieldValue(value.then(|| "true".to_string())))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(FieldValue((value != 0).then(|| value.to_string())))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(FieldValue((value != 0).then(|| value.to_string())))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(FieldValue(
            (value != 0.0 && !value.is_nan()).then(|| value.to_string()),
        ))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue(None))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue(None))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let first = seq.next_element::<FieldValue>()?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(first.unwrap_or(FieldValue(None)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(FieldValue(None))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct CreateBookRequestVisitor;

impl<'de> Visitor<'de> for CreateBookRequestVisitor {
    type Value = CreateBookRequest;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of book fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut request = CreateBookRequest::default();
        let mut seen = [false; 4];

        while let Some(key) = map.next_key::<String>()? {
            let (index, slot) = match key.as_str() {
                "familyName" => (0, &mut request.family_name),
                "firstName" => (1, &mut request.first_name),
                "genreName" => (2, &mut request.genre_name),
                "bookTitle" => (3, &mut request.book_title),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            // First occurrence wins.
            if seen[index] {
                map.next_value::<IgnoredAny>()?;
            } else {
                seen[index] = true;
                *slot = map.next_value::<FieldValue>()?.0;
            }
        }
        Ok(request)
    }

    // A JSON array body carries no named fields.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(CreateBookRequest::default())
    }
}

impl<'de> Deserialize<'de> for CreateBookRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CreateBookRequestVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> CreateBookRequest {
        CreateBookRequest {
            family_name: Some("Le Guin".to_string()),
            first_name: Some("Ursula".to_string()),
            genre_name: Some("Fantasy".to_string()),
            book_title: Some("Tehanu".to_string()),
        }
    }

    #[test]
    fn complete_request_borrows_fields() {
        let request = full();
        assert_eq!(
            request.complete(),
            Some(NewBook {
                family_name: "Le Guin",
                first_name: "Ursula",
                genre_name: "Fantasy",
                book_title: "Tehanu",
            })
        );
    }

    #[test]
    fn empty_or_missing_fields_are_incomplete() {
        let mut request = full();
        request.book_title = Some(String::new());
        assert!(request.complete().is_none());

        let mut request = full();
        request.first_name = None;
        assert!(request.complete().is_none());

        assert!(CreateBookRequest::default().complete().is_none());
    }

    #[test]
    fn whitespace_counts_as_present() {
        let mut request = full();
        request.genre_name = Some(" ".to_string());
        assert!(request.complete().is_some());
    }

    fn decode(json: &str) -> CreateBookRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn truthy_scalars_become_text() {
        let request = decode(
            r#"{"familyName":"Orwell","firstName":true,"genreName":"Dystopia","bookTitle":1984}"#,
        );
        assert_eq!(request.first_name.as_deref(), Some("true"));
        assert_eq!(request.book_title.as_deref(), Some("1984"));
        assert!(request.complete().is_some());
    }

    #[test]
    fn falsy_values_are_absent() {
        let request = decode(
            r#"{"familyName":false,"firstName":0,"genreName":null,"bookTitle":{"a":1}}"#,
        );
        assert_eq!(request.family_name, None);
        assert_eq!(request.first_name, None);
        assert_eq!(request.genre_name, None);
        assert_eq!(request.book_title, None);
    }

    #[test]
    fn first_value_of_a_list_is_used() {
        let request = decode(r#"{"bookTitle":["Tehanu","Tales from Earthsea"],"x":[1,2]}"#);
        assert_eq!(request.book_title.as_deref(), Some("Tehanu"));
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let request = decode(r#"{"bookTitle":"Tehanu","bookTitle":"Tales from Earthsea"}"#);
        assert_eq!(request.book_title.as_deref(), Some("Tehanu"));
    }

    #[test]
    fn array_body_has_no_fields() {
        assert!(decode("[1,2,3]").complete().is_none());
    }

    #[test]
    fn field_names_are_camel_case() {
        let request: CreateBookRequest = serde_json::from_str(
            r#"{"familyName":"Le Guin","firstName":"Ursula","genreName":"Fantasy","bookTitle":"Tehanu"}"#,
        )
        .unwrap();
        assert!(request.complete().is_some());
    }
}
