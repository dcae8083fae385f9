/*
 * Responsibility
 * - request shape の組み立て: URI params → query → body (GET 以外) の順にマージ
 * - body は JSON。multipart/form-data の場合のみ form として bind
 * - 空 body は許容する
 *
 * Notes
 * - URI / query / form の値は文字列で届く。T::default() を JSON にした形を
 *   型の手がかりにして数値・真偽値へ変換する
 * - 手がかりが null (Option など) の場合は数値 → 真偽値 → 文字列の順に試す
 * - 変換できない値・型に合わない値 (u32 への -1 など) はその項目だけ無視し、
 *   直前の値のまま残す。500 になるのは body の decode 失敗だけ
 * - 後のソースが前のソースの値を上書きする。競合の検証はしない
 */
use axum::{
    body::Body,
    extract::{FromRequest, Multipart, multipart::MultipartError},
    http::{Method, Request, header, request::Parts},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
    #[error("{0}")]
    Form(String),
}

/// Uploaded file from a multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

pub(crate) async fn bind<T>(
    parts: &Parts,
    params: &[(String, String)],
    body: Body,
) -> Result<T, BindError>
where
    T: DeserializeOwned + Serialize + Default,
{
    // Shapes without named fields (`()`, sequences) can only come from the body.
    let (template, named) = match serde_json::to_value(T::default())? {
        Value::Object(map) => (map, true),
        _ => (Map::new(), false),
    };
    let mut fields = Fields::new(&template, accepts::<T>);

    for (key, value) in params.iter().filter(|_| named) {
        fields.assign(key, value, &mut Vec::new());
    }

    if let Some(query) = parts.uri.query().filter(|_| named) {
        let mut seen = Vec::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            fields.assign(&key, &value, &mut seen);
        }
    }

    if parts.method != Method::GET {
        if is_multipart(parts) {
            bind_multipart(parts, body, &mut fields).await?;
        } else {
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(BindError::Body)?;
            // an empty body is the same as no body at all
            if !bytes.trim_ascii().is_empty() {
                match serde_json::from_slice::<Value>(&bytes)? {
                    Value::Object(map) => fields.map.extend(map),
                    other => return Ok(serde_json::from_value(other)?),
                }
            }
        }
    }

    if !named && fields.map.is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(Value::Object(fields.map))?)
}

fn accepts<T: DeserializeOwned>(value: &Value) -> bool {
    T::deserialize(value).is_ok()
}

/// Values collected so far, starting from the defaults of `T`.
///
/// Text values are kept only while the whole map still deserializes into
/// `T`, so a value the field rejects leaves the field at its previous value.
struct Fields<'a> {
    map: Map<String, Value>,
    template: &'a Map<String, Value>,
    accepts: fn(&Value) -> bool,
}

impl<'a> Fields<'a> {
    fn new(template: &'a Map<String, Value>, accepts: fn(&Value) -> bool) -> Self {
        Self {
            map: template.clone(),
            template,
            accepts,
        }
    }

    /// Binds one textual value. `seen` tracks array fields already reset by
    /// this source so repeated keys accumulate instead of extending the default.
    fn assign(&mut self, key: &str, raw: &str, seen: &mut Vec<String>) {
        let hint = match self.template.get(key) {
            Some(Value::Array(items)) => items.first(),
            other => other,
        };
        for value in candidates(raw, hint) {
            if self.insert(key, value, seen) {
                return;
            }
        }
    }

    fn insert(&mut self, key: &str, value: Value, seen: &mut Vec<String>) -> bool {
        let is_array = matches!(self.template.get(key), Some(Value::Array(_)));
        let first = !seen.iter().any(|k| k == key);

        let next = match self.map.get(key) {
            Some(Value::Array(items)) if is_array && !first => {
                let mut items = items.clone();
                items.push(value);
                Value::Array(items)
            }
            _ if is_array => Value::Array(vec![value]),
            _ => value,
        };

        let previous = self.map.insert(key.to_owned(), next);
        if !self.still_valid() {
            match previous {
                Some(previous) => self.map.insert(key.to_owned(), previous),
                None => self.map.remove(key),
            };
            return false;
        }
        if is_array && first {
            seen.push(key.to_owned());
        }
        true
    }

    fn still_valid(&mut self) -> bool {
        let value = Value::Object(std::mem::take(&mut self.map));
        let ok = (self.accepts)(&value);
        if let Value::Object(map) = value {
            self.map = map;
        }
        ok
    }
}

fn is_multipart(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("multipart/form-data"))
}

async fn bind_multipart(parts: &Parts, body: Body, fields: &mut Fields<'_>) -> Result<(), BindError> {
    // Multipart only needs the boundary from the content type.
    let mut builder = Request::builder().method(parts.method.clone());
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type.clone());
    }
    let request = builder
        .body(body)
        .map_err(|e| BindError::Form(e.to_string()))?;
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| BindError::Form(e.body_text()))?;

    let mut seen = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            let file = FormFile {
                file_name: field.file_name().map(str::to_owned),
                content_type: field.content_type().map(str::to_owned),
                data: field.bytes().await?.to_vec(),
            };
            fields.insert(&name, serde_json::to_value(file)?, &mut seen);
        } else {
            let text = field.text().await?;
            fields.assign(&name, &text, &mut seen);
        }
    }
    Ok(())
}

/// Typed readings of a text value, most specific first. Without a usable
/// hint (`null` default, field skipped when serialized) every reading is tried.
fn candidates(raw: &str, hint: Option<&Value>) -> Vec<Value> {
    let trimmed = raw.trim();
    let integer = || {
        trimmed
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| trimmed.parse::<u64>().map(Value::from))
            .ok()
    };
    let float = || {
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    };
    let boolean = || parse_bool(raw).map(Value::Bool);
    let string = || Some(Value::String(raw.to_owned()));

    let readings = match hint {
        Some(Value::Bool(_)) => vec![boolean()],
        Some(Value::Number(n)) if n.is_f64() => vec![float()],
        Some(Value::Number(_)) => vec![integer()],
        Some(Value::String(_)) => vec![string()],
        Some(Value::Object(_) | Value::Array(_)) => Vec::new(),
        Some(Value::Null) | None => vec![integer(), float(), boolean(), string()],
    };
    readings.into_iter().flatten().collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
