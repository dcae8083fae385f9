/*
 * Responsibility
 * - handler から見える per-request context (RequestContext)
 * - credential middleware が extensions に載せる型 (UserAuth / BasicAuth)
 *
 * Notes
 * - token 検証や Basic ヘッダの解析は middleware/services 側の責務
 * - ここは「型（契約）」として固定化する
 */
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{HeaderMap, Method, Uri, request::Parts};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Registered JWT claims (RFC 7519 §4.1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_audience",
        deserialize_with = "deserialize_audience"
    )]
    pub aud: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

// `aud` may be a single string or an array of strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

fn deserialize_audience<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Audience>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Audience::One(aud)) => vec![aud],
        Some(Audience::Many(aud)) => aud,
    })
}

fn serialize_audience<S>(aud: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match aud {
        [single] => serializer.serialize_str(single),
        many => many.serialize(serializer),
    }
}

/// Identity carried by a verified bearer token.
///
/// `ID` / `Name` keep the capitalised keys used by tokens already in circulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuth {
    #[serde(rename = "ID", default)]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(flatten)]
    pub claims: RegisteredClaims,
}

impl UserAuth {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            claims: RegisteredClaims::default(),
        }
    }

    /// Sets `iat` to now and `exp` to now + `ttl`.
    #[must_use]
    pub fn expires_in(mut self, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        self.claims.iat = u64::try_from(now.timestamp()).ok();
        self.claims.exp = u64::try_from((now + ttl).timestamp()).ok();
        self
    }
}

/// Name / password pair taken from `Authorization: Basic ...`.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Slot a handler writes its own response into.
#[derive(Clone, Default)]
pub(crate) struct RawSlot(Arc<Mutex<Option<Response>>>);

impl RawSlot {
    fn put(&self, response: Response) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(response);
    }

    pub(crate) fn take(&self) -> Option<Response> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Per-request context handed to business functions.
///
/// Wraps the request head (method, URI, headers, extensions) and the
/// credentials the middlewares left in the extensions. Each slot is
/// independent: either, both or neither may be set.
pub struct RequestContext {
    parts: Parts,
    params: Vec<(String, String)>,
    user: Option<UserAuth>,
    basic_auth: Option<BasicAuth>,
    raw: RawSlot,
}

impl RequestContext {
    pub(crate) fn new(parts: Parts, params: Vec<(String, String)>) -> Self {
        let user = parts.extensions.get::<UserAuth>().cloned();
        let basic_auth = parts.extensions.get::<BasicAuth>().cloned();
        Self {
            parts,
            params,
            user,
            basic_auth,
            raw: RawSlot::default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Path parameter captured by the route, e.g. `{id}`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value placed in the request extensions upstream (`Extension` layer,
    /// middleware, ...).
    pub fn extension<T>(&self) -> Option<&T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.parts.extensions.get::<T>()
    }

    pub fn user(&self) -> Option<&UserAuth> {
        self.user.as_ref()
    }

    pub fn basic_auth(&self) -> Option<&BasicAuth> {
        self.basic_auth.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() || self.basic_auth.is_some()
    }

    /// Stores a complete response. It is sent as-is when the handler then
    /// returns the raw-response sentinel.
    pub fn write_raw(&self, response: impl IntoResponse) {
        self.raw.put(response.into_response());
    }

    pub(crate) fn raw_slot(&self) -> RawSlot {
        self.raw.clone()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("params", &self.params)
            .field("user", &self.user)
            .field("basic_auth", &self.basic_auth)
            .finish_non_exhaustive()
    }
}
