/*
 * Responsibility
 * - EzError: code + message を持つ業務エラー (immutable)
 * - 同一性は code の一致で判定する (message / detail は無関係)
 * - 制御用の予約済み sentinel (401 / 302 / 200)
 * - HandlerError: 業務関数の Err 側。anyhow::Error + 成功型の値 (redirect 用)
 */
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Authentication required or failed.
pub static ERR_AUTH: LazyLock<EzError> =
    LazyLock::new(|| EzError::new(401, "authorization failed"));

/// Not a failure: the handler's value is a redirect target.
pub static ERR_REDIRECT: LazyLock<EzError> = LazyLock::new(|| EzError::new(302, "redirect"));

/// Not a failure: the handler already produced the whole response.
pub static ERR_RAW_RESPONSE: LazyLock<EzError> =
    LazyLock::new(|| EzError::new(200, "return raw response"));

/// Root cause shared by an error and every value derived from it.
#[derive(Debug)]
struct Cause(String);

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Cause {}

/// Error value carrying a numeric code and a human readable message.
///
/// Two `EzError`s are the same kind when their codes are equal, whatever
/// their messages say. `with_detail` / `with_err` return new values and
/// keep the original cause.
#[derive(Debug, Clone)]
pub struct EzError {
    cause: Arc<Cause>,
    code: i32,
    message: String,
}

impl EzError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            cause: Arc::new(Cause(message.clone())),
            code,
            message,
        }
    }

    /// `"<message>(<detail>)"`
    #[must_use]
    pub fn with_detail(&self, detail: impl fmt::Display) -> Self {
        Self {
            cause: Arc::clone(&self.cause),
            code: self.code,
            message: format!("{}({})", self.message, detail),
        }
    }

    /// `"<message>: <err>"`
    #[must_use]
    pub fn with_err(&self, err: impl fmt::Display) -> Self {
        Self {
            cause: Arc::clone(&self.cause),
            code: self.code,
            message: format!("{}: {}", self.message, err),
        }
    }

    pub const fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Identity check against an arbitrary error.
    ///
    /// - another `EzError`: same code
    /// - the cause this error was built from: match
    /// - anything else: its source chain is searched, so a wrapper around an
    ///   `EzError` answers for the error it wraps
    pub fn is(&self, other: &(dyn StdError + 'static)) -> bool {
        let mut current = Some(other);
        while let Some(err) = current {
            if let Some(ez) = err.downcast_ref::<EzError>() {
                return ez.code == self.code;
            }
            if let Some(cause) = err.downcast_ref::<Cause>()
                && std::ptr::eq(cause, Arc::as_ptr(&self.cause))
            {
                return true;
            }
            current = err.source();
        }
        false
    }

    /// Same as [`EzError::is`] for errors already boxed into `anyhow`.
    pub fn matches(&self, err: &anyhow::Error) -> bool {
        err.chain().any(|cause| self.is(cause))
    }
}

impl PartialEq for EzError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for EzError {}

impl fmt::Display for EzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EZErr [{}] {}", self.code, self.message)
    }
}

impl StdError for EzError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Error side of a business function's result.
///
/// Besides the error itself it can carry a success-typed value. The adapter
/// only looks at that value for the redirect sentinel.
pub struct HandlerError<T> {
    value: Option<T>,
    error: anyhow::Error,
}

impl<T> HandlerError<T> {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            value: None,
            error: error.into(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    /// Redirect sentinel carrying `target` as the handler's value.
    pub fn redirect(target: T) -> Self {
        Self::new(ERR_REDIRECT.clone()).with_value(target)
    }

    /// Raw-response sentinel; see `RequestContext::write_raw`.
    pub fn raw_response() -> Self {
        Self::new(ERR_RAW_RESPONSE.clone())
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_parts(self) -> (Option<T>, anyhow::Error) {
        (self.value, self.error)
    }
}

impl<T, E> From<E> for HandlerError<T>
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl<T> fmt::Debug for HandlerError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("has_value", &self.value.is_some())
            .field("error", &self.error)
            .finish()
    }
}
