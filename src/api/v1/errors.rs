/*
 * Responsibility
 * - v1 の業務エラーコード (EzError)
 * - handler はここの値に with_detail / with_err で文脈を足して返す
 */
use std::sync::LazyLock;

use crate::error::EzError;

pub static ERR_INVALID_PARAM: LazyLock<EzError> =
    LazyLock::new(|| EzError::new(4000, "invalid parameter"));

pub static ERR_FORBIDDEN: LazyLock<EzError> =
    LazyLock::new(|| EzError::new(4030, "operation not allowed"));

pub static ERR_ISSUE_TOKEN: LazyLock<EzError> =
    LazyLock::new(|| EzError::new(5001, "failed to issue token"));
