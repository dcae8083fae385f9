/*
 * Responsibility
 * - API バージョンの束ね (v1 のみ)
 */
pub mod v1;
