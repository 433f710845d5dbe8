/*
 * Responsibility
 * - SQLx による永続化アクセス (users / auth_tokens)
 */
pub mod error;
pub mod token_repo;
pub mod user_repo;
