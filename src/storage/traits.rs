use crate::errors::GeneratorResult;

#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore {
    /// Store `body` under `key`, replacing whatever was there.
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> GeneratorResult<()>;

    /// Where `key` ends up, for reporting
    fn location(&self, key: &str) -> String;
}
