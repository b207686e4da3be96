use crate::errors::GeneratorResult;
use crate::storage::traits::ObjectStore;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

pub struct UploadService<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> UploadService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Upload a feed document under `key`. Returns where it was written.
    pub fn upload(&self, bytes: &[u8], key: &str) -> GeneratorResult<String> {
        self.store.put(key, bytes, RSS_CONTENT_TYPE)?;

        let location = self.store.location(key);
        tracing::info!(key, bytes = bytes.len(), location = %location, "Uploaded feed");

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GeneratorError;
    use crate::storage::traits::MockObjectStore;
    use mockall::predicate::eq;

    #[test]
    fn test_upload_puts_with_rss_content_type() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .with(eq("immich.xml"), eq(&b"<rss/>"[..]), eq(RSS_CONTENT_TYPE))
            .times(1)
            .returning(|_, _, _| Ok(()));
        store
            .expect_location()
            .returning(|key| format!("s3://rss-feeds/{}", key));

        let location = UploadService::new(store).upload(b"<rss/>", "immich.xml").unwrap();

        assert_eq!(location, "s3://rss-feeds/immich.xml");
    }

    #[test]
    fn test_upload_propagates_storage_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .returning(|_, _, _| Err(GeneratorError::Storage("bucket missing".to_string())));
        store.expect_location().never();

        let err = UploadService::new(store).upload(b"<rss/>", "immich.xml").unwrap_err();

        assert!(matches!(err, GeneratorError::Storage(_)));
    }
}
