use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;

use crate::config::StorageCredentials;
use crate::errors::{GeneratorError, GeneratorResult};
use crate::storage::traits::ObjectStore;

/// S3-compatible bucket (MinIO) addressed path-style: `<endpoint>/<bucket>/<key>`.
pub struct MinioStore {
    bucket: Box<Bucket>,
}

impl MinioStore {
    pub fn new(
        credentials: &StorageCredentials,
        bucket_name: &str,
        region: &str,
    ) -> GeneratorResult<Self> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: credentials.endpoint.as_str().trim_end_matches('/').to_string(),
        };

        let creds = Credentials::new(
            Some(credentials.access_key.as_str()),
            Some(credentials.secret_key()),
            None,
            None,
            None,
        )
        .map_err(|e| GeneratorError::Storage(format!("Invalid credentials: {}", e)))?;

        let bucket = Bucket::new(bucket_name, region, creds)
            .map_err(|e| GeneratorError::Storage(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket })
    }
}

impl ObjectStore for MinioStore {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> GeneratorResult<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, body, content_type)
            .map_err(|e| GeneratorError::Storage(format!("PUT {} failed: {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(GeneratorError::Storage(format!(
                "PUT {} returned HTTP {}",
                key, status
            )));
        }

        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket.name(), key)
    }
}
