//! Data-URL image encoder.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ServiceError;

use super::traits::{ImageEncoder, ImageFile};

/// Encodes images as `data:<mime>;base64,<payload>` URLs.
#[derive(Debug, Clone, Default)]
pub struct DataUrlEncoder;

impl ImageEncoder for DataUrlEncoder {
    fn encode(&self, file: &ImageFile) -> Result<String, ServiceError> {
        if !file.mime_type.starts_with("image/") {
            return Err(ServiceError::Encoding(format!(
                "{} is not an image ({})",
                file.name, file.mime_type
            )));
        }
        if file.bytes.is_empty() {
            return Err(ServiceError::Encoding(format!("{} is empty", file.name)));
        }
        Ok(format!(
            "data:{};base64,{}",
            file.mime_type,
            STANDARD.encode(&file.bytes)
        ))
    }
}

/// Wait `latency`, then encode `file` on the blocking pool.
///
/// Both wizards upload through this, so a slow encoder never stalls the
/// runtime and overlapping uploads resolve in the order they finish.
pub async fn encode_upload(
    encoder: Arc<dyn ImageEncoder>,
    file: ImageFile,
    latency: Duration,
) -> Result<String, ServiceError> {
    tokio::time::sleep(latency).await;
    tokio::task::spawn_blocking(move || encoder.encode(&file))
        .await
        .map_err(|e| ServiceError::Encoding(format!("encoder task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_data_url() {
        let file = ImageFile::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let url = DataUrlEncoder.encode(&file).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn rejects_non_images() {
        let file = ImageFile::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = DataUrlEncoder.encode(&file).unwrap_err();
        assert!(matches!(err, ServiceError::Encoding(_)));
    }

    #[test]
    fn rejects_empty_files() {
        let file = ImageFile::new("blank.png", "image/png", Vec::new());
        assert!(DataUrlEncoder.encode(&file).is_err());
    }

    #[tokio::test]
    async fn encode_upload_passes_encoder_result_through() {
        let encoder: Arc<dyn ImageEncoder> = Arc::new(DataUrlEncoder);
        let file = ImageFile::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let url = encode_upload(encoder.clone(), file, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");

        let text = ImageFile::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = encode_upload(encoder, text, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Encoding(_)));
    }
}
